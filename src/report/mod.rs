//! Result presentation: the two result tables and JSON export.

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};

use crate::{
    analysis::AnalysisReport,
    printer::{Cell, Console, Table},
};

pub const NODE_VOLTAGE_TITLE: &str = "Node Voltage Differences (V)";
pub const BRANCH_CURRENT_TITLE: &str = "Branch Currents (mA)";

pub fn node_voltage_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new(&["Nodes", "Voltage (V)"]);
    for row in &report.node_voltage_pairs {
        table.push_row(vec![Cell::text(row.nodes.as_str()), Cell::Number(row.voltage)]);
    }
    table
}

pub fn branch_current_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new(&["Branch", "Current (mA)", "Direction"]);
    for row in &report.branch_currents {
        table.push_row(vec![
            Cell::text(row.branch.as_str()),
            Cell::Number(row.current),
            Cell::text(row.direction.as_str()),
        ]);
    }
    table
}

/// Print both tables under their titles.
pub fn print_report<W: Write>(console: &mut Console<W>, report: &AnalysisReport) {
    console.title(NODE_VOLTAGE_TITLE);
    console.table(&node_voltage_table(report));

    console.title(BRANCH_CURRENT_TITLE);
    console.table(&branch_current_table(report));
}

pub fn save_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(report)?;
    fs::write(path, text).with_context(|| format!("writing report: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BranchCurrent, NodeVoltage};

    fn sample() -> AnalysisReport {
        AnalysisReport {
            node_voltage_pairs: vec![NodeVoltage { nodes: "V18".into(), voltage: 4.125 }],
            branch_currents: vec![BranchCurrent {
                branch: "2-7".into(),
                current: 3.75,
                direction: "7 → 2".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn tables_follow_report_rows() {
        let report = sample();
        assert_eq!(node_voltage_table(&report).len(), 1);
        let text = branch_current_table(&report).render();
        assert!(text.contains("│ Branch │ Current (mA) │ Direction │"));
        assert!(text.contains("│ 2-7    │         3.75 │ 7 → 2     │"));
    }

    #[test]
    fn print_report_writes_titles_in_order() {
        let mut console = Console::new(Vec::new(), false);
        print_report(&mut console, &sample());
        let text = String::from_utf8(console.into_inner()).unwrap();
        let nv = text.find(NODE_VOLTAGE_TITLE).unwrap();
        let bc = text.find(BRANCH_CURRENT_TITLE).unwrap();
        assert!(nv < bc);
        assert!(text.starts_with('\n'));
    }

    #[test]
    fn saved_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        save_json(&sample(), &path).unwrap();
        let back: AnalysisReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
    }
}
