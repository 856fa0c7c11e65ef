//! Solver contract: the typed entry points an external analysis module provides.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Edge, Loop, VoltageSource};

/// Arguments of one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub circuit: &'a Circuit,
    pub decimal_precision: u32,
    /// Ask the module to render its own displays while solving.
    pub show_widgets: bool,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(circuit: &'a Circuit, decimal_precision: u32) -> Self {
        Self { circuit, decimal_precision, show_widgets: false }
    }

    pub fn with_widgets(mut self, show_widgets: bool) -> Self {
        self.show_widgets = show_widgets;
        self
    }

    /// Flat argument record as native modules receive it.
    pub fn to_wire(&self) -> WireRequest<'a> {
        WireRequest {
            num_nodes: self.circuit.num_nodes,
            num_loops: self.circuit.num_loops(),
            edges: &self.circuit.edges,
            voltage_sources: &self.circuit.voltage_sources,
            loops: &self.circuit.loops,
            decimal_precision: self.decimal_precision,
            show_widgets: self.show_widgets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub num_nodes: u32,
    pub num_loops: usize,
    pub edges: &'a [Edge],
    pub voltage_sources: &'a [VoltageSource],
    pub loops: &'a [Loop],
    pub decimal_precision: u32,
    pub show_widgets: bool,
}

/// Voltage difference between a pair of nodes, e.g. `V12`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVoltage {
    pub nodes: String,
    pub voltage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchCurrent {
    pub branch: String,
    /// Milliamperes.
    pub current: f64,
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub node_voltage_pairs: Vec<NodeVoltage>,
    pub branch_currents: Vec<BranchCurrent>,
    #[serde(default)]
    pub node_voltage_dict: BTreeMap<String, f64>,
    #[serde(default)]
    pub branch_dict: BTreeMap<String, f64>,
}

/// An external circuit solver.
pub trait CircuitAnalyzer {
    fn name(&self) -> &str;

    fn run_analysis(&self, request: &AnalysisRequest<'_>) -> Result<AnalysisReport>;

    /// Interactive displays over the auxiliary mappings.
    ///
    /// `None` when the module has no such entry point.
    fn create_interactive_widgets(
        &self,
        _node_voltages: &BTreeMap<String, f64>,
        _branches: &BTreeMap<String, f64>,
    ) -> Option<Result<()>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_carries_flat_arguments() {
        let circuit = Circuit::lab_exercise();
        let request = AnalysisRequest::new(&circuit, 3).with_widgets(true);
        let value = serde_json::to_value(request.to_wire()).unwrap();

        assert_eq!(value["num_nodes"], 8);
        assert_eq!(value["num_loops"], 6);
        assert_eq!(value["decimal_precision"], 3);
        assert_eq!(value["show_widgets"], true);
        assert_eq!(value["edges"][5]["from"], 2);
        assert_eq!(value["edges"][5]["to"], 7);
        assert_eq!(value["edges"][5]["resistance"], 0.0);
        assert_eq!(value["voltage_sources"][2]["emf"], -12.0);
        assert_eq!(value["loops"][3], serde_json::json!([2, 4, 7]));
    }

    #[test]
    fn report_maps_are_optional_on_the_wire() {
        let report: AnalysisReport = serde_json::from_str(
            r#"{"node_voltage_pairs":[{"nodes":"V12","voltage":1.5}],
                "branch_currents":[{"branch":"1-2","current":-0.25,"direction":"2 → 1"}]}"#,
        )
        .unwrap();
        assert_eq!(report.node_voltage_pairs.len(), 1);
        assert_eq!(report.branch_currents[0].direction, "2 → 1");
        assert!(report.node_voltage_dict.is_empty());
        assert!(report.branch_dict.is_empty());
    }
}
