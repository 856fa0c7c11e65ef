//! One run: load the module, invoke the analysis, present, clean up.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};

use crate::{
    analysis::{AnalysisReport, AnalysisRequest, CircuitAnalyzer},
    module::{AcquireError, Artifact, LoadedModule, ModuleAcquirer, Source},
    printer::Console,
    report, tui,
};

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Write the report as JSON here.
    pub save: Option<PathBuf>,
    /// Open the terminal explorer after printing.
    pub explore: bool,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub strategy: String,
    /// `None` when the analysis call failed.
    pub report: Option<AnalysisReport>,
}

/// Run the whole flow. Only acquisition failures escape; analysis and
/// presentation failures are reported on `console`.
pub fn run_session<W: Write>(
    acquirer: &ModuleAcquirer,
    source: Source,
    fetched: Result<Artifact>,
    request: &AnalysisRequest<'_>,
    options: &SessionOptions,
    console: &mut Console<W>,
) -> Result<SessionSummary, AcquireError> {
    let loaded = match acquirer.load_from(source, fetched) {
        Ok(loaded) => loaded,
        Err(e) => {
            console.error(&format!("Error: {}", e));
            return Err(e);
        }
    };
    announce(console, &loaded);

    let report = invoke(loaded.analyzer(), request, console);
    if let Some(report) = &report {
        present_extras(report, options, console);
    }

    let strategy = loaded.strategy().to_string();
    loaded.close();
    Ok(SessionSummary { strategy, report })
}

fn announce<W: Write>(console: &mut Console<W>, loaded: &LoadedModule) {
    if loaded.failures().is_empty() {
        console.success("Module loaded successfully");
    } else {
        for attempt in loaded.failures() {
            console.error(&format!("Error: {}: {}", attempt.strategy, attempt.error));
        }
        console.success(&format!("Module loaded with {} loader", loaded.strategy()));
    }
    if let Some(path) = loaded.artifact_path() {
        console.detail(&format!("module file: {}", path.display()));
    }
    console.detail(&format!("analyzer: {}", loaded.analyzer().name()));
}

/// Call the analysis, print both tables, then the optional widgets.
///
/// Any error is reported and swallowed.
pub fn invoke<W: Write>(
    analyzer: &dyn CircuitAnalyzer,
    request: &AnalysisRequest<'_>,
    console: &mut Console<W>,
) -> Option<AnalysisReport> {
    match run_and_print(analyzer, request, console) {
        Ok(report) => Some(report),
        Err(e) => {
            console.error(&format!("Analysis error: {:#}", e));
            None
        }
    }
}

fn run_and_print<W: Write>(
    analyzer: &dyn CircuitAnalyzer,
    request: &AnalysisRequest<'_>,
    console: &mut Console<W>,
) -> Result<AnalysisReport> {
    let report = analyzer.run_analysis(request)?;
    report::print_report(console, &report);

    match analyzer.create_interactive_widgets(&report.node_voltage_dict, &report.branch_dict) {
        Some(result) => result.context("interactive widgets")?,
        None => console.detail("module has no interactive widgets"),
    }
    Ok(report)
}

fn present_extras<W: Write>(report: &AnalysisReport, options: &SessionOptions, console: &mut Console<W>) {
    if let Some(path) = &options.save {
        match report::save_json(report, path) {
            Ok(()) => console.info(&format!("\nResults saved in {}", path.display())),
            Err(e) => console.error(&format!("Analysis error: {:#}", e)),
        }
    }
    if options.explore {
        console.flush();
        if let Err(e) = tui::run_explorer(&report.node_voltage_dict, &report.branch_dict) {
            console.error(&format!("Analysis error: {:#}", e));
        }
    }
}
