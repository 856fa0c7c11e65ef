use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::config::MAX_DECIMAL_PRECISION;

#[derive(Parser, Debug, Clone)]
#[command(name = "kvlkcl", about = "Kirchhoff circuit analysis with an external solver module", version)]
#[command(group(ArgGroup::new("source").args(["url", "module"]).multiple(false)))]
pub struct Cli {
    /// Download the solver module from this URL.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Load a solver module from a local file instead of downloading it.
    #[arg(long, value_name = "PATH")]
    pub module: Option<PathBuf>,

    /// Circuit description as JSON (defaults to the built-in laboratory circuit).
    #[arg(long, value_name = "PATH")]
    pub circuit: Option<PathBuf>,

    /// Print the circuit as JSON and exit.
    #[arg(long = "print-circuit")]
    pub print_circuit: bool,

    /// Decimal precision the solver rounds results to.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DECIMAL_PRECISION)))]
    pub precision: Option<u32>,

    /// Ask the module to show its own displays while solving.
    #[arg(long)]
    pub widgets: bool,

    /// Save the results as JSON.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Browse node voltages and branch currents in a terminal view.
    #[arg(long)]
    pub explore: bool,

    /// Disable colored status output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Show loader attempts and other details.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
