use std::io;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use kvlkcl::{
    analysis::AnalysisRequest,
    circuit::Circuit,
    cli,
    config::Config,
    module::{Artifact, ModuleAcquirer, ModuleClient, Source},
    printer::Console,
    session::{run_session, SessionOptions},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();

    let color = !args.no_color && cfg.get_bool("DEFAULT_COLOR") && io::stdout().is_terminal();
    let mut console = Console::stdout(color).verbose(args.verbose);

    // Resolve circuit: --circuit file, else the built-in one
    let circuit = match &args.circuit {
        Some(path) => Circuit::from_json_file(path)?,
        None => Circuit::lab_exercise(),
    };
    circuit.validate().context("invalid circuit")?;

    if args.print_circuit {
        println!("{}", circuit.to_json_pretty()?);
        return Ok(());
    }

    // CLI overrides config
    let precision = match args.precision {
        Some(p) => p,
        None => {
            let p = cfg.decimal_precision();
            if cfg.get_u32("DECIMAL_PRECISION") != Some(p) {
                let raw = cfg.get("DECIMAL_PRECISION").unwrap_or_default();
                console.warn(&format!("Ignoring DECIMAL_PRECISION={}, using {}", raw, p));
            }
            p
        }
    };
    let show_widgets = args.widgets || cfg.get_bool("SHOW_WIDGETS");

    let (source, fetched) = match args.module.clone().or_else(|| cfg.get_path("MODULE_PATH")) {
        Some(path) => {
            console.detail(&format!("using local module {}", path.display()));
            (Source::Local, Artifact::local(&path))
        }
        None => {
            let url = args.url.clone().unwrap_or_else(|| cfg.module_url());
            console.info(&format!("Downloading module from {}", url));
            let fetched = match ModuleClient::from_config(&cfg) {
                Ok(client) => client.fetch(&url).await,
                Err(e) => Err(e),
            };
            (Source::Download, fetched)
        }
    };

    let acquirer = ModuleAcquirer::native();
    console.detail(&format!("loaders: {}", acquirer.strategy_names().join(", ")));

    let request = AnalysisRequest::new(&circuit, precision).with_widgets(show_widgets);
    let options = SessionOptions { save: args.save.clone(), explore: args.explore };

    if let Err(e) = run_session(&acquirer, source, fetched, &request, &options, &mut console) {
        console.flush();
        std::process::exit(e.exit_code());
    }
    Ok(())
}
