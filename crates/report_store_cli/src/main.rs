//! Admin CLI over the report store.
//!
//! # Responsibility
//! - Exercise the store operations against a configured backend.
//! - Keep output scriptable: listings are tab-separated, `get` writes raw
//!   layout bytes to stdout.

use clap::{Parser, Subcommand};
use report_store_core::{
    builtin_catalog, core_version, deserialize_layout, init_logging_from_config, load_config,
    ReportRepository, ReportStore,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "report-store", version, about = "Inspect and edit the report catalog")]
struct Cli {
    /// Store configuration file (JSON).
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List report names and display names.
    List,
    /// Write a report's layout bytes to stdout.
    Get { name: String },
    /// Save a layout document under a new name.
    Import { name: String, file: PathBuf },
    /// Change the display name of a persisted report.
    Rename { name: String, display_name: String },
    /// Print the core library version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = match cli.command {
        Command::Version => {
            println!("report_store_core version={}", core_version());
            return Ok(());
        }
        _ => open_store(cli.config)?,
    };

    match cli.command {
        Command::List => {
            for (name, display_name) in store.get_urls()? {
                println!("{name}\t{display_name}");
            }
        }
        Command::Get { name } => {
            let bytes = store.get_data(&name)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
        Command::Import { name, file } => {
            let bytes = std::fs::read(&file)
                .map_err(|err| format!("failed to read `{}`: {err}", file.display()))?;
            let layout = deserialize_layout(&bytes)?;
            let saved_as = store.set_new_data(&layout, &name)?;
            println!("{saved_as}");
        }
        Command::Rename { name, display_name } => {
            store.rename_report(&name, &display_name)?;
        }
        Command::Version => {}
    }
    Ok(())
}

fn open_store(
    config_path: Option<PathBuf>,
) -> Result<ReportStore<Box<dyn ReportRepository>>, Box<dyn Error>> {
    let config_path = config_path.ok_or("--config is required for this command")?;
    let config = load_config(&config_path)?;
    if let Some(logging) = &config.logging {
        init_logging_from_config(logging)?;
    }
    Ok(ReportStore::open(&config, Arc::new(builtin_catalog()?))?)
}
