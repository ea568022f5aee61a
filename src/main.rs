//! codefinder: clinical code lookup server & CLI
//!
//! Dual-mode application:
//! - Server mode (default, or `serve`): JSON HTTP API
//! - CLI mode: one catalog operation per invocation, markdown on stdout
//!
//! Both modes rank candidates with the same tiered match engine.

mod cli;
mod config;
mod csv_io;
mod error;
mod model;
mod search;
mod server;
mod store;
mod tools;

use cli::{Cli, Commands, ServeArgs};
use clap::error::ErrorKind;
use config::{open_store, Config};
use error::AppError;
use std::future::Future;
use std::path::Path;
use store::SharedStore;
use tokio::time::{timeout, Duration};
use tools::format;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Upper bound for a single CLI command
const CLI_TIMEOUT: Duration = Duration::from_secs(120);

/// Suggestions printed when a CLI search finds nothing
const MAX_SUGGESTIONS: usize = 3;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse_default_serve(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(&cli);

    let config = Config::from_args(&cli.store);
    let result = match cli.command {
        Some(Commands::Serve(args)) => run_server(&config, args).await,
        Some(command) => run_cli_command(&config, command).await,
        None => Err(AppError::InvalidInput("No command specified".to_string())),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.message());
        std::process::exit(e.exit_code());
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    // RUST_LOG wins over the verbosity flags when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();
}

async fn run_server(config: &Config, args: ServeArgs) -> Result<(), AppError> {
    info!("Starting codefinder server");
    let store = open_store(config)?;
    server::serve(store, args.bind).await?;
    Ok(())
}

/// Run one CLI command and print its markdown output
async fn run_cli_command(config: &Config, command: Commands) -> Result<(), AppError> {
    let store = open_store(config)?;
    let output = with_timeout(execute_command(&store, command)).await?;
    println!("{}", output);
    Ok(())
}

async fn with_timeout<T>(fut: impl Future<Output = Result<T, AppError>>) -> Result<T, AppError> {
    match timeout(CLI_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "Request exceeded {} second timeout",
            CLI_TIMEOUT.as_secs()
        ))),
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, AppError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => AppError::Internal(format!("Failed to read {}: {}", path.display(), e)),
    })
}

async fn execute_command(store: &SharedStore, command: Commands) -> Result<String, AppError> {
    match command {
        Commands::Search(args) => {
            let outcome = tools::search::execute_search(store, &args.query, args.code_type).await?;
            let shown = match args.limit {
                Some(limit) => &outcome.results[..limit.min(outcome.results.len())],
                None => &outcome.results[..],
            };
            let mut output = format::format_search_results(&args.query, shown, outcome.total);
            if outcome.total == 0 {
                let suggestions = tools::search::suggest_codes(
                    store,
                    &args.query,
                    args.code_type,
                    MAX_SUGGESTIONS,
                )
                .await?;
                output.push_str(&format::format_suggestions(&suggestions));
            }
            Ok(output)
        }
        Commands::Import(args) => {
            let bytes = read_file(&args.file).await?;
            let report = tools::import::execute_import(store, bytes).await?;
            Ok(format::format_import(&report))
        }
        Commands::Bulk(args) => {
            let bytes = read_file(&args.file).await?;
            let queries =
                tokio::task::spawn_blocking(move || csv_io::parse_queries(bytes.as_slice())).await??;
            let report = tools::bulk::execute_bulk_search(store, queries).await?;
            Ok(format::format_bulk_report(&report))
        }
        Commands::Codes(args) => {
            let codes = tools::catalog::list_codes(store, args.code_type).await?;
            Ok(format::format_code_list(&codes))
        }
        Commands::Show(args) => {
            let code = tools::catalog::get_code(store, &args.id).await?;
            Ok(format::format_code(&code))
        }
        Commands::Stats => {
            let report = tools::catalog::stats(store).await?;
            Ok(format::format_stats(&report))
        }
        Commands::History(args) => {
            let entries = tools::catalog::recent_history(store, args.limit).await?;
            Ok(format::format_history(&entries))
        }
        Commands::Serve(_) => Err(AppError::InvalidInput(
            "serve is not a one-shot command".to_string(),
        )),
    }
}
