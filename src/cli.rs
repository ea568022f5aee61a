//! CLI mode implementation
//!
//! Provides command-line access to the catalog and the HTTP server

use crate::config::Backend;
use crate::model::CodeType;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;

/// codefinder CLI
#[derive(Parser, Debug)]
#[command(name = "codefinder")]
#[command(about = "Clinical code lookup: ICD-10/9, CPT, HCPCS, SNOMED, LOINC, HCC", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Parse arguments, treating an invocation without a subcommand as `serve`
    ///
    /// The bare form is re-parsed with `serve` inserted so `--bind` and
    /// `CODEFINDER_BIND` are validated by clap in both modes.
    pub fn try_parse_default_serve<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cli = Cli::try_parse_from(args.iter().cloned())?;
        if cli.command.is_some() {
            return Ok(cli);
        }

        args.insert(args.len().min(1), OsString::from("serve"));
        Cli::try_parse_from(args)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API (default when no command is given)
    Serve(ServeArgs),
    /// Search codes by code or description text
    Search(SearchArgs),
    /// Import codes from a CSV file
    Import(ImportArgs),
    /// Run every query in a CSV file
    Bulk(BulkArgs),
    /// List catalog codes
    Codes(CodesArgs),
    /// Show one code by id
    Show(ShowArgs),
    /// Code counts per code system
    Stats,
    /// Recent searches
    History(HistoryArgs),
}

/// Catalog backend selection, shared by every command
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend
    #[arg(long, global = true, value_enum, env = "CODEFINDER_BACKEND", default_value_t = Backend::Memory)]
    pub backend: Backend,

    /// SQLite database file (sqlite backend only)
    #[arg(long, global = true, env = "CODEFINDER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Do not load the sample codes into an empty catalog
    #[arg(long, global = true)]
    pub no_seed: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "CODEFINDER_BIND", default_value = crate::config::DEFAULT_BIND)]
    pub bind: SocketAddr,
}


#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Code (E11.9) or description text (case-insensitive)
    #[arg(short = 'q', long)]
    pub query: String,

    /// Restrict to one code system (ICD-10, ICD-9, CPT, HCPCS, SNOMED, LOINC, HCC)
    #[arg(short = 't', long = "type", value_parser = parse_code_type)]
    pub code_type: Option<CodeType>,

    /// Maximum number of results to print
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// CSV with codeType, code, description, synonyms, category columns
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BulkArgs {
    /// CSV with a query, code or description column
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CodesArgs {
    /// Restrict to one code system
    #[arg(short = 't', long = "type", value_parser = parse_code_type)]
    pub code_type: Option<CodeType>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Code id
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Number of entries (default 10)
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

fn parse_code_type(s: &str) -> Result<CodeType, String> {
    s.parse::<CodeType>().map_err(|e| e.detail().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from(["codefinder", "search", "-q", "E11.9", "-t", "icd-10"]).unwrap();
        match cli.command {
            Some(Commands::Search(args)) => {
                assert_eq!(args.query, "E11.9");
                assert_eq!(args.code_type, Some(CodeType::Icd10));
                assert_eq!(args.limit, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_code_type_rejected() {
        let result = Cli::try_parse_from(["codefinder", "search", "-q", "x", "-t", "ICD-11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_store_flags() {
        let cli = Cli::try_parse_from([
            "codefinder",
            "stats",
            "--backend",
            "sqlite",
            "--database",
            "/tmp/codes.db",
            "--no-seed",
        ])
        .unwrap();
        assert_eq!(cli.store.backend, Backend::Sqlite);
        assert_eq!(cli.store.database, Some(PathBuf::from("/tmp/codes.db")));
        assert!(cli.store.no_seed);
    }

    #[test]
    fn test_bare_invocation_serves_with_validated_bind() {
        std::env::set_var("CODEFINDER_BIND", "not-an-addr");
        let bare = Cli::try_parse_default_serve(["codefinder", "--no-seed"]);
        let explicit = Cli::try_parse_default_serve(["codefinder", "serve"]);
        std::env::remove_var("CODEFINDER_BIND");
        assert!(bare.is_err());
        assert!(explicit.is_err());

        let cli = Cli::try_parse_default_serve(["codefinder", "--no-seed"]).unwrap();
        assert!(cli.store.no_seed);
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.bind, crate::config::DEFAULT_BIND.parse::<SocketAddr>().unwrap())
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_bind() {
        let cli = Cli::try_parse_from(["codefinder", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.bind.port(), 8080),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
