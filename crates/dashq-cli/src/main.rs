//! dashq CLI
//!
//! Command-line interface for query history and dashboard panel checks

use clap::{Parser, Subcommand};
use dashq_core::logging_facility::Profile;
use dashq_core_types::{RequestContext, TraceId};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dashq")]
#[command(about = "dashq - Query history and dashboard panel checks", long_about = None)]
struct Cli {
    /// TOML store configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Logging profile: development, production or test
    #[arg(long, global = true, default_value = "development")]
    log_profile: Profile,

    /// Trace id to correlate with an upstream request
    #[arg(long, global = true)]
    trace_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query history operations
    History(commands::history::HistoryArgs),
    /// Dashboard panel operations
    Panel(commands::panel::PanelArgs),
    /// Create or upgrade the database schema
    Migrate,
}

fn main() {
    let cli = Cli::parse();
    dashq_core::logging_facility::init(cli.log_profile);

    let mut ctx = RequestContext::new();
    if let Some(trace_id) = cli.trace_id.clone() {
        ctx = ctx.with_trace_id(TraceId::from_string(trace_id));
    }
    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id,
        trace_id = ctx.trace_id.as_ref().map(TraceId::as_str)
    );
    let _guard = span.enter();

    let result = commands::open_store(cli.config.as_deref(), cli.db.as_deref()).and_then(|store| {
        match cli.command {
            Commands::History(args) => commands::history::execute(&store, args),
            Commands::Panel(args) => commands::panel::execute(&store, args),
            Commands::Migrate => commands::migrate(&store),
        }
    });

    if let Err(e) = result {
        let mut e = e.with_request_id(ctx.request_id.clone());
        if let Some(trace_id) = ctx.trace_id.clone() {
            e = e.with_trace_id(trace_id);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
