//! Dashboard panel subcommands

use super::{print_json, CliResult};
use clap::{Args, Subcommand};
use dashq_core::errors::{ExError, ExErrorKind};
use dashq_engine::check_dashboard_and_panel;
use dashq_store::{DashboardRepo, SqlStore};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PanelArgs {
    #[command(subcommand)]
    pub command: PanelCommand,
}

#[derive(Debug, Subcommand)]
pub enum PanelCommand {
    /// Check that a panel exists on a dashboard
    Check(CheckArgs),
    /// Store a dashboard document from a JSON file
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long, default_value_t = 1)]
    pub org: i64,

    #[arg(long, default_value = "")]
    pub dashboard: String,

    #[arg(long, default_value_t = 0)]
    pub panel: i64,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(long, default_value_t = 1)]
    pub org: i64,

    #[arg(long)]
    pub uid: String,

    #[arg(long, default_value = "")]
    pub title: String,

    /// Dashboard JSON document
    #[arg(long)]
    pub file: PathBuf,
}

pub fn execute(store: &SqlStore, args: PanelArgs) -> CliResult {
    match args.command {
        PanelCommand::Check(check) => {
            check_dashboard_and_panel(store, check.org, &check.dashboard, check.panel)?;
            print_json(&serde_json::json!({
                "dashboardUid": check.dashboard,
                "panelId": check.panel,
                "ok": true,
            }))
        }
        PanelCommand::Import(import) => {
            let data = std::fs::read_to_string(&import.file).map_err(|e| {
                ExError::new(ExErrorKind::Io)
                    .with_op("read_dashboard")
                    .with_message(format!("{}: {}", import.file.display(), e))
            })?;
            let id = store.with_transaction(|tx| {
                DashboardRepo::upsert_dashboard(tx, import.org, &import.uid, &import.title, Some(&data))
            })?;
            print_json(&serde_json::json!({ "id": id, "uid": import.uid }))
        }
    }
}
