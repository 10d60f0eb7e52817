use bto_allocation::config::AppConfig;
use bto_allocation::error::AppError;
use bto_allocation::telemetry;
use bto_allocation::workflows::allocation::{AllocationSession, CsvStore, ReconcileReport};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ReconcileArgs {
    /// CSV data directory to audit (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Write the repaired ledger back to the data directory
    #[arg(long)]
    pub(crate) write: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    telemetry::init(&config.telemetry)?;

    let session = AllocationSession::open(CsvStore::new(config.storage.data_dir.clone()))?;
    let report = session.report();

    if args.json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Reconcile report unavailable: {err}"),
        }
    } else {
        println!("Reconciled {}", session.store().root().display());
        for line in render_report(report) {
            println!("{line}");
        }
    }

    if args.write && !report.is_clean() {
        session.save()?;
        info!(
            data_dir = %config.storage.data_dir.display(),
            "repaired ledger written back"
        );
        println!("Repaired ledger written back.");
    }

    Ok(())
}

fn render_report(report: &ReconcileReport) -> Vec<String> {
    if report.is_clean() {
        return vec!["- ledger is consistent, nothing skipped or adjusted".to_string()];
    }

    let mut lines = Vec::new();
    for (collection, count) in &report.skipped {
        lines.push(format!("- skipped {count} {collection} record(s)"));
    }
    for adjustment in &report.inventory_adjustments {
        lines.push(format!(
            "- {} {}: recorded {}, bookings leave {}, now {}",
            adjustment.project,
            adjustment.flat_type.label(),
            adjustment.persisted_available,
            adjustment.derived_available,
            adjustment.reconciled_available
        ));
    }
    for key in &report.restored_withdrawals {
        lines.push(format!("- {key}: withdrawal request rebuilt from application status"));
    }
    for adjustment in &report.slot_adjustments {
        lines.push(format!(
            "- {} officer slots: available {} -> {}",
            adjustment.project, adjustment.persisted_available, adjustment.derived_available
        ));
    }
    lines
}
