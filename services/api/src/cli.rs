use crate::demo::{run_demo, DemoArgs};
use crate::reconcile::{run_reconcile, ReconcileArgs};
use crate::server;
use bto_allocation::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "BTO Allocation Service",
    about = "Serve, audit and demonstrate the BTO flat allocation engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Load the data directory, report what reconciliation repaired and optionally write it back
    Reconcile(ReconcileArgs),
    /// Walk through registration, booking and withdrawal against an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured CSV data directory
    #[arg(long)]
    pub(crate) data_dir: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Reconcile(args) => run_reconcile(args),
        Command::Demo(args) => run_demo(args),
    }
}
