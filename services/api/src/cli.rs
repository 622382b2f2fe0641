use crate::demo::{run_demo, run_optimize, DemoArgs, OptimizeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use partner_plan::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Partner Structure Optimizer",
    about = "Size, allocate, and score partner-network structures from the command line",
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
    /// Run one optimization and print the result
    Optimize(OptimizeArgs),
    /// Run an end-to-end demo covering optimization and scenario analysis
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Optimize(args) => run_optimize(args),
        Command::Demo(args) => run_demo(args),
    }
}
