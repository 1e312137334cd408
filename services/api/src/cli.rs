use crate::commands::{run_rank, run_search, RankArgs, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use school_match::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "school-match",
    about = "Rank institutions by academic fit and serve the matching API",
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
    /// Rank the catalog for a profile stored as a JSON file
    Rank(RankArgs),
    /// Search the catalog by institution name
    Search(SearchArgs),
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
        Command::Rank(args) => run_rank(args),
        Command::Search(args) => run_search(args),
    }
}
