mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Parse CLI, load config, initialize logging and dispatch.
    if let Err(err) = Cli::run_from_args().await {
        eprintln!("boxsync error: {:#}", err);
        std::process::exit(1);
    }
}
