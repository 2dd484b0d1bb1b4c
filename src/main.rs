use clap::Parser;

use digirp_lib::cli::{execute, Cli};
use digirp_lib::AppPaths;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let paths = AppPaths::resolve(cli.data_dir.clone());
    let log_guard = digirp_lib::init_logging(&paths, cli.verbose);

    if let Err(e) = execute(cli, paths).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}
