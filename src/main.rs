use canary_mesh::cli::Cli;
use canary_mesh::error::Result;
use clap::Parser;

mod main_dispatch;
mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    main_dispatch::run(&cli).await
}
