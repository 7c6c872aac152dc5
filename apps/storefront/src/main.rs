//! Storefront CLI entry point.

use std::process;

use clap::Parser;
use storefront_lib::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = storefront_lib::run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}
