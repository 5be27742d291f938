//! Hackathon coordinator CLI entry point.

use clap::Parser;

use hackathon_coordinator::cli::{handle_error, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = cli.execute().await {
        handle_error(err, json_mode);
    }
}
