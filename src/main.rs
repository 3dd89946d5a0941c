// infogen - LLM content card generator
// Main entry point

use anyhow::Result;
use clap::Parser;

use infogen::cli::{self, Cli};
use infogen::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    cli::run(cli).await
}
