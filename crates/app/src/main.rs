//! Storefront Application CLI

use std::process;

use clap::Parser;
use storefront_app::observability;

mod cli;

#[tokio::main]
async fn main() {
    _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        #[expect(
            clippy::print_stderr,
            reason = "command failures are reported on stderr for the terminal user"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}
