use clap::{Parser, Subcommand};
use storefront_app::config::AppConfig;

mod cart;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Cart(command) => cart::run(self.config, command).await,
        }
    }
}
