//! authflight CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use authflight::cli::{auth, Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match auth::client_from_cli(&cli) {
        Ok(client) => match &cli.command {
            Commands::Login(args) => auth::handle_login(&client, args).await,
            Commands::Logout => auth::handle_logout(&client),
            Commands::Status => auth::handle_status(&client),
            Commands::Request(args) => auth::handle_request(&client, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
