mod commands;
mod config;
mod error;
mod prompt;

use clap::Parser;
use ledger::{App, FileTokenStore, HttpClient};

use crate::{config::Args, error::Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "thing_ledger={level},ledger={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = HttpClient::new(&settings.base_url)?;
    let tokens = FileTokenStore::new(settings.token_path.clone());
    let mut app = App::new(client, Box::new(tokens), settings.settings());

    if let Err(err) = commands::run(&mut app, args.command).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}
