mod cli;
mod commands;
mod report;
mod settings;
mod transport;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use commands::Session;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = settings::load(
        args.config.as_deref(),
        args.api_url.as_deref(),
        args.maps_key.as_deref(),
    )?;
    if config.maps_subscription_key.is_empty() {
        log::warn!("no Azure Maps key configured; address search and routing will fail");
    }

    let session = Session::new(config);
    if let Err(err) = commands::run(&session, args.command).await {
        eprintln!("{} {err}", "❌".red());
        log::debug!("{err:?}");
        std::process::exit(1);
    }
    Ok(())
}
