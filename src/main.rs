//! CLI entry point for the TorrentBD adapter.

use anyhow::{Context, Result};
use clap::Parser;
use torrentbd::parser::ENGINE_URL;
use torrentbd::settings::{find_settings_file, settings_search_dirs};
use torrentbd::{ENGINE_NAME, PrettyPrinter, TorrentBd, load_settings, supported_categories};
use tracing::{debug, info};

mod cli;
mod logging;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let settings = load_settings(args.settings.as_deref());
    let log_to_file = settings.as_ref().is_some_and(|s| s.enable_logging);
    logging::init_tracing(args.verbose, args.quiet, log_to_file);
    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Capabilities => {
            println!("name: {ENGINE_NAME}");
            println!("url: {ENGINE_URL}");
            println!(
                "categories: {}",
                supported_categories().collect::<Vec<_>>().join(" ")
            );
        }
        Command::Settings => {
            let source = if args.settings.as_deref().is_some_and(|s| !s.is_empty()) {
                "--settings".to_string()
            } else {
                find_settings_file(&settings_search_dirs())
                    .map_or_else(|| "(none found)".to_string(), |p| p.display().to_string())
            };
            println!("source: {source}");
            match &settings {
                Some(settings) => println!(
                    "{}",
                    serde_json::to_string_pretty(&settings.to_map(true))
                        .context("serializing settings")?
                ),
                None => info!("no valid settings found"),
            }
        }
        Command::Search { what, category } => {
            let mut adapter = TorrentBd::new(settings).context("creating HTTP session")?;
            let mut printer = PrettyPrinter::stdout();
            let count = adapter.search(&what, &category, &mut printer).await;
            info!(count, "search finished");
        }
        Command::Download { url } => {
            let mut adapter = TorrentBd::new(settings).context("creating HTTP session")?;
            if let Some(downloaded) = adapter.download_torrent(&url).await {
                println!("{downloaded}");
            }
        }
    }

    Ok(())
}
