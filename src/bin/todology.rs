use std::error::Error;
use std::path::PathBuf;

use todology::client::{HttpFeed, TodoistSink};
use todology::settings::Settings;
use todology::{Ledger, RunSummary, Syncer};

#[tokio::main]
async fn main() {
    env_logger::init();

    match run().await {
        Ok(summary) => {
            println!("Sync finished: {}", summary);
            // Per-event failures are reported in the summary but are not fatal
        }
        Err(err) => {
            eprintln!("Sync failed: {}", err);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<RunSummary, Box<dyn Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let settings = Settings::from_file(&config_path)?;

    let feed = HttpFeed::new(&settings.feed.calendar)?;
    let sink = TodoistSink::new(
        settings.todoist.api_token,
        settings.todoist.project,
        settings.todoist.labels,
    );
    let ledger = Ledger::load(&settings.storage)?;

    let mut syncer = Syncer::new(feed, sink, ledger);
    let summary = syncer.run_now().await?;
    Ok(summary)
}
