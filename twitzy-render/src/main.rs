use clap::Parser;
use log::info;
use std::{io, path::PathBuf, rc::Rc};
use thiserror::Error as ThisError;
use tokio::fs::{read_to_string, write};
use tracing_subscriber::EnvFilter;
use twitzy_components::{App, Config, RenderError};
use twitzy_tweet::{TimestampError, TweetRecord, TweetThread, Zone};

mod page;
mod probe;

use page::{document, thread_page, TRIGGER_LABEL};
use probe::HttpImageProbe;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Failed to read tweets from file: {0}")]
    ReadFile(#[source] io::Error),
    #[error("Failed to parse tweets from JSON: {0}")]
    JsonFromString(#[source] serde_json::Error),
    #[error("Thread has no tweets")]
    EmptyThread,
    #[error("Invalid UTC offset: {0}")]
    UtcOffset(#[source] TimestampError),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("Failed to render thread: {0}")]
    Render(#[from] RenderError),
    #[error("Trigger \"{0}\" not found")]
    TriggerMissing(&'static str),
    #[error("Failed to write to file: {0}")]
    WriteFile(#[source] io::Error),
}

/// Render a tweet thread to a static HTML page.
#[derive(Debug, Parser)]
#[command(name = "twitzy-render", version)]
struct Args {
    /// JSON array of tweets, head first
    #[arg(long)]
    input: PathBuf,
    /// Where to write the page
    #[arg(long)]
    output: PathBuf,
    /// Render the thread expanded
    #[arg(long)]
    open: bool,
    /// Fetch avatar images and only show those that load
    #[arg(long)]
    probe_avatars: bool,
    /// Show timestamps at this offset (`+HH:MM`) instead of local time
    #[arg(long)]
    utc_offset: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    run(args).await
}

async fn run(args: Args) -> Result<(), Error> {
    let Args {
        input,
        output,
        open,
        probe_avatars,
        utc_offset,
    } = args;

    let json = read_to_string(&input).await.map_err(Error::ReadFile)?;
    let tweets: Vec<TweetRecord> = serde_json::from_str(&json).map_err(Error::JsonFromString)?;
    let thread = TweetThread::from_tweets(tweets).ok_or(Error::EmptyThread)?;
    info!("Read thread {} with {} tweets", thread.thread_id(), thread.tweet_count());

    let time_zone = match utc_offset {
        Some(offset) => Zone::from_offset_str(&offset).map_err(Error::UtcOffset)?,
        None => Zone::Local,
    };
    let config = Config {
        time_zone,
        ..Config::default()
    };
    let title = format!("{} thread", thread.head.author);

    let mut app = App::with_config(thread_page(thread), config);
    if probe_avatars {
        let client = reqwest::Client::builder()
            .build()
            .map_err(Error::HttpClient)?;
        app = app.with_image_probe(Rc::new(HttpImageProbe::new(client)));
    }

    app.render()?;
    if open && !app.click_part("thread-trigger")? {
        return Err(Error::TriggerMissing(TRIGGER_LABEL));
    }
    if probe_avatars {
        let probed = app.settle().await?;
        info!("Probed {} avatars", probed);
    }

    let page = document(&title, app.output());
    write(&output, page).await.map_err(Error::WriteFile)?;
    info!("Wrote {}", output.display());

    Ok(())
}
