//! Terminal host for the post feed.
//!
//! Each `--fetches` count is one press of the fetch button. The list is
//! printed to stdout whenever it changes; notifications and logs go to
//! stderr.

mod config;
mod queue;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use postfeed_core::{CompletionOutcome, FetchController, OverlapPolicy, PostsClient};
use tracing_subscriber::EnvFilter;

use config::{Overrides, Settings};
use queue::ThreadedQueue;
use render::{RedrawFlag, StreamNotifier};

#[derive(Parser, Debug)]
#[command(name = "postfeed", version, about = "Fetch the post feed and print it as a list")]
struct Args {
    /// TOML settings file (defaults to ./postfeed.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Feed URL to GET
    #[arg(long)]
    endpoint: Option<String>,
    /// Transport timeout for each request
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// newest-issued or last-completed
    #[arg(long)]
    overlap: Option<OverlapPolicy>,
    /// How many fetches to trigger back to back
    #[arg(long, default_value_t = 1)]
    fetches: u32,
    /// tracing filter, e.g. `postfeed_core=debug`; falls back to RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
            overlap: self.overlap,
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref());

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    tracing::info!(endpoint = %settings.endpoint, overlap = %settings.overlap, "starting");

    let (queue, completions) = ThreadedQueue::new(settings.timeout);
    let redraw = RedrawFlag::default();
    let mut controller = FetchController::new(
        PostsClient::new(&settings.endpoint),
        queue,
        StreamNotifier::new(std::io::stderr()),
        redraw.clone(),
    )
    .with_policy(settings.overlap);

    for _ in 0..args.fetches {
        controller.trigger_fetch();
    }

    let mut applied = 0usize;
    let mut failed = 0usize;
    let stdout = std::io::stdout();
    while controller.in_flight() > 0 {
        let completion = completions
            .recv()
            .context("request queue stopped before all fetches completed")?;
        match controller.complete(completion) {
            CompletionOutcome::Applied { .. } => applied += 1,
            CompletionOutcome::Failed(_) => failed += 1,
            CompletionOutcome::Stale => {}
        }
        if let Some(len) = redraw.take() {
            tracing::debug!(len, "redrawing list");
            render::write_list(&mut stdout.lock(), controller.adapter())?;
        }
    }

    if applied == 0 && failed > 0 {
        bail!("no fetch succeeded ({failed} failed)");
    }
    Ok(())
}
