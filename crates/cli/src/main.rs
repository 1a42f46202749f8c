//! pagedate command line entry point.
//!
//! `extract` prints the result for one HTML file; `cutoff` filters a scraped
//! corpus down to pages whose latest date is on or before a cutoff.
//! Logs go to stderr so stdout stays valid JSON.

mod corpus;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pagedate_client::{DateExtractor, Extractor, LlmDateExtractor};
use pagedate_core::AppConfig;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use corpus::{CutoffRecord, parse_corpus};

#[derive(Parser)]
#[command(name = "pagedate", version, about = "Publication and modification dates for HTML pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract dates from one HTML file and print the result as JSON
    Extract {
        /// HTML file to read
        file: PathBuf,
        /// Ask the configured chat model instead of running the waterfall
        #[arg(long)]
        llm: bool,
        /// Source URL passed to the model as context
        #[arg(long)]
        url: Option<String>,
    },
    /// Keep corpus pages whose latest date is on or before the cutoff
    Cutoff {
        /// Corpus JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Cutoff date (YYYY-MM-DD)
        #[arg(short, long, env = "PAGEDATE_CUTOFF")]
        cutoff: NaiveDate,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use the chat model for every page
        #[arg(long)]
        llm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Extract { file, llm, url } => {
            let html = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let extractor = build_extractor(&config, llm)?;
            let result = extractor.extract_dates(&html, url.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Cutoff { input, cutoff, output, llm } => {
            let extractor = build_extractor(&config, llm)?;
            let kept = run_cutoff(&input, cutoff, extractor, config.llm_max_concurrency).await?;
            let json = serde_json::to_string_pretty(&kept)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Wrote {} cutoff results to {}", kept.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn build_extractor(config: &AppConfig, llm: bool) -> Result<Arc<dyn Extractor>> {
    if llm {
        Ok(Arc::new(LlmDateExtractor::new(config.llm())?))
    } else {
        Ok(Arc::new(DateExtractor::from_app_config(config)))
    }
}

async fn run_cutoff(
    input: &Path, cutoff: NaiveDate, extractor: Arc<dyn Extractor>, max_concurrency: usize,
) -> Result<Vec<CutoffRecord>> {
    let raw = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let records = parse_corpus(&raw).with_context(|| format!("parsing corpus {}", input.display()))?;
    tracing::info!(records = records.len(), %cutoff, "filtering corpus");

    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let Some(html) = record.html().map(str::to_string) else {
            tracing::debug!(url = %record.url, "skipping failed fetch");
            continue;
        };
        let permit = semaphore.clone().acquire_owned().await?;
        let extractor = extractor.clone();

        join_set.spawn(async move {
            let _permit = permit;
            let result = extractor.extract_dates(&html, Some(record.url.as_str())).await;
            (index, record.url, result)
        });
    }

    let mut kept = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let (index, url, result) = joined?;
        match result {
            Ok(result) => kept.extend(CutoffRecord::keep(&url, &result, cutoff).map(|r| (index, r))),
            Err(e) => tracing::warn!(%url, error = %e, "extraction failed"),
        }
    }

    kept.sort_by_key(|(index, _)| *index);
    Ok(kept.into_iter().map(|(_, record)| record).collect())
}
