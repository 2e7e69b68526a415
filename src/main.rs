//! race-grades: election market grading pipeline.
//!
//! Pulls every mapped House/Senate/Governor prediction market from the
//! Kalshi public API, grades each race on liquidity, blends an adjusted
//! win probability, converts it to an implied margin and a rating, and
//! writes the dated grades JSON the site serves.

mod compare;
mod config;
mod ids;
mod output;

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use common::QuoteRecord;
use kalshi_client::KalshiPublicClient;
use output::RaceLinks;

/// Election market grading pipeline.
#[derive(Parser)]
#[command(name = "race-grades", about = "Election market grading pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull a market snapshot, grade every race, write the grades JSON.
    Run {
        /// CSV mapping race ids to Kalshi event tickers.
        #[arg(long, default_value = "kalshi_ids.csv")]
        ids: PathBuf,

        /// Directory for the dated grades JSON and latest.json.
        #[arg(long, default_value = "data/grades")]
        out_dir: PathBuf,

        /// Grade and log, but skip writing output files.
        #[arg(long)]
        dry_run: bool,
    },
    /// Compare a grades snapshot against a third-party rating sheet.
    Compare {
        /// Grades JSON produced by `run`.
        #[arg(long, default_value = "data/grades/latest.json")]
        grades: PathBuf,

        /// JSON map of rating label to race labels.
        #[arg(long)]
        reference: PathBuf,
    },
}

async fn run_snapshot(
    cfg: &config::PipelineConfig,
    ids_path: &PathBuf,
    out_dir: &PathBuf,
    dry_run: bool,
) -> Result<(), common::Error> {
    let mappings = ids::load_race_mappings(ids_path)?;
    let event_tickers = ids::unique_event_tickers(&mappings);
    let race_by_event = ids::race_id_by_event(&mappings);
    info!(
        "Loaded {} race mappings ({} events) from {}",
        mappings.len(),
        event_tickers.len(),
        ids_path.display()
    );

    let client = KalshiPublicClient::new(&cfg.base_url, cfg.requests_per_second);

    info!("Pulling markets from Kalshi (public API, no auth)...");
    let fetched = client.fetch_event_markets(&event_tickers).await;
    if !fetched.failures.is_empty() {
        warn!(
            "{} of {} events failed to fetch",
            fetched.failures.len(),
            event_tickers.len()
        );
    }
    if fetched.markets.is_empty() {
        return Err(common::Error::Other("No markets returned.".into()));
    }
    info!("{} market contracts pulled.", fetched.markets.len());

    // Resolve display URLs once per event, then fan out to races.
    info!("Fetching series info for market URLs...");
    let mut url_by_event: HashMap<String, Option<String>> = HashMap::new();
    for et in &event_tickers {
        let url = client.series_url(et).await;
        url_by_event.insert(et.clone(), url);
    }
    let links: HashMap<String, RaceLinks> = mappings
        .iter()
        .map(|m| {
            (
                m.race_id.clone(),
                RaceLinks {
                    event_ticker: Some(m.event_ticker.clone()),
                    kalshi_url: url_by_event
                        .get(&m.event_ticker)
                        .cloned()
                        .flatten(),
                },
            )
        })
        .collect();

    // Tag each contract with its race id; markets without a mapped
    // event are dropped.
    let quotes: Vec<QuoteRecord> = fetched
        .markets
        .iter()
        .filter_map(|m| {
            race_by_event
                .get(&m.event_ticker)
                .map(|race_id| QuoteRecord::from_market(race_id.clone(), m))
        })
        .collect();

    let today = Utc::now().date_naive();
    let days_to_election = (cfg.election_day - today).num_days().max(0);
    info!(
        "Computing liquidity scores and adjusted probabilities ({} days to election)...",
        days_to_election
    );

    let report = grading::run_pipeline(&quotes, days_to_election, &cfg.engine);
    info!(
        "{} races with full data, {} too thin to rate, {} auto-labeled Solid D/R.",
        report.rated_count, report.unrated_count, report.auto_labeled_count
    );
    info!(
        "Grade cutoffs: A>={:.3}  B>={:.3}  C>={:.3}  D>={:.3}  F=rest",
        report.thresholds.p80,
        report.thresholds.p60,
        report.thresholds.p40,
        report.thresholds.p20
    );

    let snapshot = output::build_snapshot(&today.to_string(), report.races, &links);
    if dry_run {
        info!(
            "Dry run: skipping write of {} races to {}",
            snapshot.total_races,
            out_dir.display()
        );
        return Ok(());
    }

    output::write_snapshot(out_dir, &snapshot)?;
    info!(
        "Wrote {} races to {}",
        snapshot.total_races,
        out_dir.join(format!("{}.json", snapshot.date)).display()
    );
    info!("Wrote latest.json to {}", out_dir.join("latest.json").display());
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "race_grades=info,kalshi_client=info,grading=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run {
            ids,
            out_dir,
            dry_run,
        } => {
            let cfg = match config::load_config() {
                Ok(c) => c,
                Err(e) => {
                    error!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            };
            run_snapshot(&cfg, &ids, &out_dir, dry_run).await
        }
        Command::Compare { grades, reference } => compare::run(&grades, &reference),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
