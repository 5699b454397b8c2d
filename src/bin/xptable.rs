use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use justice::config::{parse_sources, Config};
use justice::data;
use justice::domain::Matchday;
use justice::print::{tabulate_matchdays, tabulate_matches, tabulate_table, Metric};
use justice::season::SeasonAggregator;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// season directory holding fixtures.csv and one subdirectory per xG source
    #[clap(short = 'd', long)]
    dir: PathBuf,

    /// JSON config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// comma-separated list of enabled sources, overriding the config
    #[clap(long)]
    sources: Option<String>,

    /// goals per side enumerated by the scoreline model
    #[clap(long = "max-goals")]
    max_goals: Option<u8>,

    /// print the per-match breakdown of a matchday
    #[clap(short = 'm', long)]
    matchday: Option<Matchday>,

    /// print a per-matchday series of xp, xg or points
    #[clap(long)]
    series: Option<Metric>,

    /// write the ranked table as CSV
    #[clap(long)]
    csv: Option<PathBuf>,

    /// write the ranked table as JSON
    #[clap(long)]
    json: Option<PathBuf>,

    /// write the per-matchday series as CSV; xp unless --series names another metric
    #[clap(long = "series-csv")]
    series_csv: Option<PathBuf>,

    /// write the full season aggregate as JSON
    #[clap(long = "season-json")]
    season_json: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.dir.is_dir() {
            bail!("{} is not a directory", self.dir.display());
        }
        if self.matchday == Some(0) {
            bail!("matchdays are numbered from 1");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(sources) = &args.sources {
        config.enabled_sources = parse_sources(sources);
    }
    if let Some(max_goals) = args.max_goals {
        config.max_goals = max_goals;
    }
    config.validate()?;
    info!(
        "sources: {:?}, max goals: {}",
        config.enabled_sources, config.max_goals
    );

    let generation = Utc::now().timestamp_millis() as u64;
    let snapshot = data::read_snapshot(&args.dir, &config, generation)?;
    let aggregator = SeasonAggregator::try_from(&config)?;
    let season = aggregator.rebuild_snapshot(&config.reconciler(), &snapshot)?;
    for warning in &season.warnings {
        warn!("{warning}");
    }
    if !season.pending.is_empty() {
        info!("{} fixtures awaiting xG", season.pending.len());
    }

    let table = season.table();
    println!("xP table:\n{}", Console::default().render(&tabulate_table(&table)));

    if let Some(metric) = args.series {
        println!(
            "{metric} by matchday:\n{}",
            Console::default().render(&tabulate_matchdays(&season, metric))
        );
    }

    if let Some(matchday) = args.matchday {
        let reports = season.matchday_reports(matchday).collect::<Vec<_>>();
        if reports.is_empty() {
            warn!("no fixtures on matchday {matchday}");
        } else {
            println!(
                "Matchday {matchday}:\n{}",
                Console::default().render(&tabulate_matches(reports))
            );
        }
    }

    if let Some(path) = &args.csv {
        data::write_table_csv(path, &table)?;
        info!("wrote table to {}", path.display());
    }
    if let Some(path) = &args.json {
        data::write_json(path, &table)?;
        info!("wrote table to {}", path.display());
    }
    if let Some(path) = &args.series_csv {
        let metric = args.series.unwrap_or(Metric::Xp);
        data::write_matchdays_csv(path, &season, metric)?;
        info!("wrote {metric} by matchday to {}", path.display());
    }
    if let Some(path) = &args.season_json {
        data::write_json(path, &season)?;
        info!("wrote season to {}", path.display());
    }
    Ok(())
}
