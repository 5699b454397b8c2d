use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use justice::csv::{CsvReader, CsvWriter, Header};
use justice::print::tabulate_scoregrid;
use justice::scoregrid;
use justice::scoregrid::DEFAULT_MAX_GOALS;
use justice::xp::{MatchXp, XpCalculator};

const ANNOTATION_COLUMNS: [&str; 5] = ["home_xP", "away_xP", "p_home_win", "p_draw", "p_away_win"];

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// home team xG
    #[clap(long)]
    home: Option<f64>,

    /// away team xG
    #[clap(long)]
    away: Option<f64>,

    /// goals per side enumerated by the scoreline model
    #[clap(long = "max-goals", default_value_t = DEFAULT_MAX_GOALS)]
    max_goals: u8,

    /// goals per side shown in the printed grid
    #[clap(long, default_value_t = 5)]
    grid: usize,

    /// CSV file with home_xG and away_xG columns to annotate with xP
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// where to write the annotated CSV; defaults to <file>_xp.csv
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        let single = self.home.is_some() || self.away.is_some();
        if single == self.file.is_some() {
            bail!("either --home and --away, or -f must be specified");
        }
        if single && (self.home.is_none() || self.away.is_none()) {
            bail!("both --home and --away must be specified");
        }
        if self.out.is_some() && self.file.is_none() {
            bail!("-o requires -f");
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

    let calculator = XpCalculator::new(args.max_goals)?;
    match (&args.file, args.home, args.away) {
        (Some(file), _, _) => {
            let out = match &args.out {
                Some(out) => out.clone(),
                None => annotated_path(file),
            };
            let annotated = annotate_file(&calculator, file, &out)?;
            info!("annotated {annotated} matches into {}", out.display());
        }
        (None, Some(home_xg), Some(away_xg)) => {
            let distribution = scoregrid::distribution(home_xg, away_xg, args.max_goals)?;
            let xp = MatchXp::from_probs(distribution.outcome_probs());
            let (home_goals, away_goals) = distribution.expectations();
            println!(
                "P(home)={:.4}, P(draw)={:.4}, P(away)={:.4}",
                xp.probs.home_win, xp.probs.draw, xp.probs.away_win
            );
            println!("xP {:.3}:{:.3}", xp.home_xp, xp.away_xp);
            println!(
                "most likely {}, expected goals in grid {home_goals:.3}:{away_goals:.3}, truncated mass {:.2e}",
                distribution.most_likely(),
                distribution.truncated_mass()
            );
            println!(
                "Scoreline %:\n{}",
                Console::default().render(&tabulate_scoregrid(&distribution, args.grid))
            );
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn annotated_path(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    file.with_file_name(format!("{stem}_xp.csv"))
}

/// Copies `file` to `out`, appending xP and outcome probabilities to each row. Rows without
/// both xG figures get blank annotations.
fn annotate_file(calculator: &XpCalculator, file: &Path, out: &Path) -> anyhow::Result<usize> {
    let mut reader = CsvReader::open(file).with_context(|| format!("opening {}", file.display()))?;
    let names = match reader.read() {
        None => bail!("{} is empty", file.display()),
        Some(names) => names?,
    };
    let header = Header::new(&names);
    let mut rows = vec![];
    let mut pairs = vec![];
    while let Some(row) = reader.read() {
        let row = row?;
        let line = reader.line_number();
        let parse = |column: &str| -> anyhow::Result<Option<f64>> {
            header
                .cell(&row, column)
                .map(|cell| cell.parse::<f64>())
                .transpose()
                .with_context(|| format!("{}:{line}: invalid {column}", file.display()))
        };
        pairs.push((parse("home_xg")?, parse("away_xg")?));
        rows.push(row);
    }
    let annotations = calculator.annotate(pairs)?;

    let mut writer = CsvWriter::create(out).with_context(|| format!("creating {}", out.display()))?;
    writer.append(names.iter().map(String::as_str).chain(ANNOTATION_COLUMNS))?;
    let mut annotated = 0;
    for (mut row, xp) in rows.into_iter().zip(annotations) {
        match xp {
            Some(xp) => {
                annotated += 1;
                row.extend(
                    [
                        xp.home_xp,
                        xp.away_xp,
                        xp.probs.home_win,
                        xp.probs.draw,
                        xp.probs.away_win,
                    ]
                    .map(|value| format!("{value:.4}")),
                );
            }
            None => row.extend(ANNOTATION_COLUMNS.map(|_| String::new())),
        }
        writer.append(&row)?;
    }
    writer.flush()?;
    Ok(annotated)
}
