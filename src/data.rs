//! Reading of fixture and xG files, and writing of the derived artefacts.
//!
//! A season directory holds a `fixtures.csv` and one subdirectory per xG source:
//!
//! ```text
//! season/
//! ├── fixtures.csv
//! ├── footystats/
//! │   ├── spieltag-1.csv
//! │   └── spieltag-2.csv
//! └── soccerway/
//!     └── spieltag-1.csv
//! ```
//!
//! Team names are normalised through the configured alias table as they are read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{Config, TeamAliases};
use crate::csv::{CsvReader, CsvWriter, Header, Record};
use crate::domain::error::check_xg;
use crate::domain::{
    FixtureId, FixtureStatus, MatchFixture, Matchday, Score, Side, SourceId, XgObservation,
};
use crate::file;
use crate::print::{matchday_series, Metric};
use crate::season::{Season, SeasonSnapshot};
use crate::table::RankedTable;

pub const FIXTURES_FILE: &str = "fixtures.csv";

const MATCHDAY: &str = "matchday";
const HOME_TEAM: &str = "home_team";
const AWAY_TEAM: &str = "away_team";
const KICKOFF: &str = "kickoff";
const STATUS: &str = "status";
const HOME_GOALS: &str = "home_goals";
const AWAY_GOALS: &str = "away_goals";
const HOME_XG: &str = "home_xg";
const AWAY_XG: &str = "away_xg";

/// Extracts the matchday from file names of the form `spieltag-7.csv` or `Spieltag_7_xg.csv`.
#[derive(Debug, Clone)]
pub struct MatchdayPattern(Regex);
impl MatchdayPattern {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self(Regex::new(r"(?i)spieltag[-_ ]?(\d+)")?))
    }

    pub fn matchday(&self, path: &Path) -> Option<Matchday> {
        let name = path.file_name()?.to_str()?;
        let captures = self.0.captures(name)?;
        captures.get(1)?.as_str().parse().ok()
    }
}

#[derive(Debug, Default)]
pub struct FixtureList {
    pub fixtures: Vec<MatchFixture>,
    pub results: BTreeMap<FixtureId, Score>,
}

/// Reads `fixtures.csv`. Goals are blank for unplayed fixtures. When the `status` column is
/// absent, a fixture with goals is taken as completed and one without as scheduled.
pub fn read_fixtures(path: impl AsRef<Path>, aliases: &TeamAliases) -> anyhow::Result<FixtureList> {
    let path = path.as_ref();
    let mut reader = CsvReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let header = match reader.read() {
        None => bail!("{} is empty", path.display()),
        Some(names) => Header::new(&names?),
    };
    for column in [MATCHDAY, HOME_TEAM, AWAY_TEAM] {
        if header.ordinal(column).is_none() {
            bail!("{} has no '{column}' column", path.display());
        }
    }

    let mut list = FixtureList::default();
    while let Some(row) = reader.read() {
        let row = row?;
        let line = reader.line_number();
        let parse = || -> anyhow::Result<(MatchFixture, Option<Score>)> {
            let matchday = parse_matchday(header.cell(&row, MATCHDAY))?;
            let home = aliases.resolve(require(&header, &row, HOME_TEAM)?);
            let away = aliases.resolve(require(&header, &row, AWAY_TEAM)?);
            let kickoff = header
                .cell(&row, KICKOFF)
                .map(|kickoff| NaiveDate::parse_from_str(kickoff, "%Y-%m-%d"))
                .transpose()
                .context("invalid kickoff date")?;
            let score = match (header.cell(&row, HOME_GOALS), header.cell(&row, AWAY_GOALS)) {
                (Some(home), Some(away)) => Some(Score::new(
                    home.parse().with_context(|| format!("invalid home goals '{home}'"))?,
                    away.parse().with_context(|| format!("invalid away goals '{away}'"))?,
                )),
                (None, None) => None,
                _ => bail!("goals given for one side only"),
            };
            let status = match header.cell(&row, STATUS) {
                Some(status) => FixtureStatus::from_str(status)
                    .with_context(|| format!("invalid status '{status}'"))?,
                None if score.is_some() => FixtureStatus::Completed,
                None => FixtureStatus::Scheduled,
            };
            Ok((
                MatchFixture {
                    id: FixtureId::new(matchday, home, away),
                    kickoff,
                    status,
                },
                score,
            ))
        };
        let (fixture, score) = parse().with_context(|| format!("{}:{line}", path.display()))?;
        if let Some(score) = score {
            list.results.insert(fixture.id.clone(), score);
        }
        list.fixtures.push(fixture);
    }
    debug!(
        "read {} fixtures ({} results) from {}",
        list.fixtures.len(),
        list.results.len(),
        path.display()
    );
    Ok(list)
}

/// Reads the xG observations of one `source` from a single file. The matchday comes from the
/// `matchday` column or, failing that, from the file name. Rows with a blank xG cell carry no
/// observation and are skipped.
pub fn read_observations(
    path: impl AsRef<Path>,
    source: &SourceId,
    aliases: &TeamAliases,
    pattern: &MatchdayPattern,
) -> anyhow::Result<Vec<XgObservation>> {
    let path = path.as_ref();
    let mut reader = CsvReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let header = match reader.read() {
        None => return Ok(vec![]),
        Some(names) => Header::new(&names?),
    };
    let file_matchday = pattern.matchday(path);
    if header.ordinal(MATCHDAY).is_none() && file_matchday.is_none() {
        bail!(
            "{} has neither a '{MATCHDAY}' column nor a matchday in its name",
            path.display()
        );
    }

    let mut observations = vec![];
    while let Some(row) = reader.read() {
        let row = row?;
        let line = reader.line_number();
        let parse = || -> anyhow::Result<Option<XgObservation>> {
            let matchday = match header.cell(&row, MATCHDAY) {
                Some(matchday) => parse_matchday(Some(matchday))?,
                None => file_matchday.ok_or_else(|| anyhow!("missing {MATCHDAY}"))?,
            };
            let home = aliases.resolve(require(&header, &row, HOME_TEAM)?);
            let away = aliases.resolve(require(&header, &row, AWAY_TEAM)?);
            let fixture = FixtureId::new(matchday, home, away);
            let (home_xg, away_xg) = match (header.cell(&row, HOME_XG), header.cell(&row, AWAY_XG)) {
                (Some(home_xg), Some(away_xg)) => (
                    parse_xg(Side::Home, home_xg)?,
                    parse_xg(Side::Away, away_xg)?,
                ),
                (None, None) => return Ok(None),
                _ => {
                    warn!("{source} has xG for one side only in {fixture}; skipping");
                    return Ok(None);
                }
            };
            Ok(Some(XgObservation {
                source: source.clone(),
                fixture,
                home_xg,
                away_xg,
            }))
        };
        if let Some(observation) = parse().with_context(|| format!("{}:{line}", path.display()))? {
            observations.push(observation);
        }
    }
    Ok(observations)
}

/// Reads every CSV file under a source's directory, in file name order.
pub fn read_source_dir(
    dir: impl AsRef<Path>,
    source: &SourceId,
    aliases: &TeamAliases,
    pattern: &MatchdayPattern,
) -> anyhow::Result<Vec<XgObservation>> {
    let mut files = vec![];
    file::recurse_dir(dir.as_ref().into(), &mut files, &mut |ext| ext == "csv")?;
    let mut observations = vec![];
    for file in files {
        let mut read = read_observations(&file, source, aliases, pattern)?;
        debug!("read {} observations from {}", read.len(), file.display());
        observations.append(&mut read);
    }
    Ok(observations)
}

/// Assembles a snapshot from a season directory. Only the enabled sources are read; a source
/// without a directory is treated as having no data yet.
pub fn read_snapshot(
    dir: impl AsRef<Path>,
    config: &Config,
    generation: u64,
) -> anyhow::Result<SeasonSnapshot> {
    let dir = dir.as_ref();
    let aliases = config.team_aliases();
    let pattern = MatchdayPattern::new()?;
    let FixtureList { fixtures, results } = read_fixtures(dir.join(FIXTURES_FILE), &aliases)?;

    let mut observations = vec![];
    for source in &config.enabled_sources {
        let source_dir = source_dir(dir, source);
        if !source_dir.is_dir() {
            warn!("no data for {source} under {}", source_dir.display());
            continue;
        }
        let mut read = read_source_dir(&source_dir, source, &aliases, &pattern)?;
        info!("{source}: {} observations", read.len());
        observations.append(&mut read);
    }

    Ok(SeasonSnapshot {
        generation,
        fixtures,
        observations,
        results,
    })
}

pub fn source_dir(dir: &Path, source: &SourceId) -> PathBuf {
    dir.join(source.as_str())
}

pub const TABLE_COLUMNS: [&str; 18] = [
    "rank",
    "team",
    "xp",
    "points",
    "point_difference",
    "actual_rank",
    "position_delta",
    "played",
    "won",
    "drawn",
    "lost",
    "goals_for",
    "goals_against",
    "xg_for",
    "xg_against",
    "xg_difference",
    "xp_matches",
    "points_per_match",
];

pub fn write_table_csv(path: impl AsRef<Path>, table: &RankedTable) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = CsvWriter::create(path).with_context(|| format!("creating {}", path.display()))?;
    writer.append(TABLE_COLUMNS)?;
    for row in &table.rows {
        let record = &row.record;
        let points_per_match = if record.played == 0 {
            0.0
        } else {
            record.points as f64 / record.played as f64
        };
        let mut csv = Record::with_values([row.rank]);
        csv.push(&record.team);
        csv.push(format!("{:.3}", record.xp));
        csv.push(record.points);
        csv.push(format!("{:.3}", row.point_difference()));
        csv.push(row.actual_rank);
        csv.push(row.position_delta);
        for count in [record.played, record.won, record.drawn, record.lost, record.goals_for, record.goals_against] {
            csv.push(count);
        }
        csv.push(format!("{:.3}", record.xg_for));
        csv.push(format!("{:.3}", record.xg_against));
        csv.push(format!("{:.3}", record.xg_difference()));
        csv.push(record.xp_matches);
        csv.push(format!("{points_per_match:.3}"));
        writer.append(csv)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `metric` for every team by matchday: a `team` column, one `MD<n>` column per
/// matchday and a closing `total`. A blank cell means the team had no entry that matchday.
pub fn write_matchdays_csv(path: impl AsRef<Path>, season: &Season, metric: Metric) -> anyhow::Result<()> {
    let path = path.as_ref();
    let cell = |value: f64| match metric {
        Metric::Points => format!("{value:.0}"),
        _ => format!("{value:.3}"),
    };
    let mut writer = CsvWriter::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut header = Record::with_values(["team"]);
    for matchday in season.matchdays.keys() {
        header.push(format!("MD{matchday}"));
    }
    header.push("total");
    writer.append(header)?;
    for series in matchday_series(season, metric) {
        let mut csv = Record::with_values([series.team]);
        for value in series.values {
            csv.push(value.map(cell).unwrap_or_default());
        }
        csv.push(cell(series.total));
        writer.append(csv)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<S: serde::Serialize>(path: impl AsRef<Path>, value: &S) -> anyhow::Result<()> {
    let path = path.as_ref();
    file::write_json(path, value).with_context(|| format!("writing {}", path.display()))
}

fn require<'a>(header: &Header, row: &'a [String], column: &str) -> anyhow::Result<&'a str> {
    header
        .cell(row, column)
        .ok_or_else(|| anyhow!("missing {column}"))
}

fn parse_matchday(cell: Option<&str>) -> anyhow::Result<Matchday> {
    let cell = cell.ok_or_else(|| anyhow!("missing {MATCHDAY}"))?;
    let matchday: Matchday = cell
        .parse()
        .with_context(|| format!("invalid {MATCHDAY} '{cell}'"))?;
    if matchday == 0 {
        bail!("{MATCHDAY} must be positive");
    }
    Ok(matchday)
}

fn parse_xg(side: Side, cell: &str) -> anyhow::Result<f64> {
    let value: f64 = cell
        .parse()
        .with_context(|| format!("invalid {side:?} xG '{cell}'"))?;
    Ok(check_xg(side, value)?)
}
