//! Season aggregation: a pure rebuild of per-team cumulative records from a snapshot of
//! fixtures, canonical xG figures and actual results.
//!
//! A fixture moves through three states. It is _pending_ until a canonical xG pair is
//! available, _resolved_ once it is, and _included_ when it is also completed with a known
//! result. Resolved fixtures contribute xP and xG to both teams; only included fixtures
//! contribute to the actual columns, so both sets of columns cover the same matches. Pending
//! and postponed fixtures contribute nothing.
//!
//! Rebuilding is idempotent: the same inputs always yield the same [`Season`], down to the
//! order of floating-point accumulation.

use std::collections::BTreeMap;
use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::error::InvalidInput;
use crate::domain::{
    CanonicalMatchXg, FixtureId, FixtureStatus, MatchFixture, Matchday, Score, Side, TeamId,
    XgObservation,
};
use crate::reconcile::{Reconciler, ReconciliationWarning};
use crate::table::{rank, RankedTable};
use crate::xp::{MatchXp, XpCalculator};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonRecord {
    pub team: TeamId,
    /// Included fixtures: completed, with a known result and xG.
    pub played: u16,
    pub won: u16,
    pub drawn: u16,
    pub lost: u16,
    pub points: u16,
    pub goals_for: u16,
    pub goals_against: u16,
    /// Fixtures that contributed xP, played or not.
    pub xp_matches: u16,
    pub xp: f64,
    pub xg_for: f64,
    pub xg_against: f64,
}
impl TeamSeasonRecord {
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            ..Self::default()
        }
    }

    pub fn xg_difference(&self) -> f64 {
        self.xg_for - self.xg_against
    }

    pub fn goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }

    fn include_xp(&mut self, xp: f64, xg_for: f64, xg_against: f64) {
        self.xp_matches += 1;
        self.xp += xp;
        self.xg_for += xg_for;
        self.xg_against += xg_against;
    }

    fn include_result(&mut self, score: &Score, side: &Side) {
        self.played += 1;
        self.goals_for += score.goals(side) as u16;
        self.goals_against += score.goals(&side.flip()) as u16;
        let points = score.points(side);
        self.points += points as u16;
        match points {
            3 => self.won += 1,
            1 => self.drawn += 1,
            _ => self.lost += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureState {
    Pending,
    Resolved,
    Included,
}

/// Point-in-time view of a single fixture after a rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub fixture: MatchFixture,
    pub xg: Option<CanonicalMatchXg>,
    pub xp: Option<MatchXp>,
    pub result: Option<Score>,
}
impl MatchReport {
    pub fn state(&self) -> FixtureState {
        match (&self.xp, self.fixture.is_completed() && self.result.is_some()) {
            (None, _) => FixtureState::Pending,
            (Some(_), false) => FixtureState::Resolved,
            (Some(_), true) => FixtureState::Included,
        }
    }
}

/// One team's contribution within a single matchday.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchdayEntry {
    pub xp: f64,
    pub xg: f64,
    pub points: u16,
    pub played: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SeasonWarning {
    #[error("{0}")]
    Reconciliation(#[from] ReconciliationWarning),

    #[error("result supplied for {0}, which is not a known fixture")]
    UnknownFixtureResult(FixtureId),

    #[error("result supplied for {fixture}, which is {status} rather than completed")]
    ResultNotCompleted {
        fixture: FixtureId,
        status: FixtureStatus,
    },

    #[error("{0} is completed but has no result")]
    MissingResult(FixtureId),

    #[error("{0} appears more than once in the fixture list")]
    DuplicateFixture(FixtureId),
}

/// The aggregate produced by a single rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub generation: u64,
    pub records: BTreeMap<TeamId, TeamSeasonRecord>,
    pub matches: Vec<MatchReport>,
    pub matchdays: BTreeMap<Matchday, BTreeMap<TeamId, MatchdayEntry>>,
    pub pending: Vec<FixtureId>,
    pub warnings: Vec<SeasonWarning>,
}
impl Season {
    pub fn table(&self) -> RankedTable {
        rank(self.records.values())
    }

    pub fn match_report(&self, fixture: &FixtureId) -> Option<&MatchReport> {
        self.matches
            .binary_search_by(|report| report.fixture.id.cmp(fixture))
            .ok()
            .map(|index| &self.matches[index])
    }

    pub fn matchday_reports(&self, matchday: Matchday) -> impl Iterator<Item = &MatchReport> {
        self.matches
            .iter()
            .filter(move |report| report.fixture.id.matchday == matchday)
    }
}

/// Immutable input to a rebuild. `generation` identifies the state it was taken from.
#[derive(Clone, Debug, Default)]
pub struct SeasonSnapshot {
    pub generation: u64,
    pub fixtures: Vec<MatchFixture>,
    pub observations: Vec<XgObservation>,
    pub results: BTreeMap<FixtureId, Score>,
}

#[derive(Debug, Clone)]
pub struct SeasonAggregator {
    calculator: XpCalculator,
}
impl SeasonAggregator {
    pub fn new(calculator: XpCalculator) -> Self {
        Self { calculator }
    }

    /// Reconciles the snapshot's observations and rebuilds the season from them.
    pub fn rebuild_snapshot(
        &self,
        reconciler: &Reconciler,
        snapshot: &SeasonSnapshot,
    ) -> Result<Season, InvalidInput> {
        let reconciliation = reconciler.reconcile_all(&snapshot.fixtures, &snapshot.observations);
        let mut season = self.rebuild(&snapshot.fixtures, &reconciliation.resolved, &snapshot.results)?;
        season.generation = snapshot.generation;
        let mut warnings = reconciliation
            .warnings
            .into_iter()
            .map(SeasonWarning::from)
            .collect::<Vec<_>>();
        warnings.append(&mut season.warnings);
        season.warnings = warnings;
        Ok(season)
    }

    pub fn rebuild(
        &self,
        fixtures: &[MatchFixture],
        canonical: &BTreeMap<FixtureId, CanonicalMatchXg>,
        results: &BTreeMap<FixtureId, Score>,
    ) -> Result<Season, InvalidInput> {
        let start_time = Instant::now();
        let mut warnings = vec![];

        let mut sorted = Vec::with_capacity(fixtures.len());
        let mut seen = FxHashSet::default();
        for fixture in fixtures {
            if seen.insert(&fixture.id) {
                sorted.push(fixture);
            } else {
                warn!("ignoring duplicate fixture {}", fixture.id);
                warnings.push(SeasonWarning::DuplicateFixture(fixture.id.clone()));
            }
        }
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        for fixture in results.keys() {
            if !seen.contains(fixture) {
                warn!("ignoring result for unknown fixture {fixture}");
                warnings.push(SeasonWarning::UnknownFixtureResult(fixture.clone()));
            }
        }

        let mut records = BTreeMap::new();
        let mut matchdays: BTreeMap<Matchday, BTreeMap<TeamId, MatchdayEntry>> = BTreeMap::new();
        let mut matches = Vec::with_capacity(sorted.len());
        let mut pending = vec![];

        for fixture in sorted {
            for side in [Side::Home, Side::Away] {
                let team = fixture.id.team(&side);
                records
                    .entry(team.clone())
                    .or_insert_with(|| TeamSeasonRecord::new(team.clone()));
            }

            let xg = canonical.get(&fixture.id).cloned();
            let result = self.admit_result(fixture, results.get(&fixture.id), &mut warnings);
            if fixture.status == FixtureStatus::Postponed {
                debug!("{} is postponed", fixture.id);
                matches.push(MatchReport {
                    fixture: fixture.clone(),
                    xg,
                    xp: None,
                    result: None,
                });
                continue;
            }

            let xg = match xg {
                Some(xg) => xg,
                None => {
                    debug!("{} is awaiting xG", fixture.id);
                    pending.push(fixture.id.clone());
                    matches.push(MatchReport {
                        fixture: fixture.clone(),
                        xg: None,
                        xp: None,
                        result,
                    });
                    continue;
                }
            };
            let xp = self.calculator.compute(xg.home_xg, xg.away_xg)?;

            for side in [Side::Home, Side::Away] {
                let team = fixture.id.team(&side);
                let record = records
                    .entry(team.clone())
                    .or_insert_with(|| TeamSeasonRecord::new(team.clone()));
                let entry = matchdays
                    .entry(fixture.id.matchday)
                    .or_default()
                    .entry(team.clone())
                    .or_default();
                record.include_xp(xp.xp(&side), xg.xg(&side), xg.xg(&side.flip()));
                entry.xp += xp.xp(&side);
                entry.xg += xg.xg(&side);
                if let Some(score) = &result {
                    record.include_result(score, &side);
                    entry.points += score.points(&side) as u16;
                    entry.played += 1;
                }
            }

            matches.push(MatchReport {
                fixture: fixture.clone(),
                xg: Some(xg),
                xp: Some(xp),
                result,
            });
        }

        let elapsed = start_time.elapsed();
        info!(
            "rebuilt {} teams from {} fixtures ({} pending, {} warnings) in {:.3}s",
            records.len(),
            matches.len(),
            pending.len(),
            warnings.len(),
            elapsed.as_secs_f64()
        );
        Ok(Season {
            generation: 0,
            records,
            matches,
            matchdays,
            pending,
            warnings,
        })
    }

    /// Admits a result only for a completed fixture.
    fn admit_result(
        &self,
        fixture: &MatchFixture,
        result: Option<&Score>,
        warnings: &mut Vec<SeasonWarning>,
    ) -> Option<Score> {
        match (fixture.status, result) {
            (FixtureStatus::Completed, Some(score)) => Some(score.clone()),
            (FixtureStatus::Completed, None) => {
                warn!("{} is completed but has no result", fixture.id);
                warnings.push(SeasonWarning::MissingResult(fixture.id.clone()));
                None
            }
            (status, Some(_)) => {
                warn!("ignoring result for {} which is {status}", fixture.id);
                warnings.push(SeasonWarning::ResultNotCompleted {
                    fixture: fixture.id.clone(),
                    status,
                });
                None
            }
            (_, None) => None,
        }
    }
}

impl Default for SeasonAggregator {
    fn default() -> Self {
        Self::new(XpCalculator::default())
    }
}
