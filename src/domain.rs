use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

pub mod error;

/// A round of league fixtures (a _Spieltag_).
pub type Matchday = u16;

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);
impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TeamId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a provider of xG figures, e.g. `footystats`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);
impl SourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SourceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}
impl Side {
    pub fn flip(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Unique within a season.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId {
    pub matchday: Matchday,
    pub home: TeamId,
    pub away: TeamId,
}
impl FixtureId {
    pub fn new(matchday: Matchday, home: impl Into<TeamId>, away: impl Into<TeamId>) -> Self {
        Self {
            matchday,
            home: home.into(),
            away: away.into(),
        }
    }

    pub fn team(&self, side: &Side) -> &TeamId {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

impl Display for FixtureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MD{} {} v {}", self.matchday, self.home, self.away)
    }
}

#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, EnumString, StrumDisplay, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FixtureStatus {
    Scheduled,
    Completed,
    Postponed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFixture {
    pub id: FixtureId,
    pub kickoff: Option<NaiveDate>,
    pub status: FixtureStatus,
}
impl MatchFixture {
    pub fn is_completed(&self) -> bool {
        self.status == FixtureStatus::Completed
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn goals(&self, side: &Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// League points (3 for a win, 1 for a draw) earned by the given side.
    pub fn points(&self, side: &Side) -> u8 {
        match self.goals(side).cmp(&self.goals(&side.flip())) {
            Ordering::Greater => 3,
            Ordering::Equal => 1,
            Ordering::Less => 0,
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

/// One source's xG estimate for a fixture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XgObservation {
    pub source: SourceId,
    pub fixture: FixtureId,
    pub home_xg: f64,
    pub away_xg: f64,
}

/// The resolved xG pair for a fixture, along with the sources that contributed to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMatchXg {
    pub home_xg: f64,
    pub away_xg: f64,
    pub sources: Vec<SourceId>,
}
impl CanonicalMatchXg {
    pub fn xg(&self, side: &Side) -> f64 {
        match side {
            Side::Home => self.home_xg,
            Side::Away => self.away_xg,
        }
    }
}
