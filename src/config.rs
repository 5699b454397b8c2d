//! Runtime configuration: which xG sources are consulted, the grid bound and the team alias
//! table.
//!
//! Settings are layered. Defaults are overridden by an optional JSON file, which is in turn
//! overridden by the `ENABLED_SOURCES` and `MAX_GOALS` environment variables.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::path::Path;

use anyhow::{anyhow, Context};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::error::InvalidInput;
use crate::domain::{SourceId, TeamId};
use crate::file::read_json;
use crate::reconcile::Reconciler;
use crate::scoregrid::DEFAULT_MAX_GOALS;
use crate::season::SeasonAggregator;
use crate::xp::XpCalculator;

pub const ENABLED_SOURCES_VAR: &str = "ENABLED_SOURCES";
pub const MAX_GOALS_VAR: &str = "MAX_GOALS";
pub const DEFAULT_SOURCES: [&str; 2] = ["footystats", "soccerway"];

/// Upper bound on the grid; the tail beyond it is negligible for any realistic xG.
pub const MAX_GOALS_LIMIT: u8 = 30;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(#[from] pub Box<dyn Error + Send + Sync>);

impl From<anyhow::Error> for ValidationError {
    fn from(value: anyhow::Error) -> Self {
        ValidationError(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enabled_sources: Vec<SourceId>,
    pub max_goals: u8,
    /// Canonical team name mapped to the spellings used by the various sources.
    pub aliases: BTreeMap<TeamId, Vec<String>>,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled_sources.is_empty() {
            return Err(anyhow!("at least one xG source must be enabled").into());
        }
        if let Some(source) = self.enabled_sources.iter().find(|source| source.as_str().is_empty()) {
            return Err(anyhow!("source identifier cannot be blank ({source:?})").into());
        }

        const MAX_GOALS_RANGE: std::ops::RangeInclusive<u8> = 1..=MAX_GOALS_LIMIT;
        if !MAX_GOALS_RANGE.contains(&self.max_goals) {
            return Err(anyhow!(
                "max goals ({}) outside of allowable range ({MAX_GOALS_RANGE:?})",
                self.max_goals
            )
            .into());
        }

        let mut claimed: FxHashMap<&str, &TeamId> = FxHashMap::default();
        for (team, aliases) in &self.aliases {
            for alias in aliases {
                if let Some(existing) = claimed.insert(alias.as_str(), team) {
                    if existing != team {
                        return Err(anyhow!(
                            "alias '{alias}' is claimed by both {existing} and {team}"
                        )
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Loads the configuration from an optional JSON file, applies environment overrides
    /// and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ValidationError> {
        let mut config = match path {
            None => Config::default(),
            Some(path) => read_json(path)
                .with_context(|| format!("reading config from {}", path.display()))?,
        };
        config.apply_overrides(|var| env::var(var).ok())?;
        config.validate()?;
        debug!("config: {config:?}");
        Ok(config)
    }

    /// Applies overrides sourced from `lookup`, which resolves a variable name to its value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ValidationError> {
        if let Some(sources) = lookup(ENABLED_SOURCES_VAR) {
            self.enabled_sources = parse_sources(&sources);
        }
        if let Some(max_goals) = lookup(MAX_GOALS_VAR) {
            self.max_goals = max_goals
                .trim()
                .parse()
                .with_context(|| format!("invalid {MAX_GOALS_VAR} '{max_goals}'"))?;
        }
        Ok(())
    }

    pub fn team_aliases(&self) -> TeamAliases {
        let mut lookup = FxHashMap::default();
        for (team, aliases) in &self.aliases {
            lookup.insert(team.as_str().to_string(), team.clone());
            for alias in aliases {
                lookup.insert(alias.clone(), team.clone());
            }
        }
        TeamAliases { lookup }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.enabled_sources.iter().cloned())
    }

    pub fn calculator(&self) -> Result<XpCalculator, InvalidInput> {
        XpCalculator::new(self.max_goals)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled_sources: DEFAULT_SOURCES.into_iter().map(SourceId::from).collect(),
            max_goals: DEFAULT_MAX_GOALS,
            aliases: BTreeMap::default(),
        }
    }
}

impl TryFrom<&Config> for SeasonAggregator {
    type Error = ValidationError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let calculator = config.calculator().map_err(|err| ValidationError(Box::new(err)))?;
        Ok(SeasonAggregator::new(calculator))
    }
}

/// Parses a comma-separated list of source identifiers, ignoring blanks.
pub fn parse_sources(sources: &str) -> Vec<SourceId> {
    sources
        .split(',')
        .map(|source| source.trim().to_lowercase())
        .filter(|source| !source.is_empty())
        .map(SourceId::from)
        .collect()
}

/// Resolves source-specific spellings of team names to their canonical form.
#[derive(Debug, Clone, Default)]
pub struct TeamAliases {
    lookup: FxHashMap<String, TeamId>,
}
impl TeamAliases {
    /// Names without a mapping pass through unchanged, less surrounding whitespace.
    pub fn resolve(&self, name: &str) -> TeamId {
        let name = name.trim();
        match self.lookup.get(name) {
            Some(team) => team.clone(),
            None => TeamId::from(name),
        }
    }
}
