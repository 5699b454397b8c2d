//! Resolution of per-source xG observations into one canonical pair per fixture.
//!
//! Only observations from enabled sources are considered. A single reporting source is taken
//! as is; several are averaged, home and away independently. Where a source reports the same
//! fixture more than once, its last observation stands. A fixture that no enabled source has
//! reported on is pending.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{CanonicalMatchXg, FixtureId, MatchFixture, SourceId, XgObservation};
use crate::probs::SliceExt;

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(CanonicalMatchXg),
    Pending,
}
impl Resolution {
    pub fn resolved(self) -> Option<CanonicalMatchXg> {
        match self {
            Resolution::Resolved(xg) => Some(xg),
            Resolution::Pending => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ReconciliationWarning {
    #[error("observation from {source_id} for {fixture} does not match any known fixture")]
    InconsistentFixtureIdentity {
        source_id: SourceId,
        fixture: FixtureId,
    },
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub resolved: BTreeMap<FixtureId, CanonicalMatchXg>,
    pub pending: Vec<FixtureId>,
    pub warnings: Vec<ReconciliationWarning>,
    /// Observations dropped because their source is not enabled.
    pub disabled: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    enabled: FxHashSet<SourceId>,
}
impl Reconciler {
    pub fn new(enabled: impl IntoIterator<Item = SourceId>) -> Self {
        Self {
            enabled: enabled.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, source: &SourceId) -> bool {
        self.enabled.contains(source)
    }

    /// Resolves a single fixture from `observations`, ignoring those that belong to other
    /// fixtures.
    pub fn reconcile(&self, fixture: &MatchFixture, observations: &[XgObservation]) -> Resolution {
        self.resolve(
            observations
                .iter()
                .filter(|observation| observation.fixture == fixture.id),
        )
    }

    /// Resolves every fixture in a snapshot. Observations that do not identify a known fixture
    /// are reported as warnings and excluded.
    pub fn reconcile_all(
        &self,
        fixtures: &[MatchFixture],
        observations: &[XgObservation],
    ) -> Reconciliation {
        let mut by_fixture: FxHashMap<&FixtureId, Vec<&XgObservation>> = fixtures
            .iter()
            .map(|fixture| (&fixture.id, vec![]))
            .collect();
        let mut reconciliation = Reconciliation::default();

        for observation in observations {
            match by_fixture.get_mut(&observation.fixture) {
                Some(bucket) => bucket.push(observation),
                None => {
                    warn!(
                        "{} reported {} which is not a known fixture",
                        observation.source, observation.fixture
                    );
                    reconciliation
                        .warnings
                        .push(ReconciliationWarning::InconsistentFixtureIdentity {
                            source_id: observation.source.clone(),
                            fixture: observation.fixture.clone(),
                        });
                }
            }
            if !self.is_enabled(&observation.source) {
                reconciliation.disabled += 1;
            }
        }

        for fixture in fixtures {
            let bucket = by_fixture.remove(&fixture.id).unwrap_or_default();
            match self.resolve(bucket.into_iter()) {
                Resolution::Resolved(xg) => {
                    reconciliation.resolved.insert(fixture.id.clone(), xg);
                }
                Resolution::Pending => reconciliation.pending.push(fixture.id.clone()),
            }
        }

        debug!(
            "reconciled {} fixtures: {} resolved, {} pending, {} warnings, {} observations from disabled sources",
            fixtures.len(),
            reconciliation.resolved.len(),
            reconciliation.pending.len(),
            reconciliation.warnings.len(),
            reconciliation.disabled
        );
        reconciliation
    }

    fn resolve<'a>(&self, observations: impl Iterator<Item = &'a XgObservation>) -> Resolution {
        let mut latest: BTreeMap<&SourceId, &XgObservation> = BTreeMap::new();
        for observation in observations {
            if self.is_enabled(&observation.source) {
                latest.insert(&observation.source, observation);
            }
        }
        if latest.is_empty() {
            return Resolution::Pending;
        }

        let home_xgs = latest.values().map(|observation| observation.home_xg).collect::<Vec<_>>();
        let away_xgs = latest.values().map(|observation| observation.away_xg).collect::<Vec<_>>();
        Resolution::Resolved(CanonicalMatchXg {
            home_xg: home_xgs.mean(),
            away_xg: away_xgs.mean(),
            sources: latest.into_keys().cloned().collect(),
        })
    }
}
