//! Expected points (xP) from expected goals (xG) for a football league, aggregated into a
//! season table that can be set against the actual standings.
//!
//! Each match's xG pair drives an independent Poisson scoreline model; the outcome
//! probabilities of the (renormalised) grid give each side's xP. Figures from several xG
//! providers are reconciled per fixture before the season is rebuilt and ranked.

pub mod config;
pub mod csv;
pub mod data;
pub mod domain;
pub mod file;
pub mod linear;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod reconcile;
pub mod scoregrid;
pub mod season;
pub mod table;
pub mod xp;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
