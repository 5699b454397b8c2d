//! Ranked standings.
//!
//! Teams are ordered by cumulative xP, then xG difference, then actual points, then team
//! identifier. Each key is consulted only when all prior keys are exactly equal, so ranks are
//! never shared. Alongside, each team's rank by actual results is computed (points, goal
//! difference, goals scored, team identifier), and the position delta is the xP rank minus
//! the actual rank.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::TeamId;
use crate::season::TeamSeasonRecord;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 1-based rank by xP.
    pub rank: usize,
    /// 1-based rank by actual points.
    pub actual_rank: usize,
    /// Positive when the team sits lower on xP than in the actual table.
    pub position_delta: i64,
    pub record: TeamSeasonRecord,
}
impl RankedRow {
    /// xP minus actual points.
    pub fn point_difference(&self) -> f64 {
        self.record.xp - self.record.points as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    pub rows: Vec<RankedRow>,
}
impl RankedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position_of(&self, team: &str) -> Option<&RankedRow> {
        self.rows.iter().find(|row| row.record.team.as_str() == team)
    }
}

pub fn by_expected(a: &TeamSeasonRecord, b: &TeamSeasonRecord) -> Ordering {
    b.xp.total_cmp(&a.xp)
        .then_with(|| b.xg_difference().total_cmp(&a.xg_difference()))
        .then_with(|| b.points.cmp(&a.points))
        .then_with(|| a.team.cmp(&b.team))
}

pub fn by_actual(a: &TeamSeasonRecord, b: &TeamSeasonRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team.cmp(&b.team))
}

pub fn rank<'a>(records: impl IntoIterator<Item = &'a TeamSeasonRecord>) -> RankedTable {
    let mut expected = records.into_iter().collect::<Vec<_>>();
    expected.sort_by(|a, b| by_expected(a, b));

    let mut actual = expected.clone();
    actual.sort_by(|a, b| by_actual(a, b));
    let actual_rank = |team: &TeamId| {
        actual
            .iter()
            .position(|record| record.team == *team)
            .map(|index| index + 1)
            .unwrap_or_default()
    };

    let rows = expected
        .iter()
        .enumerate()
        .map(|(index, &record)| {
            let rank = index + 1;
            let actual_rank = actual_rank(&record.team);
            RankedRow {
                rank,
                actual_rank,
                position_delta: rank as i64 - actual_rank as i64,
                record: record.clone(),
            }
        })
        .collect();
    RankedTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(team: &str, xp: f64, xg_for: f64, xg_against: f64, points: u16) -> TeamSeasonRecord {
        TeamSeasonRecord {
            xp,
            xg_for,
            xg_against,
            points,
            ..TeamSeasonRecord::new(TeamId::from(team))
        }
    }

    fn teams(table: &RankedTable) -> Vec<&str> {
        table.rows.iter().map(|row| row.record.team.as_str()).collect()
    }

    #[test]
    fn sorted_by_xp() {
        let records = [
            record("Aue", 10.5, 12.0, 10.0, 14),
            record("Ulm", 14.2, 15.0, 9.0, 11),
            record("Essen", 8.1, 9.0, 13.0, 8),
        ];
        let table = rank(&records);
        assert_eq!(vec!["Ulm", "Aue", "Essen"], teams(&table));
        assert_eq!(vec![1, 2, 3], table.rows.iter().map(|row| row.rank).collect::<Vec<_>>());
    }

    #[test]
    fn xg_difference_breaks_xp_tie() {
        let records = [record("Aue", 10.0, 12.0, 11.0, 20), record("Ulm", 10.0, 14.0, 11.0, 5)];
        assert_eq!(vec!["Ulm", "Aue"], teams(&rank(&records)));
    }

    #[test]
    fn points_break_xg_difference_tie() {
        let records = [record("Aue", 10.0, 12.0, 11.0, 5), record("Ulm", 10.0, 13.0, 12.0, 9)];
        assert_eq!(vec!["Ulm", "Aue"], teams(&rank(&records)));
    }

    #[test]
    fn team_id_breaks_full_tie() {
        let records = [
            record("Verl", 10.0, 12.0, 11.0, 9),
            record("Aue", 10.0, 12.0, 11.0, 9),
            record("Mannheim", 10.0, 12.0, 11.0, 9),
        ];
        let table = rank(&records);
        assert_eq!(vec!["Aue", "Mannheim", "Verl"], teams(&table));
        assert_eq!(vec![1, 2, 3], table.rows.iter().map(|row| row.rank).collect::<Vec<_>>());
    }

    #[test]
    fn position_delta_against_actual_rank() {
        let records = [
            record("Aue", 12.0, 12.0, 10.0, 6),
            record("Ulm", 9.0, 10.0, 10.0, 15),
            record("Essen", 7.0, 8.0, 12.0, 10),
        ];
        let table = rank(&records);
        let aue = table.position_of("Aue").unwrap();
        assert_eq!((1, 3, -2), (aue.rank, aue.actual_rank, aue.position_delta));
        let ulm = table.position_of("Ulm").unwrap();
        assert_eq!((2, 1, 1), (ulm.rank, ulm.actual_rank, ulm.position_delta));
        let essen = table.position_of("Essen").unwrap();
        assert_eq!((3, 2, 1), (essen.rank, essen.actual_rank, essen.position_delta));
        assert_eq!(6.0, aue.point_difference());
        assert!(table.position_of("Halle").is_none());
    }

    #[test]
    fn actual_rank_tie_breaks() {
        let mut aue = record("Aue", 1.0, 0.0, 0.0, 10);
        aue.goals_for = 10;
        aue.goals_against = 8;
        let mut ulm = record("Ulm", 2.0, 0.0, 0.0, 10);
        ulm.goals_for = 12;
        ulm.goals_against = 10;
        let mut essen = record("Essen", 3.0, 0.0, 0.0, 10);
        essen.goals_for = 9;
        essen.goals_against = 6;
        let table = rank(&[aue, ulm, essen]);
        assert_eq!(1, table.position_of("Essen").unwrap().actual_rank);
        assert_eq!(2, table.position_of("Ulm").unwrap().actual_rank);
        assert_eq!(3, table.position_of("Aue").unwrap().actual_rank);
    }

    #[test]
    fn empty() {
        let table = rank(&Vec::<TeamSeasonRecord>::new());
        assert!(table.is_empty());
        assert_eq!(0, table.len());
    }
}
