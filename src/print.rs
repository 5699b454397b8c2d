//! Console rendering of tables, matchday series and scoreline grids.

use stanza::style::HAlign::{Left, Right};
use stanza::style::{Header, MinWidth, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum_macros::{Display, EnumIter, EnumString};

use crate::domain::TeamId;
use crate::probs::SliceExt;
use crate::scoregrid::ScorelineDistribution;
use crate::season::{MatchReport, MatchdayEntry, Season};
use crate::table::RankedTable;

/// A per-matchday quantity that can be charted over a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Metric {
    Xp,
    Xg,
    Points,
}
impl Metric {
    pub fn value(&self, entry: &MatchdayEntry) -> f64 {
        match self {
            Metric::Xp => entry.xp,
            Metric::Xg => entry.xg,
            Metric::Points => entry.points as f64,
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            Metric::Points => format!("{value:.0}"),
            _ => format!("{value:.2}"),
        }
    }
}

fn left(width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(width)).with(Left))
}

fn right(width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(width)).with(Right))
}

pub fn tabulate_table(table: &RankedTable) -> Table {
    let mut cols = vec![right(3), left(20)];
    cols.extend((0..11).map(|_| right(5)));
    let mut out = Table::default().with_cols(cols).with_row(Row::new(
        Styles::default().with(Header(true)),
        vec![
            "#".into(),
            "Team".into(),
            "xP".into(),
            "Pts".into(),
            "xP−Pts".into(),
            "Act#".into(),
            "Δ".into(),
            "P".into(),
            "W-D-L".into(),
            "Goals".into(),
            "xG".into(),
            "xGA".into(),
            "xGD".into(),
        ],
    ));
    for row in &table.rows {
        let record = &row.record;
        out.push_row(Row::new(
            Styles::default(),
            vec![
                row.rank.to_string().into(),
                record.team.to_string().into(),
                format!("{:.2}", record.xp).into(),
                record.points.to_string().into(),
                format!("{:+.2}", row.point_difference()).into(),
                row.actual_rank.to_string().into(),
                format!("{:+}", row.position_delta).into(),
                record.played.to_string().into(),
                format!("{}-{}-{}", record.won, record.drawn, record.lost).into(),
                format!("{}:{}", record.goals_for, record.goals_against).into(),
                format!("{:.2}", record.xg_for).into(),
                format!("{:.2}", record.xg_against).into(),
                format!("{:+.2}", record.xg_difference()).into(),
            ],
        ));
    }
    out
}

/// One team's `metric` across the matchdays of a season.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSeries<'a> {
    pub team: &'a TeamId,
    /// One value per matchday; `None` where the team has no entry on that matchday.
    pub values: Vec<Option<f64>>,
    pub total: f64,
}

/// Per-team `metric` for every matchday in `season.matchdays`, listed by descending total and
/// then by name.
pub fn matchday_series(season: &Season, metric: Metric) -> Vec<TeamSeries> {
    let mut series = season
        .records
        .keys()
        .map(|team| {
            let values = season
                .matchdays
                .values()
                .map(|entries| entries.get(team).map(|entry| metric.value(entry)))
                .collect::<Vec<_>>();
            let total = values.iter().flatten().sum::<f64>();
            TeamSeries { team, values, total }
        })
        .collect::<Vec<_>>();
    series.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.team.cmp(b.team)));
    series
}

/// Per-team `metric` by matchday, with a running total. Teams are listed by descending total.
pub fn tabulate_matchdays(season: &Season, metric: Metric) -> Table {
    let matchdays = season.matchdays.keys().copied().collect::<Vec<_>>();
    let series = matchday_series(season, metric);

    let mut cols = vec![left(20)];
    cols.extend(matchdays.iter().map(|_| right(5)));
    cols.push(right(7));
    let mut header: Vec<Cell> = vec!["Team".into()];
    header.extend(matchdays.iter().map(|matchday| format!("MD{matchday}").into()));
    header.push("Total".into());
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header));

    for TeamSeries { team, values, total } in series {
        let mut cells: Vec<Cell> = vec![team.to_string().into()];
        cells.extend(values.into_iter().map(|value| match value {
            Some(value) => metric.format(value).into(),
            None => "-".into(),
        }));
        cells.push(metric.format(total).into());
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

pub fn tabulate_matches<'a>(reports: impl IntoIterator<Item = &'a MatchReport>) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            right(3),
            left(36),
            right(11),
            right(6),
            right(6),
            right(6),
            right(11),
            right(6),
            left(10),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "MD".into(),
                "Fixture".into(),
                "xG".into(),
                "P(H)".into(),
                "P(D)".into(),
                "P(A)".into(),
                "xP".into(),
                "Score".into(),
                "State".into(),
            ],
        ));
    for report in reports {
        let id = &report.fixture.id;
        let blank = || "-".to_string();
        let xg = report
            .xg
            .as_ref()
            .map(|xg| format!("{:.2}:{:.2}", xg.home_xg, xg.away_xg))
            .unwrap_or_else(blank);
        let (home_win, draw, away_win, xp) = match &report.xp {
            Some(xp) => (
                format!("{:.3}", xp.probs.home_win),
                format!("{:.3}", xp.probs.draw),
                format!("{:.3}", xp.probs.away_win),
                format!("{:.2}:{:.2}", xp.home_xp, xp.away_xp),
            ),
            None => (blank(), blank(), blank(), blank()),
        };
        let score = report
            .result
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(blank);
        table.push_row(Row::new(
            Styles::default(),
            vec![
                id.matchday.to_string().into(),
                format!("{} v {}", id.home, id.away).into(),
                xg.into(),
                home_win.into(),
                draw.into(),
                away_win.into(),
                xp.into(),
                score.into(),
                format!("{:?} ({})", report.state(), report.fixture.status).into(),
            ],
        ));
    }
    table
}

/// The scoreline grid in percent, home goals down and away goals across, showing at most
/// `max_goals` goals per side.
pub fn tabulate_scoregrid(distribution: &ScorelineDistribution, max_goals: usize) -> Table {
    let grid = distribution.grid();
    let rows = grid.rows().min(max_goals + 1);
    let cols = grid.cols().min(max_goals + 1);

    let mut header: Vec<Cell> = vec!["H\\A".into()];
    header.extend((0..cols).map(|away| away.to_string().into()));
    let mut table = Table::default()
        .with_cols((0..=cols).map(|_| right(6)).collect())
        .with_row(Row::new(Styles::default().with(Header(true)), header));

    let weight = grid.flatten().sum();
    for home in 0..rows {
        let mut cells: Vec<Cell> = vec![home.to_string().into()];
        cells.extend(
            grid.row_slice(home)[..cols]
                .iter()
                .map(|&cell| format!("{:.2}", cell / weight * 100.0).into()),
        );
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}
