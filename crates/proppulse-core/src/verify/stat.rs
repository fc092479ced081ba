// Box score → actual stat value → HIT/MISS.

use crate::api::BoxScoreRow;
use crate::prop::{BaseStat, HitMiss, StatKind};

/// Result of checking one prop against one box score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatOutcome {
    /// Unset when the stat could not be read from the box score.
    pub actual_value: Option<f64>,
    pub hit_miss: HitMiss,
}

impl StatOutcome {
    pub fn result_symbol(&self) -> &'static str {
        self.hit_miss.symbol()
    }
}

fn base_value(row: &BoxScoreRow, stat: BaseStat) -> Option<f64> {
    match stat {
        BaseStat::Points => row.pts,
        BaseStat::Rebounds => row.reb,
        BaseStat::Assists => row.ast,
        BaseStat::ThreesMade => row.fg3m,
    }
}

/// Sum of the stat's base fields, or `None` if any of them is missing.
pub fn extract_stat(row: &BoxScoreRow, stat: &StatKind) -> Option<f64> {
    stat.parts()
        .iter()
        .map(|part| base_value(row, *part))
        .sum::<Option<f64>>()
}

/// Classify a prop against a matched box score.
///
/// Unknown stat names and missing upstream fields give `ERROR` with no value.
pub fn verify_stat(row: &BoxScoreRow, stat_name: &str, line: f64) -> StatOutcome {
    let actual = StatKind::parse(stat_name).and_then(|kind| extract_stat(row, &kind));
    match actual {
        Some(value) => StatOutcome {
            actual_value: Some(value),
            hit_miss: HitMiss::classify(value, line),
        },
        None => StatOutcome {
            actual_value: None,
            hit_miss: HitMiss::Error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GameRef, TeamInfo};

    fn row(pts: Option<f64>, reb: Option<f64>, ast: Option<f64>, fg3m: Option<f64>) -> BoxScoreRow {
        BoxScoreRow {
            game: GameRef {
                id: 1,
                date: "2025-11-10".into(),
            },
            team: TeamInfo::default(),
            player: None,
            pts,
            reb,
            ast,
            fg3m,
        }
    }

    #[test]
    fn lebron_points_over_line_is_a_hit() {
        let box_score = row(Some(30.0), Some(8.0), Some(9.0), Some(2.0));
        let outcome = verify_stat(&box_score, "PTS", 25.5);
        assert_eq!(outcome.actual_value, Some(30.0));
        assert_eq!(outcome.hit_miss, HitMiss::Hit);
        assert_eq!(outcome.result_symbol(), "✓");
    }

    #[test]
    fn landing_on_the_line_is_a_miss() {
        let box_score = row(Some(25.0), None, None, None);
        let outcome = verify_stat(&box_score, "pts", 25.0);
        assert_eq!(outcome.hit_miss, HitMiss::Miss);
        assert_eq!(outcome.result_symbol(), "✗");
    }

    #[test]
    fn composite_stats_are_summed() {
        let box_score = row(Some(20.0), Some(7.0), Some(5.0), Some(3.0));
        let kind = StatKind::parse("REB+AST").unwrap();
        assert_eq!(extract_stat(&box_score, &kind), Some(12.0));

        let outcome = verify_stat(&box_score, "PRA", 31.5);
        assert_eq!(outcome.actual_value, Some(32.0));
        assert_eq!(outcome.hit_miss, HitMiss::Hit);

        let outcome = verify_stat(&box_score, "3PM", 3.5);
        assert_eq!(outcome.actual_value, Some(3.0));
        assert_eq!(outcome.hit_miss, HitMiss::Miss);
    }

    #[test]
    fn unknown_stat_is_an_error() {
        let box_score = row(Some(20.0), Some(7.0), Some(5.0), Some(3.0));
        let outcome = verify_stat(&box_score, "STL", 1.5);
        assert_eq!(outcome.hit_miss, HitMiss::Error);
        assert_eq!(outcome.actual_value, None);
    }

    #[test]
    fn missing_field_is_an_error() {
        let box_score = row(Some(20.0), None, Some(5.0), None);
        assert_eq!(verify_stat(&box_score, "REB", 4.5).hit_miss, HitMiss::Error);
        assert_eq!(verify_stat(&box_score, "REB+AST", 4.5).hit_miss, HitMiss::Error);
        assert_eq!(verify_stat(&box_score, "AST", 4.5).hit_miss, HitMiss::Hit);
    }
}
