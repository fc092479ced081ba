// EV tiers and the heuristic confidence score.
//
// Pure functions over a prop's numeric fields. The thresholds are fixed
// cutoffs; reports and sorts elsewhere depend on them matching exactly.

use std::fmt;

use crate::prop::PropRecord;

// ---------------------------------------------------------------------------
// EV tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EvTier {
    Elite,
    Strong,
    Good,
    Slight,
    Negative,
}

impl EvTier {
    /// All tiers, best first.
    pub const ALL: [EvTier; 5] = [
        EvTier::Elite,
        EvTier::Strong,
        EvTier::Good,
        EvTier::Slight,
        EvTier::Negative,
    ];

    /// Tier for an EV expressed in percent (`12.0` means 12 cents per dollar).
    ///
    /// NaN compares false everywhere and ends up `Negative`.
    pub fn from_ev_pct(ev_pct: f64) -> Self {
        if ev_pct >= 15.0 {
            EvTier::Elite
        } else if ev_pct >= 10.0 {
            EvTier::Strong
        } else if ev_pct >= 5.0 {
            EvTier::Good
        } else if ev_pct > 0.0 {
            EvTier::Slight
        } else {
            EvTier::Negative
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EvTier::Elite => "🔥🔥🔥",
            EvTier::Strong => "🔥🔥",
            EvTier::Good => "🔥",
            EvTier::Slight => "✅",
            EvTier::Negative => "⚠️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EvTier::Elite => "ELITE",
            EvTier::Strong => "STRONG",
            EvTier::Good => "GOOD",
            EvTier::Slight => "SLIGHT",
            EvTier::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for EvTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

pub fn ev_tier(prop: &PropRecord) -> EvTier {
    EvTier::from_ev_pct(prop.ev_pct())
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBucket {
    pub const ALL: [ConfidenceBucket; 4] = [
        ConfidenceBucket::High,
        ConfidenceBucket::Medium,
        ConfidenceBucket::Low,
        ConfidenceBucket::VeryLow,
    ];

    pub fn from_score(score: u32) -> Self {
        if score >= 6 {
            ConfidenceBucket::High
        } else if score >= 4 {
            ConfidenceBucket::Medium
        } else if score >= 2 {
            ConfidenceBucket::Low
        } else {
            ConfidenceBucket::VeryLow
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ConfidenceBucket::High => "🟢",
            ConfidenceBucket::Medium => "🟡",
            ConfidenceBucket::Low => "🟠",
            ConfidenceBucket::VeryLow => "🔴",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBucket::High => "HIGH",
            ConfidenceBucket::Medium => "MEDIUM",
            ConfidenceBucket::Low => "LOW",
            ConfidenceBucket::VeryLow => "VERY LOW",
        }
    }

    /// Higher is more confident.
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceBucket::High => 3,
            ConfidenceBucket::Medium => 2,
            ConfidenceBucket::Low => 1,
            ConfidenceBucket::VeryLow => 0,
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceLevel {
    /// 0..=7
    pub score: u32,
    pub bucket: ConfidenceBucket,
}

/// Sum of three signals: model probability (0-3), projection/line gap (0-2)
/// and sample size (0-2).
pub fn confidence(model_prob: f64, projection: f64, line: f64, n_games: u32) -> ConfidenceLevel {
    let prob_points = if model_prob >= 0.60 {
        3
    } else if model_prob >= 0.55 {
        2
    } else if model_prob >= 0.52 {
        1
    } else {
        0
    };

    let gap_pct = if line == 0.0 {
        0.0
    } else {
        (projection - line).abs() / line
    };
    let gap_points = if gap_pct >= 0.15 {
        2
    } else if gap_pct >= 0.10 {
        1
    } else {
        0
    };

    let sample_points = if n_games >= 30 {
        2
    } else if n_games >= 20 {
        1
    } else {
        0
    };

    let score = prob_points + gap_points + sample_points;
    ConfidenceLevel {
        score,
        bucket: ConfidenceBucket::from_score(score),
    }
}

pub fn prop_confidence(prop: &PropRecord) -> ConfidenceLevel {
    confidence(prop.p_model, prop.projection, prop.line, prop.n_games)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ev_tier_examples() {
        assert_eq!(EvTier::from_ev_pct(12.0), EvTier::Strong);
        assert_eq!(EvTier::from_ev_pct(12.0).emoji(), "🔥🔥");
        assert_eq!(EvTier::from_ev_pct(-3.0), EvTier::Negative);
        assert_eq!(EvTier::from_ev_pct(-3.0).to_string(), "⚠️ NEGATIVE");
        assert_eq!(EvTier::from_ev_pct(25.0).label(), "ELITE");
    }

    #[test]
    fn ev_tier_boundaries() {
        assert_eq!(EvTier::from_ev_pct(15.0), EvTier::Elite);
        assert_eq!(EvTier::from_ev_pct(14.999), EvTier::Strong);
        assert_eq!(EvTier::from_ev_pct(10.0), EvTier::Strong);
        assert_eq!(EvTier::from_ev_pct(5.0), EvTier::Good);
        assert_eq!(EvTier::from_ev_pct(4.99), EvTier::Slight);
        assert_eq!(EvTier::from_ev_pct(0.0001), EvTier::Slight);
        assert_eq!(EvTier::from_ev_pct(0.0), EvTier::Negative);
        assert_eq!(EvTier::from_ev_pct(f64::NAN), EvTier::Negative);
        assert_eq!(EvTier::from_ev_pct(f64::INFINITY), EvTier::Elite);
        assert_eq!(EvTier::from_ev_pct(f64::NEG_INFINITY), EvTier::Negative);
    }

    #[test]
    fn ev_tiers_partition_the_line() {
        // Walking upwards, the tier only ever improves, one step at a time.
        let mut prev = EvTier::from_ev_pct(-100.0);
        let mut seen = vec![prev];
        let mut x = -100.0;
        while x <= 100.0 {
            let tier = EvTier::from_ev_pct(x);
            assert!(tier <= prev, "tier got worse at {x}");
            if tier != prev {
                seen.push(tier);
            }
            prev = tier;
            x += 0.25;
        }
        seen.reverse();
        assert_eq!(seen, EvTier::ALL.to_vec());
    }

    #[test]
    fn high_confidence_example() {
        let level = confidence(0.62, 30.0, 25.0, 35);
        assert_eq!(level.score, 7);
        assert_eq!(level.bucket, ConfidenceBucket::High);
        assert_eq!(level.bucket.to_string(), "🟢 HIGH");
    }

    #[test]
    fn signals_do_not_double_count() {
        assert_eq!(confidence(0.99, 10.0, 10.0, 0).score, 3);
        assert_eq!(confidence(0.55, 10.0, 10.0, 0).score, 2);
        assert_eq!(confidence(0.52, 10.0, 10.0, 0).score, 1);
        assert_eq!(confidence(0.51, 10.0, 10.0, 0).score, 0);
        assert_eq!(confidence(0.0, 11.5, 10.0, 0).score, 2);
        assert_eq!(confidence(0.0, 11.0, 10.0, 0).score, 1);
        assert_eq!(confidence(0.0, 8.5, 10.0, 0).score, 2);
        assert_eq!(confidence(0.0, 10.0, 10.0, 20).score, 1);
        assert_eq!(confidence(0.0, 10.0, 10.0, 30).score, 2);
        // Zero line contributes no gap points.
        assert_eq!(confidence(0.0, 5.0, 0.0, 0).score, 0);
    }

    #[test]
    fn bucket_cutoffs() {
        let labels: Vec<&str> = (0..=7)
            .map(|s| ConfidenceBucket::from_score(s).label())
            .collect();
        assert_eq!(
            labels,
            ["VERY LOW", "VERY LOW", "LOW", "LOW", "MEDIUM", "MEDIUM", "HIGH", "HIGH"]
        );
    }

    #[test]
    fn confidence_is_monotonic_in_each_input() {
        let probs = [0.0, 0.5, 0.52, 0.54, 0.55, 0.58, 0.6, 0.9];
        let projections = [20.0, 21.0, 22.0, 22.5, 23.0, 25.0, 30.0];
        let games = [0, 10, 19, 20, 29, 30, 80];
        let line = 20.0;

        for &g in &games {
            for &proj in &projections {
                let scores: Vec<u32> = probs.iter().map(|&p| confidence(p, proj, line, g).score).collect();
                assert!(scores.windows(2).all(|w| w[0] <= w[1]), "prob: {scores:?}");
            }
            for &p in &probs {
                let scores: Vec<u32> = projections.iter().map(|&proj| confidence(p, proj, line, g).score).collect();
                assert!(scores.windows(2).all(|w| w[0] <= w[1]), "gap: {scores:?}");
            }
        }
        for &p in &probs {
            for &proj in &projections {
                let scores: Vec<u32> = games.iter().map(|&g| confidence(p, proj, line, g).score).collect();
                assert!(scores.windows(2).all(|w| w[0] <= w[1]), "games: {scores:?}");
            }
        }
    }
}
