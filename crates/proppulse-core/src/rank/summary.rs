// Aggregate view over a prop population.

use std::collections::HashMap;
use std::fmt;

use super::scoring::{ev_tier, prop_confidence, ConfidenceBucket, EvTier};
use crate::prop::PropRecord;
use crate::verify::RunSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct StatBreakdown {
    pub stat: String,
    pub count: usize,
    pub mean_ev_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSummary {
    pub total: usize,
    pub positive_ev: usize,
    /// `None` for an empty population.
    pub mean_ev_pct: Option<f64>,
    pub mean_model_prob_pct: Option<f64>,
    /// Every tier, best first, including empty ones.
    pub tiers: Vec<(EvTier, usize)>,
    /// Most common stat first; ties by name.
    pub by_stat: Vec<StatBreakdown>,
    /// Up to five players with the most props.
    pub top_players: Vec<(String, usize)>,
    pub confidence: Vec<(ConfidenceBucket, usize)>,
    /// Verification outcomes; unverified props count as skipped.
    pub outcomes: RunSummary,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Count keys, ordered by count descending then first appearance.
fn ranked_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for key in keys {
        let entry = counts.entry(key.to_string()).or_insert(0);
        if *entry == 0 {
            order.push(key.to_string());
        }
        *entry += 1;
    }
    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let n = counts.get(&k).copied().unwrap_or(0);
            (k, n)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

impl PopulationSummary {
    pub fn from_props(props: &[PropRecord]) -> Self {
        let tiers = EvTier::ALL
            .iter()
            .map(|tier| (*tier, props.iter().filter(|p| ev_tier(p) == *tier).count()))
            .collect();

        let confidence = ConfidenceBucket::ALL
            .iter()
            .map(|bucket| {
                let n = props
                    .iter()
                    .filter(|p| prop_confidence(p).bucket == *bucket)
                    .count();
                (*bucket, n)
            })
            .collect();

        let mut by_stat: Vec<StatBreakdown> = ranked_counts(props.iter().map(|p| p.stat.as_str()))
            .into_iter()
            .map(|(stat, count)| StatBreakdown {
                mean_ev_pct: mean(props.iter().filter(|p| p.stat == stat).map(|p| p.ev_pct()))
                    .unwrap_or(0.0),
                stat,
                count,
            })
            .collect();
        by_stat.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.stat.cmp(&b.stat)));

        let mut top_players = ranked_counts(props.iter().map(|p| p.player.as_str()));
        top_players.truncate(5);

        let verifications: Vec<_> = props.iter().map(|p| p.verification.clone()).collect();

        Self {
            total: props.len(),
            positive_ev: props.iter().filter(|p| p.ev > 0.0).count(),
            mean_ev_pct: mean(props.iter().map(|p| p.ev_pct())),
            mean_model_prob_pct: mean(props.iter().map(|p| p.model_prob_pct())),
            tiers,
            by_stat,
            top_players,
            confidence,
            outcomes: RunSummary::from_results(&verifications),
        }
    }

    pub fn tier_count(&self, tier: EvTier) -> usize {
        self.tiers
            .iter()
            .find(|(t, _)| *t == tier)
            .map_or(0, |(_, n)| *n)
    }

    pub fn confidence_count(&self, bucket: ConfidenceBucket) -> usize {
        self.confidence
            .iter()
            .find(|(b, _)| *b == bucket)
            .map_or(0, |(_, n)| *n)
    }
}

impl fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return writeln!(f, "No props to summarize.");
        }

        writeln!(f, "Overall")?;
        writeln!(f, "  Total props:        {}", self.total)?;
        writeln!(
            f,
            "  Positive EV:        {} ({:.1}%)",
            self.positive_ev,
            self.positive_ev as f64 / self.total as f64 * 100.0
        )?;
        if let Some(ev) = self.mean_ev_pct {
            writeln!(f, "  Average EV:         {ev:.2}¢")?;
        }
        if let Some(prob) = self.mean_model_prob_pct {
            writeln!(f, "  Average model prob: {prob:.1}%")?;
        }

        writeln!(f, "\nEV tiers")?;
        for (tier, n) in &self.tiers {
            writeln!(f, "  {tier}: {n}")?;
        }

        writeln!(f, "\nBy stat")?;
        for s in &self.by_stat {
            writeln!(f, "  {}: {} props (avg EV {:+.1}¢)", s.stat, s.count, s.mean_ev_pct)?;
        }

        writeln!(f, "\nMost analyzed players")?;
        for (player, n) in &self.top_players {
            writeln!(f, "  {player}: {n} props")?;
        }

        writeln!(f, "\nConfidence")?;
        for (bucket, n) in &self.confidence {
            writeln!(f, "  {bucket}: {n}")?;
        }

        let verified = self.outcomes.total - self.outcomes.skipped;
        if verified > 0 {
            writeln!(f, "\nVerified: {}", self.outcomes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::{HitMiss, Verification};

    fn prop(player: &str, stat: &str, ev: f64, p_model: f64) -> PropRecord {
        let mut p = PropRecord::new(player, stat, 20.0);
        p.ev = ev;
        p.p_model = p_model;
        p.projection = 20.0;
        p
    }

    #[test]
    fn summarizes_population() {
        let mut props = vec![
            prop("LeBron James", "PTS", 0.16, 0.60),
            prop("LeBron James", "AST", 0.02, 0.50),
            prop("Anthony Davis", "PTS", -0.04, 0.40),
            prop("Austin Reaves", "REB", 0.06, 0.50),
        ];
        props[0].verification = Some(Verification {
            actual_stat: Some(30.0),
            hit_miss: HitMiss::Hit,
            ..Verification::pending()
        });

        let s = PopulationSummary::from_props(&props);
        assert_eq!(s.total, 4);
        assert_eq!(s.positive_ev, 3);
        assert!((s.mean_ev_pct.unwrap() - 5.0).abs() < 1e-9);
        assert!((s.mean_model_prob_pct.unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(s.tier_count(EvTier::Elite), 1);
        assert_eq!(s.tier_count(EvTier::Good), 1);
        assert_eq!(s.tier_count(EvTier::Slight), 1);
        assert_eq!(s.tier_count(EvTier::Negative), 1);
        assert_eq!(s.tiers.iter().map(|(_, n)| n).sum::<usize>(), 4);

        assert_eq!(s.by_stat[0].stat, "PTS");
        assert_eq!(s.by_stat[0].count, 2);
        assert!((s.by_stat[0].mean_ev_pct - 6.0).abs() < 1e-9);
        assert_eq!(s.top_players[0], ("LeBron James".to_string(), 2));

        assert_eq!(s.outcomes.hits, 1);
        assert_eq!(s.outcomes.skipped, 3);

        let text = s.to_string();
        assert!(text.contains("Total props:        4"));
        assert!(text.contains("🔥🔥🔥 ELITE: 1"));
        assert!(text.contains("Verified: 4 props: 1 HIT"));
    }

    #[test]
    fn empty_population() {
        let s = PopulationSummary::from_props(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.mean_ev_pct, None);
        assert!(s.by_stat.is_empty());
        assert_eq!(s.to_string(), "No props to summarize.\n");
    }

    #[test]
    fn top_players_capped_at_five() {
        let props: Vec<PropRecord> = (0..8)
            .map(|i| prop(&format!("Player {i}"), "PTS", 0.0, 0.5))
            .collect();
        let s = PopulationSummary::from_props(&props);
        assert_eq!(s.top_players.len(), 5);
        assert_eq!(s.top_players[0].0, "Player 0");
        assert_eq!(s.confidence_count(ConfidenceBucket::VeryLow), 8);
    }
}
