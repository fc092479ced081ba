// Sort keys, composable filters and pagination over scored props.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::scoring::{prop_confidence, ConfidenceBucket};
use crate::config::ConfidenceSort;
use crate::prop::PropRecord;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Ev,
    ModelProb,
    Projection,
    /// `|p_model - p_book|`
    Edge,
    Odds,
    Confidence,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Ev,
        SortKey::ModelProb,
        SortKey::Projection,
        SortKey::Edge,
        SortKey::Odds,
        SortKey::Confidence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortKey::Ev => "ev",
            SortKey::ModelProb => "prob",
            SortKey::Projection => "projection",
            SortKey::Edge => "edge",
            SortKey::Odds => "odds",
            SortKey::Confidence => "confidence",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if matches!(wanted.as_str(), "p_model" | "model_prob") {
            return Ok(SortKey::ModelProb);
        }
        SortKey::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = SortKey::ALL.iter().map(SortKey::name).collect();
                format!("unknown sort key `{s}` (expected one of: {})", names.join(", "))
            })
    }
}

/// Stable, descending sort. Ties keep their current relative order.
pub fn sort_props(props: &mut [PropRecord], key: SortKey, confidence_sort: ConfidenceSort) {
    let desc = |a: f64, b: f64| b.total_cmp(&a);
    match key {
        SortKey::Ev => props.sort_by(|a, b| desc(a.ev, b.ev)),
        SortKey::ModelProb => props.sort_by(|a, b| desc(a.p_model, b.p_model)),
        SortKey::Projection => props.sort_by(|a, b| desc(a.projection, b.projection)),
        SortKey::Edge => props.sort_by(|a, b| {
            desc((a.p_model - a.p_book).abs(), (b.p_model - b.p_book).abs())
        }),
        SortKey::Odds => props.sort_by(|a, b| b.odds.cmp(&a.odds)),
        SortKey::Confidence => props.sort_by(|a, b| compare_confidence(a, b, confidence_sort)),
    }
}

fn compare_confidence(a: &PropRecord, b: &PropRecord, mode: ConfidenceSort) -> Ordering {
    let (ca, cb) = (prop_confidence(a), prop_confidence(b));
    match mode {
        // Plain string order of the labels, descending.
        ConfidenceSort::Label => cb.bucket.label().cmp(ca.bucket.label()),
        ConfidenceSort::Score => cb.score.cmp(&ca.score),
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Active predicates are ANDed; an empty criteria set keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_ev_pct: Option<f64>,
    pub min_prob_pct: Option<f64>,
    pub max_prob_pct: Option<f64>,
    /// Uppercase stat names; empty means any.
    pub stats: Vec<String>,
    pub min_games: Option<u32>,
    /// Uppercase positions; empty means any.
    pub positions: Vec<String>,
    /// Case-insensitive substring of the player name.
    pub player: Option<String>,
    pub min_confidence: Option<ConfidenceBucket>,
}

/// Split a comma list, trim and uppercase each entry, drop blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl FilterCriteria {
    /// EV strictly above zero (at least 0.01%).
    pub fn positive_ev_only() -> Self {
        Self {
            min_ev_pct: Some(0.01),
            ..Default::default()
        }
    }

    pub fn high_confidence_only() -> Self {
        Self {
            min_confidence: Some(ConfidenceBucket::High),
            ..Default::default()
        }
    }

    pub fn with_stats(mut self, list: &str) -> Self {
        self.stats = parse_list(list);
        self
    }

    pub fn with_positions(mut self, list: &str) -> Self {
        self.positions = parse_list(list);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, prop: &PropRecord) -> bool {
        if let Some(min) = self.min_ev_pct {
            if !(prop.ev_pct() >= min) {
                return false;
            }
        }
        if let Some(min) = self.min_prob_pct {
            if !(prop.model_prob_pct() >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_prob_pct {
            if !(prop.model_prob_pct() <= max) {
                return false;
            }
        }
        if !self.stats.is_empty() {
            let stat = prop.stat.trim().to_uppercase();
            if !self.stats.contains(&stat) {
                return false;
            }
        }
        if let Some(min) = self.min_games {
            if prop.n_games < min {
                return false;
            }
        }
        if !self.positions.is_empty() {
            let position = prop
                .position
                .as_deref()
                .map(|p| p.trim().to_uppercase())
                .unwrap_or_default();
            if !self.positions.contains(&position) {
                return false;
            }
        }
        if let Some(needle) = self.player.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if !prop.player.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_confidence {
            if prop_confidence(prop).bucket.rank() < min.rank() {
                return false;
            }
        }
        true
    }

    /// Matching props, in their current order.
    pub fn apply(&self, props: &[PropRecord]) -> Vec<PropRecord> {
        props.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    /// 1-based.
    pub number: usize,
    pub total_pages: usize,
    /// Offset of `items[0]` in the full list.
    pub start_index: usize,
    pub items: &'a [T],
}

/// `ceil(len / page_size)`; a page size of 0 is treated as 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<Page<'_, T>> {
    let size = page_size.max(1);
    let total = total_pages(items.len(), size);
    items
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            total_pages: total,
            start_index: i * size,
            items: chunk,
        })
        .collect()
}

/// A single 1-based page, or `None` when out of range.
pub fn page<T>(items: &[T], page_size: usize, number: usize) -> Option<Page<'_, T>> {
    number
        .checked_sub(1)
        .and_then(|idx| paginate(items, page_size).into_iter().nth(idx))
}
