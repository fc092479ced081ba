// Ranking, filtering and export of scored props.

pub mod export;
pub mod filter;
pub mod loader;
pub mod scoring;
pub mod summary;

pub use export::{export_csv, export_markdown, render_markdown, ExportError, EXPORT_COLUMNS};
pub use filter::{page, paginate, sort_props, total_pages, FilterCriteria, Page, SortKey};
pub use loader::{load_scored_props, LoadError};
pub use scoring::{confidence, ev_tier, prop_confidence, ConfidenceBucket, ConfidenceLevel, EvTier};
pub use summary::PopulationSummary;

use crate::config::ConfidenceSort;
use crate::prop::PropRecord;

/// The full population plus the currently sorted and filtered view of it.
///
/// Filters always start from the full population, so applying a new
/// criteria set replaces the previous one rather than narrowing it.
#[derive(Debug, Clone)]
pub struct RankedView {
    all: Vec<PropRecord>,
    current: Vec<PropRecord>,
    sort_key: SortKey,
    criteria: FilterCriteria,
    confidence_sort: ConfidenceSort,
}

impl RankedView {
    /// Starts sorted by EV with no filters.
    pub fn new(props: Vec<PropRecord>, confidence_sort: ConfidenceSort) -> Self {
        let mut view = Self {
            current: Vec::new(),
            all: props,
            sort_key: SortKey::Ev,
            criteria: FilterCriteria::default(),
            confidence_sort,
        };
        view.refresh();
        view
    }

    fn refresh(&mut self) {
        self.current = self.criteria.apply(&self.all);
        sort_props(&mut self.current, self.sort_key, self.confidence_sort);
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.sort_key = key;
        sort_props(&mut self.current, key, self.confidence_sort);
    }

    pub fn filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.filter(FilterCriteria::default());
    }

    pub fn props(&self) -> &[PropRecord] {
        &self.current
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pages(&self, page_size: usize) -> Vec<Page<'_, PropRecord>> {
        paginate(&self.current, page_size)
    }

    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary::from_props(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(player: &str, ev: f64, p_model: f64) -> PropRecord {
        let mut p = PropRecord::new(player, "PTS", 20.0);
        p.ev = ev;
        p.p_model = p_model;
        p
    }

    fn names(view: &RankedView) -> Vec<&str> {
        view.props().iter().map(|p| p.player.as_str()).collect()
    }

    #[test]
    fn view_sorts_filters_and_resets() {
        let mut view = RankedView::new(
            vec![prop("a", 0.01, 0.70), prop("b", 0.10, 0.55), prop("c", -0.02, 0.60)],
            ConfidenceSort::Score,
        );
        assert_eq!(names(&view), ["b", "a", "c"]);

        view.sort_by(SortKey::ModelProb);
        assert_eq!(names(&view), ["a", "c", "b"]);

        view.filter(FilterCriteria::positive_ev_only());
        assert_eq!(names(&view), ["a", "b"]);
        assert_eq!(view.total(), 3);

        // A new filter replaces the old one.
        view.filter(FilterCriteria {
            min_prob_pct: Some(58.0),
            ..Default::default()
        });
        assert_eq!(names(&view), ["a", "c"]);

        view.reset();
        assert_eq!(names(&view), ["a", "c", "b"]);
        assert_eq!(view.pages(2).len(), 2);
        assert_eq!(view.summary().total, 3);
    }
}
