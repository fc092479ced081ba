// Prop verification: resolve the player, find the game, classify the stat.

pub mod batch;
pub mod matcher;
pub mod resolver;
pub mod stat;
pub mod table;

use chrono::{Days, NaiveDate};
use std::fmt;
use thiserror::Error;

use crate::api::ApiError;
use crate::prop::HitMiss;

pub use batch::{BatchError, BatchOptions, BatchReport, BatchRunner, CancelSignal, PropInput, RunSummary};
pub use matcher::{GameMatch, GameMatcher, Location};
pub use resolver::{PlayerIdentity, PlayerResolver, SearchStrategy, STRATEGIES};
pub use stat::{extract_stat, verify_stat, StatOutcome};
pub use table::{PropTable, TableError};

/// Where to get an API key after a 401.
pub const API_KEY_HELP: &str = "invalid or missing API key; get a key at https://www.balldontlie.io/";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a single prop could not be verified.
///
/// Everything except `Auth` is local to one row: it is logged, folded into
/// the row's PENDING/ERROR status and the batch moves on.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid or missing API key; get a key at https://www.balldontlie.io/ ({0})")]
    Auth(#[source] ApiError),

    #[error("player `{name}` not found (searched: {})", .tried.join(" | "))]
    PlayerNotFound { name: String, tried: Vec<String> },

    #[error("no games for player {player_id} in {window}")]
    NoGamesInWindow { player_id: u64, window: DateWindow },

    #[error("no game against {opponent} in {window}")]
    OpponentNotMatched { opponent: String, window: DateWindow },

    #[error("stat `{stat}` cannot be resolved from the box score")]
    StatFieldUnresolvable { stat: String },

    #[error("invalid prop row: {reason}")]
    InvalidInput { reason: String },

    #[error("upstream call failed: {0}")]
    Upstream(#[source] ApiError),
}

impl VerifyError {
    /// Only authentication failures stop a batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VerifyError::Auth(_))
    }

    /// Status recorded on the row when this error ends its verification.
    pub fn row_status(&self) -> HitMiss {
        match self {
            VerifyError::StatFieldUnresolvable { .. } | VerifyError::InvalidInput { .. } => {
                HitMiss::Error
            }
            _ => HitMiss::Pending,
        }
    }
}

impl From<ApiError> for VerifyError {
    fn from(err: ApiError) -> Self {
        if err.is_auth() {
            VerifyError::Auth(err)
        } else {
            VerifyError::Upstream(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Inclusive game-date range searched for a prop, ending the day before the
/// cutoff so the cutoff date itself is never looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cutoff: NaiveDate,
}

impl DateWindow {
    /// `[cutoff - days, cutoff - 1]`. A lookback of 0 is treated as 1.
    pub fn lookback(cutoff: NaiveDate, days: u32) -> Self {
        let days = u64::from(days.max(1));
        Self {
            start: cutoff.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN),
            end: cutoff.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN),
            cutoff,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whole days between the game and the cutoff.
    pub fn days_old(&self, game_date: NaiveDate) -> i64 {
        (self.cutoff - game_date).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_excludes_cutoff_day() {
        let w = DateWindow::lookback(d(2025, 11, 11), 2);
        assert_eq!(w.start, d(2025, 11, 9));
        assert_eq!(w.end, d(2025, 11, 10));
        assert!(w.contains(d(2025, 11, 10)));
        assert!(!w.contains(d(2025, 11, 11)));
        assert!(!w.contains(d(2025, 11, 8)));
        assert_eq!(w.to_string(), "2025-11-09..=2025-11-10");
    }

    #[test]
    fn zero_lookback_still_covers_previous_day() {
        let w = DateWindow::lookback(d(2025, 1, 1), 0);
        assert_eq!(w.start, d(2024, 12, 31));
        assert_eq!(w.end, d(2024, 12, 31));
    }

    #[test]
    fn days_old_counts_from_cutoff() {
        let w = DateWindow::lookback(d(2025, 11, 11), 7);
        assert_eq!(w.days_old(d(2025, 11, 10)), 1);
        assert_eq!(w.days_old(d(2025, 11, 4)), 7);
    }

    #[test]
    fn error_statuses() {
        let not_found = VerifyError::PlayerNotFound {
            name: "Nobody".into(),
            tried: vec!["Nobody".into()],
        };
        assert_eq!(not_found.row_status(), HitMiss::Pending);
        assert!(!not_found.is_fatal());
        assert!(not_found.to_string().contains("searched: Nobody"));

        let stat = VerifyError::StatFieldUnresolvable { stat: "STL".into() };
        assert_eq!(stat.row_status(), HitMiss::Error);

        let auth: VerifyError = ApiError::Unauthorized { url: "u".into() }.into();
        assert!(auth.is_fatal());
        assert!(auth.to_string().contains("balldontlie.io"));

        let timeout: VerifyError = ApiError::Timeout { url: "u".into() }.into();
        assert!(!timeout.is_fatal());
        assert_eq!(timeout.row_status(), HitMiss::Pending);
    }
}
