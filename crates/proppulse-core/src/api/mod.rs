// Upstream stats API: wire types, error taxonomy and the `StatsApi` seam.
//
// The resolver, matcher and batch runner only ever talk to `dyn StatsApi`,
// so tests drive them with an in-memory fake instead of HTTP.

pub mod balldontlie;
pub mod throttle;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

pub use balldontlie::BallDontLieClient;
pub use throttle::Throttle;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed (HTTP 401) for {url}")]
    Unauthorized { url: String },

    #[error("rate limited (HTTP 429) for {url} after {attempts} attempt(s)")]
    RateLimited { url: String, attempts: u32 },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Credentials are wrong; nothing else in the batch can succeed.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `GET /players` result entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiPlayer {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ApiPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A team as embedded in stat rows and game records.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TeamInfo {
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub full_name: String,
}

/// Full game detail from `GET /games/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub home_team: TeamInfo,
    #[serde(default)]
    pub visitor_team: TeamInfo,
}

impl GameRecord {
    pub fn game_date(&self) -> Option<NaiveDate> {
        parse_api_date(&self.date)
    }
}

/// The game reference carried by a box-score row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRef {
    pub id: u64,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerRef {
    pub id: u64,
}

/// One player's stat line in one game, from `GET /stats`.
///
/// Stat fields are optional because the API returns `null` for games that
/// have not been fully recorded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxScoreRow {
    pub game: GameRef,
    #[serde(default)]
    pub team: TeamInfo,
    #[serde(default)]
    pub player: Option<PlayerRef>,
    #[serde(default)]
    pub pts: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
    #[serde(default)]
    pub fg3m: Option<f64>,
}

impl BoxScoreRow {
    pub fn game_date(&self) -> Option<NaiveDate> {
        parse_api_date(&self.game.date)
    }
}

/// Parse `2025-11-10` or `2025-11-10T00:00:00.000Z` into a date.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split('T').next()?.trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// StatsApi trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Search players by free text, in upstream relevance order.
    async fn search_players(&self, query: &str) -> Result<Vec<ApiPlayer>, ApiError>;

    /// All box-score rows for `player_id` with game dates in `[start, end]`.
    async fn player_stats(
        &self,
        player_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BoxScoreRow>, ApiError>;

    async fn game(&self, game_id: u64) -> Result<GameRecord, ApiError>;

    /// Cheap authenticated request used before a batch starts.
    async fn check_connection(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
