// BallDontLie v1 HTTP client.
//
// Every request goes through the shared throttle, carries the API key in the
// `Authorization` header and a fixed per-request timeout. 429 responses are
// retried with linear backoff; every other failure is returned to the caller
// as a per-call `ApiError`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiError, ApiPlayer, BoxScoreRow, GameRecord, StatsApi, Throttle};
use crate::config::{ApiConfig, Config};

/// Every BallDontLie response wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

pub struct BallDontLieClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    search_page_size: u32,
    stats_page_size: u32,
    max_retries: u32,
    retry_backoff: Duration,
    throttle: Throttle,
}

impl fmt::Debug for BallDontLieClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BallDontLieClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("call_delay", &self.throttle.delay())
            .finish()
    }
}

impl BallDontLieClient {
    pub fn new(api_key: impl Into<String>, api: &ApiConfig) -> Self {
        let timeout = Duration::from_secs(api.timeout_secs);
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            search_page_size: api.search_page_size,
            stats_page_size: api.stats_page_size,
            max_retries: api.max_retries,
            retry_backoff: Duration::from_millis(api.retry_backoff_ms),
            throttle: Throttle::new(Duration::from_millis(api.call_delay_ms)),
        }
    }

    /// Build a client from the application config. Returns `None` when no
    /// API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        config
            .api_key()
            .map(|key| Self::new(key.to_string(), &config.api))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.throttle.wait().await;
            debug!(%url, attempt, "GET");

            let response = self
                .http
                .get(&url)
                .query(query)
                .header(AUTHORIZATION, &self.api_key)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| transport_error(&url, e))?;

            let status = response.status().as_u16();
            if status == 429 {
                let backoff = rate_limit_backoff(&url, attempt, self.max_retries, self.retry_backoff)?;
                warn!(
                    "rate limited by {} (attempt {}/{}), backing off {:?}",
                    url,
                    attempt,
                    self.max_retries + 1,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            if let Some(err) = status_error(status, &url) {
                return Err(err);
            }

            let body = response
                .text()
                .await
                .map_err(|e| transport_error(&url, e))?;
            return decode_data(&body).map_err(|source| ApiError::Decode { url, source });
        }
    }
}

#[async_trait]
impl StatsApi for BallDontLieClient {
    async fn search_players(&self, query: &str) -> Result<Vec<ApiPlayer>, ApiError> {
        self.get_data(
            "players",
            &[
                ("search", query.to_string()),
                ("per_page", self.search_page_size.to_string()),
            ],
        )
        .await
    }

    async fn player_stats(
        &self,
        player_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BoxScoreRow>, ApiError> {
        self.get_data(
            "stats",
            &[
                ("player_ids[]", player_id.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("per_page", self.stats_page_size.to_string()),
            ],
        )
        .await
    }

    async fn game(&self, game_id: u64) -> Result<GameRecord, ApiError> {
        self.get_data(&format!("games/{game_id}"), &[]).await
    }

    async fn check_connection(&self) -> Result<(), ApiError> {
        let _: Vec<ApiPlayer> = self
            .get_data("players", &[("per_page", "1".to_string())])
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Delay before retrying a 429, growing linearly with `attempt` (1-based).
/// Once `max_retries` retries are spent the call fails with `RateLimited`.
pub(crate) fn rate_limit_backoff(
    url: &str,
    attempt: u32,
    max_retries: u32,
    step: Duration,
) -> Result<Duration, ApiError> {
    if attempt <= max_retries {
        return Ok(step * attempt);
    }
    Err(ApiError::RateLimited {
        url: url.to_string(),
        attempts: attempt,
    })
}

/// Map a non-429 status to an error; `None` for success codes.
pub(crate) fn status_error(status: u16, url: &str) -> Option<ApiError> {
    match status {
        200..=299 => None,
        401 => Some(ApiError::Unauthorized {
            url: url.to_string(),
        }),
        _ => Some(ApiError::Status {
            status,
            url: url.to_string(),
        }),
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout {
            url: url.to_string(),
        }
    } else {
        ApiError::Transport {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Unwrap the `data` field of a response body.
pub(crate) fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str::<DataEnvelope<T>>(body).map(|env| env.data)
}
