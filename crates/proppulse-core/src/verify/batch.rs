// Batch verification: a bounded worker pool over a table of props.
//
// Rows run concurrently (up to `max_concurrency`) but every upstream request
// still goes through the client's shared throttle. Results land in slots
// indexed by input position, so output order never depends on completion
// order. A row's failure stays in that row; only an authentication failure
// stops the batch.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::matcher::GameMatcher;
use super::resolver::PlayerResolver;
use super::stat::verify_stat;
use super::table::{PropTable, TableError};
use super::{DateWindow, VerifyError};
use crate::api::{ApiError, StatsApi};
use crate::config::BatchConfig;
use crate::prop::{HitMiss, StatKind, Verification};
use crate::teams::TeamAliasTable;

// ---------------------------------------------------------------------------
// Inputs and options
// ---------------------------------------------------------------------------

/// The columns of an input row the verifier needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PropInput {
    pub player: String,
    pub stat: String,
    /// `None` when the cell was empty or not a number.
    pub line: Option<f64>,
    pub opponent: Option<String>,
}

impl PropInput {
    pub fn new(player: impl Into<String>, stat: impl Into<String>, line: f64) -> Self {
        Self {
            player: player.into(),
            stat: stat.into(),
            line: Some(line),
            opponent: None,
        }
    }

    pub fn against(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = Some(opponent.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Games on or after this date are never considered.
    pub cutoff: NaiveDate,
    pub lookback_days: u32,
    pub max_concurrency: usize,
    pub row_delay: Duration,
}

impl BatchOptions {
    pub fn from_config(batch: &BatchConfig, cutoff: NaiveDate) -> Self {
        Self {
            cutoff,
            lookback_days: batch.lookback_days,
            max_concurrency: batch.max_concurrency,
            row_delay: Duration::from_millis(batch.row_delay_ms),
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::lookback(self.cutoff, self.lookback_days)
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative stop flag shared between the caller and the batch.
///
/// Once cancelled no new rows start; rows already talking to the API finish.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub hits: usize,
    pub misses: usize,
    pub pending: usize,
    pub errors: usize,
    /// Rows never started because the batch was cancelled.
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_results(results: &[Option<Verification>]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.as_ref().map(|v| v.hit_miss) {
                Some(HitMiss::Hit) => summary.hits += 1,
                Some(HitMiss::Miss) => summary.misses += 1,
                Some(HitMiss::Pending) => summary.pending += 1,
                Some(HitMiss::Error) => summary.errors += 1,
                None => summary.skipped += 1,
            }
        }
        summary
    }

    /// `hits / (hits + misses)`; `None` before anything has been decided.
    pub fn hit_rate(&self) -> Option<f64> {
        let decided = self.hits + self.misses;
        (decided > 0).then(|| self.hits as f64 / decided as f64)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} props: {} HIT, {} MISS, {} PENDING, {} ERROR",
            self.total, self.hits, self.misses, self.pending, self.errors
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        match self.hit_rate() {
            Some(rate) => write!(f, " (hit rate {:.1}%)", rate * 100.0),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One slot per input row, in input order. `None` for skipped rows.
    pub results: Vec<Option<Verification>>,
    pub summary: RunSummary,
    pub cancelled: bool,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid or missing API key; get a key at https://www.balldontlie.io/ ({source}); stopped after {completed}")]
    Auth {
        source: ApiError,
        completed: RunSummary,
    },

    #[error("cannot read props: {0}")]
    Input(#[from] TableError),
}

enum RowOutcome {
    Skipped,
    Done(Verification),
    Fatal(ApiError),
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct BatchRunner {
    api: Arc<dyn StatsApi>,
    resolver: PlayerResolver,
    matcher: GameMatcher,
    options: BatchOptions,
}

impl BatchRunner {
    /// A fresh runner; the player-name memo lives as long as the runner.
    pub fn new(api: Arc<dyn StatsApi>, teams: Arc<TeamAliasTable>, options: BatchOptions) -> Self {
        Self {
            resolver: PlayerResolver::new(Arc::clone(&api)),
            matcher: GameMatcher::new(Arc::clone(&api), teams),
            api,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// One cheap authenticated call before the batch starts.
    ///
    /// Bad credentials are fatal; any other failure is only logged, since
    /// the rows themselves tolerate upstream trouble.
    pub async fn preflight(&self) -> Result<(), BatchError> {
        match self.api.check_connection().await {
            Ok(()) => {
                info!("stats API reachable");
                Ok(())
            }
            Err(e) if e.is_auth() => Err(BatchError::Auth {
                source: e,
                completed: RunSummary::default(),
            }),
            Err(e) => {
                warn!("connection check failed, continuing: {}", e);
                Ok(())
            }
        }
    }

    /// Verify every prop. The returned results line up with `props`.
    pub async fn run(
        &self,
        props: &[PropInput],
        cancel: &CancelSignal,
    ) -> Result<BatchReport, BatchError> {
        let window = self.options.window();
        info!(
            rows = props.len(),
            %window,
            workers = self.options.max_concurrency.max(1),
            "starting verification batch"
        );

        let mut results: Vec<Option<Verification>> = vec![None; props.len()];
        let mut auth_failure: Option<ApiError> = None;

        let mut outcomes = stream::iter(props.iter().enumerate())
            .map(|(index, prop)| async move {
                if cancel.is_cancelled() {
                    return (index, RowOutcome::Skipped);
                }
                let outcome = self.process_row(index, prop, &window).await;
                self.pause(cancel).await;
                (index, outcome)
            })
            .buffer_unordered(self.options.max_concurrency.max(1));

        while let Some((index, outcome)) = outcomes.next().await {
            match outcome {
                RowOutcome::Done(verification) => results[index] = Some(verification),
                RowOutcome::Skipped => {}
                RowOutcome::Fatal(e) => {
                    cancel.cancel();
                    if auth_failure.is_none() {
                        warn!(row = index + 1, "authentication failed, stopping batch: {}", e);
                        auth_failure = Some(e);
                    }
                }
            }
        }

        let summary = RunSummary::from_results(&results);
        if let Some(source) = auth_failure {
            return Err(BatchError::Auth {
                source,
                completed: summary,
            });
        }

        info!("{}", summary);
        Ok(BatchReport {
            results,
            summary,
            cancelled: cancel.is_cancelled(),
        })
    }

    /// Read the props out of `table`, verify them and write the result
    /// columns back.
    pub async fn run_table(
        &self,
        table: &mut PropTable,
        cancel: &CancelSignal,
    ) -> Result<BatchReport, BatchError> {
        let inputs = table.inputs()?;
        let report = self.run(&inputs, cancel).await?;
        table.apply(&report.results)?;
        Ok(report)
    }

    async fn pause(&self, cancel: &CancelSignal) {
        if self.options.row_delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.options.row_delay) => {}
            _ = cancel.cancelled() => {}
        }
    }

    async fn process_row(&self, index: usize, prop: &PropInput, window: &DateWindow) -> RowOutcome {
        match self.verify_row(prop, window).await {
            Ok(verification) => {
                info!(
                    row = index + 1,
                    player = %prop.player,
                    stat = %prop.stat,
                    actual = %verification.actual_display(),
                    "{} {}",
                    verification.hit_miss,
                    verification.result_symbol()
                );
                RowOutcome::Done(verification)
            }
            Err(VerifyError::Auth(e)) => RowOutcome::Fatal(e),
            Err(e) => {
                warn!(
                    row = index + 1,
                    player = %prop.player,
                    stat = %prop.stat,
                    opponent = prop.opponent.as_deref().unwrap_or("-"),
                    "{}",
                    e
                );
                RowOutcome::Done(match e.row_status() {
                    HitMiss::Error => Verification::error(),
                    _ => Verification::pending(),
                })
            }
        }
    }

    async fn verify_row(
        &self,
        prop: &PropInput,
        window: &DateWindow,
    ) -> Result<Verification, VerifyError> {
        if prop.player.trim().is_empty() {
            return Err(VerifyError::InvalidInput {
                reason: "empty player name".into(),
            });
        }
        let line = prop.line.ok_or_else(|| VerifyError::InvalidInput {
            reason: format!("missing or non-numeric line for {}", prop.player),
        })?;
        if StatKind::parse(&prop.stat).is_none() {
            return Err(VerifyError::StatFieldUnresolvable {
                stat: prop.stat.clone(),
            });
        }

        let player = self.resolver.resolve(&prop.player).await?;
        let found = self
            .matcher
            .find_game(player.id, window, prop.opponent.as_deref())
            .await?;

        let outcome = verify_stat(&found.row, &prop.stat, line);
        if outcome.hit_miss == HitMiss::Error {
            warn!(player = %player.full_name, stat = %prop.stat, matchup = %found.matchup, "stat missing from box score");
        }
        Ok(Verification {
            actual_stat: outcome.actual_value,
            hit_miss: outcome.hit_miss,
            game_date: found.game_date,
            matchup: Some(found.matchup),
            match_method: Some(found.method),
            days_old: found.days_old,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiPlayer, BoxScoreRow, GameRecord, GameRef, TeamInfo};
    use crate::prop::MatchMethod;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn team(abbr: &str, name: &str) -> TeamInfo {
        TeamInfo {
            abbreviation: abbr.into(),
            full_name: name.into(),
        }
    }

    /// Players by exact name, one game per player, optional per-player latency.
    #[derive(Default)]
    struct FakeApi {
        players: HashMap<String, u64>,
        stats: HashMap<u64, Vec<BoxScoreRow>>,
        games: HashMap<u64, GameRecord>,
        latency_ms: HashMap<u64, u64>,
        search_latency_ms: u64,
        unauthorized_for: Option<String>,
        flaky_for: Option<String>,
        cancel_on: Option<(String, CancelSignal)>,
        searches: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_player(mut self, name: &str, id: u64, pts: f64, opp: (&str, &str)) -> Self {
            self.players.insert(name.to_string(), id);
            let game_id = id * 10;
            self.stats.insert(
                id,
                vec![BoxScoreRow {
                    game: GameRef {
                        id: game_id,
                        date: "2025-11-10".into(),
                    },
                    team: team("LAL", "Los Angeles Lakers"),
                    player: None,
                    pts: Some(pts),
                    reb: Some(6.0),
                    ast: Some(4.0),
                    fg3m: None,
                }],
            );
            self.games.insert(
                game_id,
                GameRecord {
                    id: game_id,
                    date: "2025-11-10".into(),
                    home_team: team(opp.0, opp.1),
                    visitor_team: team("LAL", "Los Angeles Lakers"),
                },
            );
            self
        }

        fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatsApi for FakeApi {
        async fn search_players(&self, query: &str) -> Result<Vec<ApiPlayer>, ApiError> {
            self.searches.lock().unwrap().push(query.to_string());
            if self.search_latency_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.search_latency_ms)).await;
            }
            if let Some((name, cancel)) = &self.cancel_on {
                if name == query {
                    cancel.cancel();
                }
            }
            if self.unauthorized_for.as_deref() == Some(query) {
                return Err(ApiError::Unauthorized { url: "players".into() });
            }
            if self.flaky_for.as_deref() == Some(query) {
                return Err(ApiError::Timeout { url: "players".into() });
            }
            Ok(self
                .players
                .get(query)
                .map(|id| {
                    let (first, last) = query.split_once(' ').unwrap_or((query, ""));
                    vec![ApiPlayer {
                        id: *id,
                        first_name: first.into(),
                        last_name: last.into(),
                    }]
                })
                .unwrap_or_default())
        }

        async fn player_stats(
            &self,
            player_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<BoxScoreRow>, ApiError> {
            if let Some(ms) = self.latency_ms.get(&player_id) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            Ok(self.stats.get(&player_id).cloned().unwrap_or_default())
        }

        async fn game(&self, game_id: u64) -> Result<GameRecord, ApiError> {
            self.games.get(&game_id).cloned().ok_or(ApiError::Status {
                status: 404,
                url: format!("games/{game_id}"),
            })
        }
    }

    fn options(max_concurrency: usize) -> BatchOptions {
        BatchOptions {
            cutoff: d(2025, 11, 11),
            lookback_days: 7,
            max_concurrency,
            row_delay: Duration::ZERO,
        }
    }

    fn runner(api: Arc<FakeApi>, max_concurrency: usize) -> BatchRunner {
        BatchRunner::new(api, Arc::new(TeamAliasTable::nba()), options(max_concurrency))
    }

    fn league() -> FakeApi {
        FakeApi::default()
            .with_player("LeBron James", 237, 30.0, ("NOP", "New Orleans Pelicans"))
            .with_player("Anthony Davis", 14, 18.0, ("NOP", "New Orleans Pelicans"))
            .with_player("Austin Reaves", 3, 22.0, ("BOS", "Boston Celtics"))
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_input_order() {
        let mut api = league();
        // The first row finishes last.
        api.latency_ms.insert(237, 500);
        api.latency_ms.insert(14, 100);
        let api = Arc::new(api);
        let runner = runner(api, 3);

        let props = vec![
            PropInput::new("LeBron James", "PTS", 25.5).against("NO"),
            PropInput::new("Anthony Davis", "PTS", 20.5),
            PropInput::new("Austin Reaves", "REB+AST", 9.5).against("BOS"),
        ];
        let report = runner.run(&props, &CancelSignal::new()).await.unwrap();

        let statuses: Vec<HitMiss> = report
            .results
            .iter()
            .map(|r| r.as_ref().unwrap().hit_miss)
            .collect();
        assert_eq!(statuses, vec![HitMiss::Hit, HitMiss::Miss, HitMiss::Hit]);

        let first = report.results[0].as_ref().unwrap();
        assert_eq!(first.actual_stat, Some(30.0));
        assert_eq!(first.matchup.as_deref(), Some("LAL vs NOP"));
        assert_eq!(first.match_method, Some(MatchMethod::Opponent));
        assert_eq!(first.days_old, Some(1));

        let second = report.results[1].as_ref().unwrap();
        assert_eq!(second.match_method, Some(MatchMethod::MostRecent));
        assert_eq!(second.matchup.as_deref(), Some("LAL @ NOP"));

        assert_eq!(report.summary.hits, 2);
        assert_eq!(report.summary.misses, 1);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn failing_rows_do_not_stop_the_batch() {
        let mut api = league();
        api.flaky_for = Some("Anthony Davis".into());
        let api = Arc::new(api);
        let runner = runner(api, 2);

        let props = vec![
            PropInput::new("Nobody Real", "PTS", 10.5),
            PropInput::new("LeBron James", "STL", 1.5),
            PropInput::new("Anthony Davis", "PTS", 20.5),
            PropInput {
                line: None,
                ..PropInput::new("LeBron James", "PTS", 0.0)
            },
            PropInput::new("LeBron James", "PTS", 25.5).against("MIA"),
            PropInput::new("Austin Reaves", "PTS", 21.5),
        ];
        let report = runner.run(&props, &CancelSignal::new()).await.unwrap();

        let statuses: Vec<HitMiss> = report
            .results
            .iter()
            .map(|r| r.as_ref().unwrap().hit_miss)
            .collect();
        assert_eq!(
            statuses,
            vec![
                HitMiss::Pending,
                HitMiss::Error,
                HitMiss::Pending,
                HitMiss::Error,
                HitMiss::Pending,
                HitMiss::Hit,
            ]
        );
        assert_eq!(report.results[0].as_ref().unwrap().actual_display(), "N/A");
        assert_eq!(
            report.summary,
            RunSummary {
                total: 6,
                hits: 1,
                misses: 0,
                pending: 3,
                errors: 2,
                skipped: 0,
            }
        );
    }

    #[tokio::test]
    async fn no_games_in_window_is_pending() {
        let mut api = league();
        api.stats.insert(237, vec![]);
        let runner = runner(Arc::new(api), 1);

        let report = runner
            .run(&[PropInput::new("LeBron James", "PTS", 25.5)], &CancelSignal::new())
            .await
            .unwrap();
        let row = report.results[0].as_ref().unwrap();
        assert_eq!(row.hit_miss, HitMiss::Pending);
        assert_eq!(row.result_symbol(), "⏳");
        assert_eq!(row.actual_display(), "N/A");
    }

    #[tokio::test]
    async fn auth_failure_stops_the_batch() {
        let mut api = league();
        api.unauthorized_for = Some("Anthony Davis".into());
        let api = Arc::new(api);
        let runner = runner(api.clone(), 1);
        let cancel = CancelSignal::new();

        let props = vec![
            PropInput::new("LeBron James", "PTS", 25.5),
            PropInput::new("Anthony Davis", "PTS", 20.5),
            PropInput::new("Austin Reaves", "PTS", 21.5),
        ];
        let err = runner.run(&props, &cancel).await.unwrap_err();

        match &err {
            BatchError::Auth { completed, .. } => {
                assert_eq!(completed.hits, 1);
                assert_eq!(completed.skipped, 2);
            }
            other => panic!("expected auth error, got {other}"),
        }
        assert!(err.to_string().contains("balldontlie.io"));
        assert!(cancel.is_cancelled());
        assert!(!api.searches().iter().any(|q| q == "Austin Reaves"));
    }

    #[tokio::test]
    async fn cancelled_batch_keeps_finished_rows() {
        let cancel = CancelSignal::new();
        let mut api = league();
        api.cancel_on = Some(("Anthony Davis".into(), cancel.clone()));
        let api = Arc::new(api);
        let runner = runner(api.clone(), 1);

        let props = vec![
            PropInput::new("LeBron James", "PTS", 25.5),
            PropInput::new("Anthony Davis", "PTS", 20.5),
            PropInput::new("Austin Reaves", "PTS", 21.5),
        ];
        let report = runner.run(&props, &cancel).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.results[0].as_ref().unwrap().hit_miss, HitMiss::Hit);
        // The in-flight row still completes.
        assert_eq!(report.results[1].as_ref().unwrap().hit_miss, HitMiss::Miss);
        assert!(report.results[2].is_none());
        assert_eq!(report.summary.skipped, 1);
        assert!(report.summary.to_string().contains("1 skipped"));
    }

    #[tokio::test]
    async fn cancelled_before_start_skips_everything() {
        let api = Arc::new(league());
        let runner = runner(api.clone(), 4);
        let cancel = CancelSignal::new();
        cancel.cancel();

        let props = vec![PropInput::new("LeBron James", "PTS", 25.5); 3];
        let report = runner.run(&props, &cancel).await.unwrap();
        assert!(report.results.iter().all(Option::is_none));
        assert_eq!(report.summary.skipped, 3);
        assert!(api.searches().is_empty());
    }

    #[tokio::test]
    async fn repeated_players_are_searched_once() {
        let api = Arc::new(league());
        let runner = runner(api.clone(), 1);

        let props = vec![
            PropInput::new("LeBron James", "PTS", 25.5),
            PropInput::new("LeBron James", "REB", 5.5),
            PropInput::new("LeBron James", "AST", 7.5),
        ];
        runner.run(&props, &CancelSignal::new()).await.unwrap();
        assert_eq!(api.searches(), vec!["LeBron James"]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_players_are_searched_once_when_rows_overlap() {
        let mut api = league();
        api.search_latency_ms = 50;
        let api = Arc::new(api);
        let runner = runner(api.clone(), 4);

        let props = vec![
            PropInput::new("LeBron James", "PTS", 25.5),
            PropInput::new("LeBron James", "REB", 5.5),
            PropInput::new("LeBron James", "AST", 7.5),
            PropInput::new("LeBron James", "PRA", 40.5),
        ];
        let report = runner.run(&props, &CancelSignal::new()).await.unwrap();
        assert_eq!(api.searches(), vec!["LeBron James"]);
        assert_eq!(report.summary.errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn row_delay_is_cut_short_by_cancel() {
        let api = Arc::new(league());
        let mut opts = options(1);
        opts.row_delay = Duration::from_secs(3600);
        let runner = BatchRunner::new(api, Arc::new(TeamAliasTable::nba()), opts);
        let cancel = CancelSignal::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let props = vec![PropInput::new("LeBron James", "PTS", 25.5); 2];
        let report = runner.run(&props, &cancel).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(3600));
        assert_eq!(report.summary.skipped, 1);
    }

    #[tokio::test]
    async fn preflight_maps_auth_failure() {
        struct Locked;

        #[async_trait]
        impl StatsApi for Locked {
            async fn search_players(&self, _q: &str) -> Result<Vec<ApiPlayer>, ApiError> {
                Ok(vec![])
            }
            async fn player_stats(
                &self,
                _id: u64,
                _s: NaiveDate,
                _e: NaiveDate,
            ) -> Result<Vec<BoxScoreRow>, ApiError> {
                Ok(vec![])
            }
            async fn game(&self, id: u64) -> Result<GameRecord, ApiError> {
                Err(ApiError::Status { status: 404, url: format!("games/{id}") })
            }
            async fn check_connection(&self) -> Result<(), ApiError> {
                Err(ApiError::Unauthorized { url: "players".into() })
            }
        }

        let runner = BatchRunner::new(Arc::new(Locked), Arc::new(TeamAliasTable::nba()), options(1));
        assert!(matches!(runner.preflight().await, Err(BatchError::Auth { .. })));

        let ok = BatchRunner::new(Arc::new(league()), Arc::new(TeamAliasTable::nba()), options(1));
        assert!(ok.preflight().await.is_ok());
    }

    #[test]
    fn summary_hit_rate() {
        let s = RunSummary {
            total: 4,
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(s.hit_rate(), Some(0.75));
        assert!(s.to_string().ends_with("(hit rate 75.0%)"));
        assert_eq!(RunSummary::default().hit_rate(), None);
    }
}
