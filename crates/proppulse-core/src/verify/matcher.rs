// Player id + date window (+ opponent) → one game.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::{DateWindow, VerifyError};
use crate::api::{BoxScoreRow, GameRecord, StatsApi, TeamInfo};
use crate::prop::MatchMethod;
use crate::teams::{alias_in_name, TeamAliasTable};

/// Separator used in the matchup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// `vs`: the home slot of the game.
    Home,
    /// `@`: the visitor slot of the game.
    Away,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Home => "vs",
            Location::Away => "@",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chosen game and the audit fields recorded with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMatch {
    pub row: BoxScoreRow,
    /// Absent when the game detail fetch failed (most-recent path only).
    pub game: Option<GameRecord>,
    pub game_date: Option<NaiveDate>,
    pub matchup: String,
    pub method: MatchMethod,
    pub days_old: Option<i64>,
    pub location: Option<Location>,
}

fn abbr_or<'a>(team: &'a TeamInfo, fallback: &'a str) -> &'a str {
    let abbr = team.abbreviation.trim();
    if abbr.is_empty() {
        fallback
    } else {
        abbr
    }
}

pub struct GameMatcher {
    api: Arc<dyn StatsApi>,
    teams: Arc<TeamAliasTable>,
}

impl GameMatcher {
    pub fn new(api: Arc<dyn StatsApi>, teams: Arc<TeamAliasTable>) -> Self {
        Self { api, teams }
    }

    /// Find the game to verify a prop against.
    ///
    /// With an opponent, the first row (in upstream order) whose game
    /// involves that opponent wins, and no match is an error. Without one,
    /// the latest game in the window is used.
    pub async fn find_game(
        &self,
        player_id: u64,
        window: &DateWindow,
        opponent: Option<&str>,
    ) -> Result<GameMatch, VerifyError> {
        let rows = self
            .api
            .player_stats(player_id, window.start, window.end)
            .await?;

        // Never look at the cutoff day or later, whatever the API returns.
        let rows: Vec<BoxScoreRow> = rows
            .into_iter()
            .filter(|r| r.game_date().map_or(true, |d| d < window.cutoff))
            .collect();

        if rows.is_empty() {
            warn!(player_id, %window, "no games in window");
            return Err(VerifyError::NoGamesInWindow {
                player_id,
                window: *window,
            });
        }
        debug!(player_id, games = rows.len(), "box scores in window");

        let games = self.fetch_games(&rows).await?;

        match opponent.map(str::trim).filter(|o| !o.is_empty()) {
            Some(opp) => self.match_opponent(rows, &games, window, opp),
            None => Ok(most_recent(rows, &games, window)),
        }
    }

    /// Game detail for every distinct game id, fetched once each.
    async fn fetch_games(
        &self,
        rows: &[BoxScoreRow],
    ) -> Result<HashMap<u64, GameRecord>, VerifyError> {
        let mut ids: Vec<u64> = Vec::new();
        for row in rows {
            if !ids.contains(&row.game.id) {
                ids.push(row.game.id);
            }
        }

        let mut games = HashMap::with_capacity(ids.len());
        for id in ids {
            match self.api.game(id).await {
                Ok(game) => {
                    games.insert(id, game);
                }
                Err(e) if e.is_auth() => return Err(VerifyError::Auth(e)),
                Err(e) => warn!(game_id = id, "game detail unavailable: {}", e),
            }
        }
        Ok(games)
    }

    fn match_opponent(
        &self,
        rows: Vec<BoxScoreRow>,
        games: &HashMap<u64, GameRecord>,
        window: &DateWindow,
        opponent: &str,
    ) -> Result<GameMatch, VerifyError> {
        let target = self.teams.normalize(opponent);

        for row in rows {
            let Some(game) = games.get(&row.game.id) else {
                continue;
            };
            let Some((opp_team, location)) = self.opponent_slot(&target, game) else {
                continue;
            };

            let matchup = format!(
                "{} {} {}",
                abbr_or(&row.team, "TEAM"),
                location,
                abbr_or(opp_team, "OPP")
            );
            let game_date = game.game_date().or_else(|| row.game_date());
            info!(opponent = %target, %matchup, date = ?game_date, "matched opponent");

            return Ok(GameMatch {
                days_old: game_date.map(|d| window.days_old(d)),
                game_date,
                matchup,
                method: MatchMethod::Opponent,
                location: Some(location),
                game: Some(game.clone()),
                row,
            });
        }

        warn!(opponent = %target, %window, "no game against opponent");
        Err(VerifyError::OpponentNotMatched {
            opponent: target,
            window: *window,
        })
    }

    /// Which side of `game` the opponent is on: abbreviations first, then
    /// each full-name alias against home, then visitor.
    fn opponent_slot<'g>(
        &self,
        target: &str,
        game: &'g GameRecord,
    ) -> Option<(&'g TeamInfo, Location)> {
        let home = &game.home_team;
        let away = &game.visitor_team;

        if self.teams.matches_abbreviation(target, &home.abbreviation) {
            return Some((home, Location::Home));
        }
        if self.teams.matches_abbreviation(target, &away.abbreviation) {
            return Some((away, Location::Away));
        }
        for alias in self.teams.aliases(target) {
            if alias_in_name(alias, &home.full_name) {
                return Some((home, Location::Home));
            }
            if alias_in_name(alias, &away.full_name) {
                return Some((away, Location::Away));
            }
        }
        None
    }
}

/// Latest row by game date; rows without a parseable date sort last.
fn most_recent(
    mut rows: Vec<BoxScoreRow>,
    games: &HashMap<u64, GameRecord>,
    window: &DateWindow,
) -> GameMatch {
    rows.sort_by(|a, b| b.game_date().cmp(&a.game_date()));
    let row = rows.swap_remove(0);
    let player_abbr = abbr_or(&row.team, "TEAM").to_string();
    let game = games.get(&row.game.id).cloned();

    let (matchup, location) = match &game {
        Some(g) => {
            let home = abbr_or(&g.home_team, "HOME");
            if player_abbr == home {
                (
                    format!("{player_abbr} vs {}", abbr_or(&g.visitor_team, "AWAY")),
                    Some(Location::Home),
                )
            } else {
                (format!("{player_abbr} @ {home}"), Some(Location::Away))
            }
        }
        None => (format!("{player_abbr} (opponent unknown)"), None),
    };

    let game_date = row
        .game_date()
        .or_else(|| game.as_ref().and_then(GameRecord::game_date));
    info!(%matchup, date = ?game_date, "no opponent given, using most recent game");

    GameMatch {
        days_old: game_date.map(|d| window.days_old(d)),
        game_date,
        matchup,
        method: MatchMethod::MostRecent,
        location,
        game,
        row,
    }
}
