// Scored-prop CSV loading.
//
// Reads the projection model's output: one row per prop with the model
// fields, and optionally the verification columns a previous `verify` run
// appended. Malformed rows are skipped with a warning.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::api::parse_api_date;
use crate::prop::{HitMiss, MatchMethod, PropRecord, Verification};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One scored-prop row. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct RawScoredProp {
    #[serde(alias = "Player")]
    player: String,
    #[serde(alias = "Stat")]
    stat: String,
    #[serde(alias = "Line")]
    line: f64,
    #[serde(default, alias = "Odds")]
    odds: f64,
    #[serde(alias = "Projection")]
    projection: f64,
    p_model: f64,
    p_book: f64,
    #[serde(alias = "EV")]
    ev: f64,
    #[serde(default)]
    n_games: f64,
    #[serde(default, alias = "Opponent")]
    opponent: Option<String>,
    #[serde(default, alias = "Position")]
    position: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dvp_mult: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    confidence: Option<f64>,
    #[serde(default, alias = "Injury")]
    injury: Option<String>,

    #[serde(default, rename = "Hit_Miss", alias = "hit_miss")]
    hit_miss: Option<String>,
    #[serde(default, rename = "Actual_Stat", alias = "actual_stat", deserialize_with = "csv::invalid_option")]
    actual_stat: Option<f64>,
    #[serde(default, rename = "Game_Date", alias = "game_date")]
    game_date: Option<String>,
    #[serde(default, rename = "Matchup", alias = "matchup")]
    matchup: Option<String>,
    #[serde(default, rename = "Match_Method", alias = "match_method")]
    match_method: Option<String>,
    #[serde(default, rename = "Days_Old", alias = "days_old", deserialize_with = "csv::invalid_option")]
    days_old: Option<i64>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawScoredProp {
    fn into_record(self) -> Result<PropRecord, String> {
        let player = self.player.trim().to_string();
        if player.is_empty() {
            return Err("empty player".into());
        }
        let numbers = [self.line, self.projection, self.p_model, self.p_book, self.ev, self.odds];
        if !numbers.iter().all(|v| v.is_finite()) {
            return Err(format!("non-finite numeric field for '{player}'"));
        }

        let verification = non_blank(self.hit_miss)
            .and_then(|s| HitMiss::parse(&s))
            .map(|hit_miss| Verification {
                actual_stat: self.actual_stat,
                hit_miss,
                game_date: self.game_date.as_deref().and_then(parse_api_date),
                matchup: non_blank(self.matchup),
                match_method: self.match_method.as_deref().and_then(MatchMethod::parse),
                days_old: self.days_old,
            });

        let mut record = PropRecord::new(player, self.stat, self.line);
        record.odds = self.odds.round() as i32;
        record.projection = self.projection;
        record.p_model = self.p_model;
        record.p_book = self.p_book;
        record.ev = self.ev;
        record.n_games = self.n_games.max(0.0).round() as u32;
        record.opponent = non_blank(self.opponent);
        record.position = non_blank(self.position);
        record.dvp_mult = self.dvp_mult;
        record.confidence = self.confidence;
        record.injury = non_blank(self.injury);
        record.verification = verification;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

pub fn load_scored_props_from_reader<R: Read>(rdr: R) -> Result<Vec<PropRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let mut props = Vec::new();
    for (i, result) in reader.deserialize::<RawScoredProp>().enumerate() {
        match result.map_err(|e| e.to_string()).and_then(RawScoredProp::into_record) {
            Ok(record) => props.push(record),
            Err(e) => warn!("skipping malformed prop row {}: {}", i + 1, e),
        }
    }
    Ok(props)
}

pub fn load_scored_props(path: &Path) -> Result<Vec<PropRecord>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_scored_props_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}
