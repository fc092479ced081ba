// Prop records, stat names and verification outcomes.

use chrono::NaiveDate;
use std::fmt;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// A single box-score field a prop can be written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseStat {
    Points,
    Rebounds,
    Assists,
    ThreesMade,
}

impl BaseStat {
    pub fn from_str_stat(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PTS" => Some(BaseStat::Points),
            "REB" => Some(BaseStat::Rebounds),
            "AST" => Some(BaseStat::Assists),
            "FG3M" | "3PM" | "3PTM" => Some(BaseStat::ThreesMade),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BaseStat::Points => "PTS",
            BaseStat::Rebounds => "REB",
            BaseStat::Assists => "AST",
            BaseStat::ThreesMade => "FG3M",
        }
    }
}

/// A prop's stat: one base field or a sum of several (e.g. `REB+AST`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatKind {
    parts: Vec<BaseStat>,
}

impl StatKind {
    /// Parse a stat name. Accepts base names, `+`-joined composites and the
    /// shorthand combos `PRA`, `PR`, `PA`, `RA`. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        let expanded = match upper.as_str() {
            "PRA" => "PTS+REB+AST",
            "PR" => "PTS+REB",
            "PA" => "PTS+AST",
            "RA" => "REB+AST",
            other => other,
        };

        let parts = expanded
            .split('+')
            .map(BaseStat::from_str_stat)
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(Self { parts })
    }

    pub fn parts(&self) -> &[BaseStat] {
        &self.parts
    }

    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.parts.iter().map(BaseStat::label).collect();
        write!(f, "{}", labels.join("+"))
    }
}

// ---------------------------------------------------------------------------
// Verification outcome
// ---------------------------------------------------------------------------

/// Outcome of checking a prop against the player's actual game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitMiss {
    Hit,
    Miss,
    Pending,
    Error,
}

impl HitMiss {
    /// Strictly greater than the line is a hit; landing exactly on the line
    /// is a miss.
    pub fn classify(actual: f64, line: f64) -> Self {
        if actual > line {
            HitMiss::Hit
        } else {
            HitMiss::Miss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HitMiss::Hit => "HIT",
            HitMiss::Miss => "MISS",
            HitMiss::Pending => "PENDING",
            HitMiss::Error => "ERROR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            HitMiss::Hit => "✓",
            HitMiss::Miss => "✗",
            HitMiss::Pending => "⏳",
            HitMiss::Error => "",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HIT" => Some(HitMiss::Hit),
            "MISS" => Some(HitMiss::Miss),
            "PENDING" => Some(HitMiss::Pending),
            "ERROR" => Some(HitMiss::Error),
            _ => None,
        }
    }
}

impl fmt::Display for HitMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the verified game was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// The game in the window against the requested opponent.
    Opponent,
    /// No opponent given; the latest game in the window.
    MostRecent,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Opponent => "BallDontLie API",
            MatchMethod::MostRecent => "Most recent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [MatchMethod::Opponent, MatchMethod::MostRecent]
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Result columns attached to a prop by the batch runner.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Unset for PENDING and ERROR rows.
    pub actual_stat: Option<f64>,
    pub hit_miss: HitMiss,
    pub game_date: Option<NaiveDate>,
    pub matchup: Option<String>,
    pub match_method: Option<MatchMethod>,
    pub days_old: Option<i64>,
}

impl Verification {
    /// A row whose game could not be found (yet).
    pub fn pending() -> Self {
        Self {
            actual_stat: None,
            hit_miss: HitMiss::Pending,
            game_date: None,
            matchup: None,
            match_method: None,
            days_old: None,
        }
    }

    /// A row that cannot be classified.
    pub fn error() -> Self {
        Self {
            hit_miss: HitMiss::Error,
            ..Self::pending()
        }
    }

    pub fn result_symbol(&self) -> &'static str {
        self.hit_miss.symbol()
    }

    /// `Actual_Stat` cell text: the value, `N/A` when pending, empty on error.
    pub fn actual_display(&self) -> String {
        match (self.actual_stat, self.hit_miss) {
            (Some(v), _) => format_number(v),
            (None, HitMiss::Pending) => "N/A".to_string(),
            (None, _) => String::new(),
        }
    }
}

/// Render a stat value without a trailing `.0` for whole numbers.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// PropRecord
// ---------------------------------------------------------------------------

/// One scored prediction. Fields from `projection` through `injury` come from
/// the external projection model and are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PropRecord {
    pub player: String,
    pub stat: String,
    pub line: f64,
    /// American odds.
    pub odds: i32,
    pub projection: f64,
    pub p_model: f64,
    pub p_book: f64,
    /// Fraction of stake.
    pub ev: f64,
    pub n_games: u32,
    pub opponent: Option<String>,
    pub position: Option<String>,
    pub dvp_mult: Option<f64>,
    pub confidence: Option<f64>,
    pub injury: Option<String>,
    pub verification: Option<Verification>,
}

/// Which side of the line the projection favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Over => "OVER",
            Direction::Under => "UNDER",
        }
    }
}

impl PropRecord {
    /// A bare prop with neutral model fields; useful for verification-only input.
    pub fn new(player: impl Into<String>, stat: impl Into<String>, line: f64) -> Self {
        Self {
            player: player.into(),
            stat: stat.into().trim().to_uppercase(),
            line,
            odds: 0,
            projection: 0.0,
            p_model: 0.0,
            p_book: 0.0,
            ev: 0.0,
            n_games: 0,
            opponent: None,
            position: None,
            dvp_mult: None,
            confidence: None,
            injury: None,
            verification: None,
        }
    }

    pub fn stat_kind(&self) -> Option<StatKind> {
        StatKind::parse(&self.stat)
    }

    pub fn ev_pct(&self) -> f64 {
        self.ev * 100.0
    }

    pub fn model_prob_pct(&self) -> f64 {
        self.p_model * 100.0
    }

    pub fn book_prob_pct(&self) -> f64 {
        self.p_book * 100.0
    }

    pub fn edge_pct(&self) -> f64 {
        self.model_prob_pct() - self.book_prob_pct()
    }

    /// Signed projection minus line.
    pub fn proj_line_gap(&self) -> f64 {
        self.projection - self.line
    }

    pub fn direction(&self) -> Direction {
        if self.projection > self.line {
            Direction::Over
        } else {
            Direction::Under
        }
    }

    pub fn hit_miss(&self) -> Option<HitMiss> {
        self.verification.as_ref().map(|v| v.hit_miss)
    }
}

/// Format American odds with an explicit sign for favourites and dogs alike.
pub fn format_odds(odds: i32) -> String {
    if odds >= 0 {
        format!("+{odds}")
    } else {
        odds.to_string()
    }
}
