// Free-text player name → upstream player id.
//
// Prop feeds spell names loosely ("CJ McCollum", "C.J. McCollum",
// "Jaren Jackson Jr"). The resolver walks an ordered list of query
// strategies against the search endpoint and stops at the first confident
// match.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::VerifyError;
use crate::api::{ApiError, ApiPlayer, StatsApi};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// One way of turning the raw name into a search query.
#[derive(Debug, Clone, Copy)]
pub struct SearchStrategy {
    pub name: &'static str,
    /// `None` when the strategy does not apply to this name.
    pub query: fn(&str) -> Option<String>,
    /// Take the first search result when nothing matches the full name.
    pub accept_first: bool,
}

/// Tried in order; later strategies only run when earlier ones found nothing.
pub const STRATEGIES: &[SearchStrategy] = &[
    SearchStrategy {
        name: "as given",
        query: query_as_given,
        accept_first: false,
    },
    SearchStrategy {
        name: "punctuation stripped",
        query: query_without_periods,
        accept_first: false,
    },
    SearchStrategy {
        name: "initials collapsed",
        query: query_collapsed_initials,
        accept_first: false,
    },
    SearchStrategy {
        name: "last name only",
        query: query_last_name,
        accept_first: true,
    },
];

const NAME_SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV", "V"];

fn query_as_given(name: &str) -> Option<String> {
    let q = name.trim();
    (!q.is_empty()).then(|| q.to_string())
}

/// Drop periods and collapse runs of whitespace.
fn query_without_periods(name: &str) -> Option<String> {
    let stripped = name.replace('.', "");
    let q = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (!q.is_empty()).then_some(q)
}

/// "C.J." → "CJ", "J.J." → "JJ"; other tokens (including "Jr.") are kept.
fn query_collapsed_initials(name: &str) -> Option<String> {
    let tokens: Vec<String> = name
        .split_whitespace()
        .map(|token| {
            if is_initials(token) {
                token.replace('.', "")
            } else {
                token.to_string()
            }
        })
        .collect();
    let q = tokens.join(" ");
    (!q.is_empty()).then_some(q)
}

/// Two or more single letters each followed by a period, e.g. `C.J.` or `P.J`.
fn is_initials(token: &str) -> bool {
    let letters: Vec<&str> = token.split('.').filter(|s| !s.is_empty()).collect();
    token.contains('.')
        && letters.len() >= 2
        && letters
            .iter()
            .all(|s| s.chars().count() == 1 && s.chars().all(char::is_alphabetic))
}

/// Last token that is not a generational suffix, for names of 2+ tokens.
fn query_last_name(name: &str) -> Option<String> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    tokens
        .iter()
        .skip(1)
        .rev()
        .find(|t| !NAME_SUFFIXES.contains(&t.trim_end_matches('.').to_uppercase().as_str()))
        .map(|t| t.to_string())
}

/// Lowercased letters and digits only.
fn loose_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// A resolved player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: u64,
    pub full_name: String,
    /// Name of the strategy whose query produced the match.
    pub strategy: &'static str,
}

/// Pick a player from one page of search results.
///
/// Exact (case-insensitive) full-name matches win over loose matches that
/// ignore punctuation and spacing; within each pass the upstream order decides.
fn pick_match(name: &str, players: &[ApiPlayer], accept_first: bool) -> Option<ApiPlayer> {
    let wanted = name.trim().to_lowercase();
    if let Some(p) = players
        .iter()
        .find(|p| p.full_name().to_lowercase() == wanted)
    {
        return Some(p.clone());
    }

    let wanted_loose = loose_key(name);
    if let Some(p) = players
        .iter()
        .find(|p| !wanted_loose.is_empty() && loose_key(&p.full_name()) == wanted_loose)
    {
        return Some(p.clone());
    }

    if accept_first {
        return players.first().cloned();
    }
    None
}

/// Outcome of a completed search: the identity, or every query that came up
/// empty. Upstream failures are never stored.
type Lookup = Result<PlayerIdentity, Vec<String>>;

/// Resolves names through the search endpoint, remembering answers for the
/// lifetime of the resolver (one batch).
///
/// Each normalized name owns a `OnceCell`; concurrent rows with the same
/// name wait on the first search instead of issuing their own.
pub struct PlayerResolver {
    api: Arc<dyn StatsApi>,
    memo: Mutex<HashMap<String, Arc<OnceCell<Lookup>>>>,
}

impl PlayerResolver {
    pub fn new(api: Arc<dyn StatsApi>) -> Self {
        Self {
            api,
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn memo_cell(&self, key: String) -> Arc<OnceCell<Lookup>> {
        let mut memo = self.memo.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        memo.entry(key).or_default().clone()
    }

    /// Resolve `name` to exactly one player.
    ///
    /// A 401 aborts immediately with `VerifyError::Auth`. Other upstream
    /// failures skip to the next strategy; if every strategy comes up empty
    /// and at least one call failed, the last failure is returned instead of
    /// `PlayerNotFound` so the row is not blamed on the name.
    pub async fn resolve(&self, name: &str) -> Result<PlayerIdentity, VerifyError> {
        let cell = self.memo_cell(name.trim().to_lowercase());
        if cell.initialized() {
            debug!(player = name, "resolver cache hit");
        }

        let lookup = cell.get_or_try_init(|| self.search(name)).await?;
        lookup.clone().map_err(|tried| VerifyError::PlayerNotFound {
            name: name.to_string(),
            tried,
        })
    }

    async fn search(&self, name: &str) -> Result<Lookup, VerifyError> {
        let mut tried: Vec<String> = Vec::new();
        let mut last_failure: Option<ApiError> = None;

        for strategy in STRATEGIES {
            let Some(query) = (strategy.query)(name) else {
                continue;
            };
            if tried.iter().any(|q| q.eq_ignore_ascii_case(&query)) {
                continue;
            }
            tried.push(query.clone());

            let players = match self.api.search_players(&query).await {
                Ok(players) => players,
                Err(e) if e.is_auth() => return Err(VerifyError::Auth(e)),
                Err(e) => {
                    warn!(player = name, query = %query, "player search failed: {}", e);
                    last_failure = Some(e);
                    continue;
                }
            };
            debug!(player = name, query = %query, results = players.len(), strategy = strategy.name);

            if let Some(found) = pick_match(name, &players, strategy.accept_first) {
                let identity = PlayerIdentity {
                    id: found.id,
                    full_name: found.full_name(),
                    strategy: strategy.name,
                };
                if !identity.full_name.eq_ignore_ascii_case(name.trim()) {
                    info!("'{}' resolved as '{}' ({})", name, identity.full_name, strategy.name);
                }
                return Ok(Ok(identity));
            }
        }

        if let Some(e) = last_failure {
            return Err(VerifyError::Upstream(e));
        }

        warn!(player = name, tried = ?tried, "player not found");
        Ok(Err(tried))
    }
}
