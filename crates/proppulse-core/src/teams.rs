// NBA team abbreviation aliases for fuzzy opponent matching.
//
// Prop feeds write opponents as 2- or 3-letter tokens that drift from the
// stats API's abbreviations ("NO" vs "NOP"). The table is built once and
// handed to the game matcher; nothing mutates it afterwards.

use std::collections::HashMap;

/// Canonical abbreviation → uppercase word sequences of the team's full name.
const NBA_ALIASES: &[(&str, &[&str])] = &[
    ("ATL", &["ATLANTA", "HAWKS"]),
    ("BOS", &["BOSTON", "CELTICS"]),
    ("BKN", &["BROOKLYN", "NETS"]),
    ("CHA", &["CHARLOTTE", "HORNETS"]),
    ("CHI", &["CHICAGO", "BULLS"]),
    ("CLE", &["CLEVELAND", "CAVALIERS"]),
    ("DAL", &["DALLAS", "MAVERICKS"]),
    ("DEN", &["DENVER", "NUGGETS"]),
    ("DET", &["DETROIT", "PISTONS"]),
    ("GSW", &["GOLDEN STATE", "WARRIORS"]),
    ("HOU", &["HOUSTON", "ROCKETS"]),
    ("IND", &["INDIANA", "PACERS"]),
    ("LAC", &["LA CLIPPERS", "CLIPPERS", "LOS ANGELES CLIPPERS"]),
    ("LAL", &["LA LAKERS", "LAKERS", "LOS ANGELES LAKERS"]),
    ("MEM", &["MEMPHIS", "GRIZZLIES"]),
    ("MIA", &["MIAMI", "HEAT"]),
    ("MIL", &["MILWAUKEE", "BUCKS"]),
    ("MIN", &["MINNESOTA", "TIMBERWOLVES"]),
    ("NOP", &["NEW ORLEANS", "PELICANS"]),
    ("NYK", &["NEW YORK", "KNICKS"]),
    ("OKC", &["OKLAHOMA CITY", "THUNDER"]),
    ("ORL", &["ORLANDO", "MAGIC"]),
    ("PHI", &["PHILADELPHIA", "76ERS"]),
    ("PHX", &["PHOENIX", "SUNS"]),
    ("POR", &["PORTLAND", "TRAIL BLAZERS"]),
    ("SAC", &["SACRAMENTO", "KINGS"]),
    ("SAS", &["SAN ANTONIO", "SPURS"]),
    ("TOR", &["TORONTO", "RAPTORS"]),
    ("UTA", &["UTAH", "JAZZ"]),
    ("WAS", &["WASHINGTON", "WIZARDS"]),
];

/// Short or legacy tokens seen in prop feeds → canonical abbreviation.
const SYNONYMS: &[(&str, &str)] = &[
    ("NO", "NOP"),
    ("NOR", "NOP"),
    ("NY", "NYK"),
    ("SA", "SAS"),
    ("GS", "GSW"),
    ("PHO", "PHX"),
    ("UTAH", "UTA"),
    ("WSH", "WAS"),
    ("BRK", "BKN"),
    ("CHO", "CHA"),
];

/// Uppercase, trim and map known synonyms to the canonical abbreviation.
///
/// Idempotent: no canonical abbreviation appears on the left of `SYNONYMS`.
pub fn normalize_team(token: &str) -> String {
    let upper = token.trim().to_uppercase();
    SYNONYMS
        .iter()
        .find(|(from, _)| *from == upper)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(upper)
}

/// Immutable lookup from canonical abbreviation to full-name aliases.
#[derive(Debug, Clone)]
pub struct TeamAliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl TeamAliasTable {
    /// The 30 NBA franchises.
    pub fn nba() -> Self {
        Self::from_entries(NBA_ALIASES.iter().map(|(abbr, names)| {
            (
                abbr.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        }))
    }

    /// Build a table from arbitrary entries; keys and aliases are uppercased.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let aliases = entries
            .into_iter()
            .map(|(abbr, names)| {
                (
                    abbr.trim().to_uppercase(),
                    names.into_iter().map(|n| n.to_uppercase()).collect(),
                )
            })
            .collect();
        Self { aliases }
    }

    pub fn normalize(&self, token: &str) -> String {
        normalize_team(token)
    }

    /// Aliases for an abbreviation (case-insensitive, synonyms resolved).
    /// Empty when the team is unknown.
    pub fn aliases(&self, abbreviation: &str) -> &[String] {
        self.aliases
            .get(&normalize_team(abbreviation))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, abbreviation: &str) -> bool {
        self.aliases.contains_key(&normalize_team(abbreviation))
    }

    /// Exact abbreviation match after normalizing both sides.
    pub fn matches_abbreviation(&self, opponent: &str, abbreviation: &str) -> bool {
        let target = normalize_team(opponent);
        !target.is_empty() && target == normalize_team(abbreviation)
    }

    /// Whether any alias of `opponent` appears as whole words in `full_name`,
    /// ignoring case. "NETS" does not match "Charlotte Hornets".
    pub fn matches_alias(&self, opponent: &str, full_name: &str) -> bool {
        self.aliases(opponent)
            .iter()
            .any(|alias| alias_in_name(alias, full_name))
    }

    /// Abbreviation or alias match against a single team.
    pub fn matches_team(&self, opponent: &str, abbreviation: &str, full_name: &str) -> bool {
        self.matches_abbreviation(opponent, abbreviation) || self.matches_alias(opponent, full_name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Whole-word containment: the alias's words appear consecutively in the
/// name's words. Words split on anything that is not alphanumeric.
pub fn alias_in_name(alias: &str, full_name: &str) -> bool {
    let words: Vec<String> = full_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect();
    let needle: Vec<String> = alias.split_whitespace().map(str::to_uppercase).collect();
    if needle.is_empty() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

impl Default for TeamAliasTable {
    fn default() -> Self {
        Self::nba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_synonyms() {
        assert_eq!(normalize_team("NO"), "NOP");
        assert_eq!(normalize_team(" ny "), "NYK");
        assert_eq!(normalize_team("sa"), "SAS");
        assert_eq!(normalize_team("gs"), "GSW");
        assert_eq!(normalize_team("LAL"), "LAL");
        assert_eq!(normalize_team("xyz"), "XYZ");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut tokens: Vec<&str> = SYNONYMS.iter().map(|(from, _)| *from).collect();
        tokens.extend(NBA_ALIASES.iter().map(|(abbr, _)| *abbr));
        tokens.extend(["", "  bos ", "Utah", "unknown"]);
        for t in tokens {
            let once = normalize_team(t);
            assert_eq!(normalize_team(&once), once, "not idempotent for {t:?}");
        }
    }

    #[test]
    fn synonyms_target_known_teams() {
        let table = TeamAliasTable::nba();
        assert_eq!(table.len(), 30);
        for (from, to) in SYNONYMS {
            assert!(table.contains(to), "{from} maps to unknown team {to}");
            assert!(!NBA_ALIASES.iter().any(|(abbr, _)| abbr == from));
        }
    }

    #[test]
    fn alias_lookup_is_case_insensitive() {
        let table = TeamAliasTable::nba();
        assert_eq!(table.aliases("nop"), table.aliases("NO"));
        assert!(table.aliases("NOP").iter().any(|a| a == "NEW ORLEANS"));
        assert!(table.aliases("ZZZ").is_empty());
    }

    #[test]
    fn matches_by_abbreviation_or_full_name() {
        let table = TeamAliasTable::nba();
        assert!(table.matches_team("NO", "NOP", "New Orleans Pelicans"));
        assert!(table.matches_team("NO", "NOLA", "New Orleans Pelicans"));
        assert!(table.matches_team("lal", "LAL", ""));
        assert!(table.matches_team("LAL", "XXX", "Los Angeles Lakers"));
        assert!(!table.matches_team("LAC", "LAL", "Los Angeles Lakers"));
        assert!(!table.matches_team("", "LAL", "Los Angeles Lakers"));
    }

    #[test]
    fn aliases_match_whole_words_only() {
        let table = TeamAliasTable::nba();
        assert!(!table.matches_alias("BKN", "Charlotte Hornets"));
        assert!(table.matches_alias("CHA", "Charlotte Hornets"));
        assert!(table.matches_alias("BKN", "Brooklyn Nets"));
        assert!(table.matches_alias("PHI", "Philadelphia 76ers"));
        assert!(table.matches_alias("POR", "Portland Trail-Blazers"));
        assert!(table.matches_alias("LAC", "LA Clippers"));
        assert!(!table.matches_alias("LAL", "LA Clippers"));
    }

    #[test]
    fn alias_words_must_be_consecutive() {
        assert!(alias_in_name("NEW ORLEANS", "New Orleans Pelicans"));
        assert!(!alias_in_name("NEW ORLEANS", "New York Orleans"));
        assert!(!alias_in_name("", "New Orleans Pelicans"));
        assert!(!alias_in_name("HEAT", ""));
    }
}
