//! Name-based matching of provider records onto internal rows.
//!
//! Rules, tried in order:
//! 1. exact case-insensitive full name
//! 2. internal name contains the first word of the external name
//! 3. external name contains the internal name
//! 4. short code (three-letter abbreviation) matches exactly
//!
//! A rule only resolves when it yields exactly one candidate. A rule that
//! yields several is remembered and the next rule is tried; if no later rule
//! is unique, the first ambiguity is reported instead of guessing.

use serde::Serialize;
use std::fmt;

use crate::storage::{Player, Team};
use crate::{PlayerId, TeamId};

/// A row that can be matched by name
pub trait Reconcilable {
    type Key: Copy + Eq;

    fn key(&self) -> Self::Key;
    fn name(&self) -> &str;
    fn short_code(&self) -> Option<&str> {
        None
    }
}

impl Reconcilable for Team {
    type Key = TeamId;

    fn key(&self) -> TeamId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn short_code(&self) -> Option<&str> {
        Some(&self.short_name)
    }
}

impl Reconcilable for Player {
    type Key = PlayerId;

    fn key(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// How a match was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Explicit provider mapping table entry
    Mapping,
    ExactName,
    FirstWord,
    ExternalContainsInternal,
    ShortCode,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchRule::Mapping => "mapping",
            MatchRule::ExactName => "exact_name",
            MatchRule::FirstWord => "first_word",
            MatchRule::ExternalContainsInternal => "external_contains_internal",
            MatchRule::ShortCode => "short_code",
        };
        f.write_str(s)
    }
}

/// Result of matching one external record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<K> {
    Matched { key: K, rule: MatchRule },
    Ambiguous { rule: MatchRule, candidates: Vec<K> },
    Unmatched,
}

impl<K> MatchOutcome<K> {
    pub fn key(&self) -> Option<&K> {
        match self {
            MatchOutcome::Matched { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Every name rule, in the order they are tried
pub const HEURISTIC_RULES: [MatchRule; 4] = [
    MatchRule::ExactName,
    MatchRule::FirstWord,
    MatchRule::ExternalContainsInternal,
    MatchRule::ShortCode,
];

/// Match an external name (and optional short code) against `candidates`.
pub fn match_by_name<T: Reconcilable>(
    external_name: &str,
    external_code: Option<&str>,
    candidates: &[T],
) -> MatchOutcome<T::Key> {
    match_with_rules(external_name, external_code, candidates, &HEURISTIC_RULES)
}

/// Like [`match_by_name`], trying only `rules`, in the order given.
pub fn match_with_rules<T: Reconcilable>(
    external_name: &str,
    external_code: Option<&str>,
    candidates: &[T],
    rules: &[MatchRule],
) -> MatchOutcome<T::Key> {
    let external = normalize(external_name);
    let code = external_code.map(normalize).filter(|c| !c.is_empty());
    let first_word = external.split_whitespace().next().unwrap_or("").to_string();

    let mut first_ambiguity: Option<(MatchRule, Vec<T::Key>)> = None;

    for &rule in rules {
        let mut keys: Vec<T::Key> = Vec::new();
        for candidate in candidates {
            let internal = normalize(candidate.name());
            let hit = match rule {
                MatchRule::ExactName => !external.is_empty() && internal == external,
                MatchRule::FirstWord => !first_word.is_empty() && internal.contains(&first_word),
                MatchRule::ExternalContainsInternal => {
                    !internal.is_empty() && external.contains(&internal)
                }
                MatchRule::ShortCode => match (&code, candidate.short_code()) {
                    (Some(code), Some(short)) => normalize(short) == *code,
                    _ => false,
                },
                MatchRule::Mapping => false,
            };
            if hit && !keys.contains(&candidate.key()) {
                keys.push(candidate.key());
            }
        }

        match keys.len() {
            0 => continue,
            1 => {
                return MatchOutcome::Matched { key: keys[0], rule };
            }
            _ => {
                if first_ambiguity.is_none() {
                    first_ambiguity = Some((rule, keys));
                }
            }
        }
    }

    match first_ambiguity {
        Some((rule, candidates)) => MatchOutcome::Ambiguous { rule, candidates },
        None => MatchOutcome::Unmatched,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, name: &str, short: &str) -> Team {
        Team {
            id: TeamId::new(id),
            name: name.to_string(),
            short_name: short.to_string(),
            color: None,
            logo_url: None,
        }
    }

    fn league() -> Vec<Team> {
        vec![
            team(1, "Arsenal", "ARS"),
            team(2, "Manchester City", "MCI"),
            team(3, "Manchester United", "MUN"),
            team(4, "Tottenham Hotspur", "TOT"),
            team(5, "Wolverhampton Wanderers", "WOL"),
            team(6, "Nottingham Forest", "NFO"),
        ]
    }

    #[test]
    fn test_exact_name_wins_first() {
        let teams = league();
        let outcome = match_by_name("manchester city", Some("MUN"), &teams);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                key: TeamId::new(2),
                rule: MatchRule::ExactName
            }
        );
    }

    #[test]
    fn test_first_word_rule() {
        let teams = league();
        let outcome = match_by_name("Tottenham", None, &teams);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                key: TeamId::new(4),
                rule: MatchRule::FirstWord
            }
        );
    }

    #[test]
    fn test_external_contains_internal_rule() {
        let teams = league();
        // "manchester" hits both Manchester clubs under rule 2, rule 3 is unique
        let outcome = match_by_name("Manchester United FC", None, &teams);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                key: TeamId::new(3),
                rule: MatchRule::ExternalContainsInternal
            }
        );
    }

    #[test]
    fn test_short_code_rule() {
        let teams = league();
        let outcome = match_by_name("Wolves", Some("wol"), &teams);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                key: TeamId::new(5),
                rule: MatchRule::ShortCode
            }
        );
    }

    #[test]
    fn test_ambiguity_is_reported_not_guessed() {
        let teams = league();
        let outcome = match_by_name("Manchester", None, &teams);
        assert_eq!(
            outcome,
            MatchOutcome::Ambiguous {
                rule: MatchRule::FirstWord,
                candidates: vec![TeamId::new(2), TeamId::new(3)]
            }
        );
        assert!(outcome.key().is_none());
    }

    #[test]
    fn test_unmatched() {
        let teams = league();
        assert_eq!(
            match_by_name("Sunderland AFC", Some("SUN"), &teams),
            MatchOutcome::Unmatched
        );
        assert_eq!(match_by_name("", None, &teams), MatchOutcome::Unmatched);
    }

    #[test]
    fn test_order_of_candidates_does_not_matter_for_exact_match() {
        let mut teams = league();
        teams.reverse();
        let outcome = match_by_name("ARSENAL", None, &teams);
        assert_eq!(outcome.key(), Some(&TeamId::new(1)));
    }
}
