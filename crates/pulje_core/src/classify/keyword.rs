//! Keyword classifier for Danish wish texts.

use super::{Classification, WishClassifier};
use crate::models::{normalize_club, RuleType};

/// Phrases checked in order; the first whole-word hit decides the rule type.
const RULES: &[(RuleType, &[&str])] = &[
    (
        RuleType::AvoidHost,
        &["ikke vært", "ikke være vært", "ønsker ikke at være vært", "kan ikke være vært", "ingen værtskab", "not host"],
    ),
    (
        RuleType::AvoidClub,
        &["ikke i pulje med", "ikke i samme pulje", "undgå", "ikke mod", "ikke møde", "ikke spille mod", "avoid"],
    ),
    (RuleType::SamePool, &["samme pulje", "sammen med", "same pool"]),
    (RuleType::SameLocation, &["samme sted", "samme spillested", "samme lokation", "same location"]),
    (RuleType::ForceHost, &["vil gerne være vært", "ønsker at være vært", "skal være vært", "vært", "host"]),
    (RuleType::Obs, &["obs", "bemærk", "note"]),
];

/// Phrase matching on the lowercased text. Club names are found as whole
/// words among the known clubs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn rule_type(text: &str) -> RuleType {
        RULES
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|p| word_position(text, p).is_some()))
            .map_or(RuleType::Unknown, |(rule, _)| *rule)
    }

    fn named_clubs(text: &str, known_clubs: &[String]) -> Vec<String> {
        let mut found: Vec<(usize, &String)> = known_clubs
            .iter()
            .filter_map(|club| {
                let needle = normalize_club(club);
                if needle.is_empty() {
                    return None;
                }
                word_position(text, &needle).map(|pos| (pos, club))
            })
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        let mut clubs: Vec<String> = Vec::new();
        for (_, club) in found {
            if !clubs.iter().any(|c| normalize_club(c) == normalize_club(club)) {
                clubs.push(club.clone());
            }
        }
        clubs
    }
}

fn word_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(start, _)| start).find(|&start| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

impl WishClassifier for KeywordClassifier {
    fn classify(&self, text: &str, known_clubs: &[String]) -> Classification {
        let text = normalize_club(text);
        if text.is_empty() {
            return Classification::default();
        }
        Classification { rule_type: Self::rule_type(&text), target_clubs: Self::named_clubs(&text, known_clubs) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clubs() -> Vec<String> {
        ["OB", "B93", "Skovbo IF", "Fremad Amager"].iter().map(|s| s.to_string()).collect()
    }

    fn classify(text: &str) -> Classification {
        KeywordClassifier::new().classify(text, &clubs())
    }

    #[test]
    fn test_rule_types() {
        assert_eq!(classify("Vi vil gerne være vært").rule_type, RuleType::ForceHost);
        assert_eq!(classify("Vi kan ikke være vært denne gang").rule_type, RuleType::AvoidHost);
        assert_eq!(classify("Ikke i pulje med B93").rule_type, RuleType::AvoidClub);
        assert_eq!(classify("Begge hold i samme pulje").rule_type, RuleType::SamePool);
        assert_eq!(classify("Skal spille samme sted som Skovbo IF").rule_type, RuleType::SameLocation);
        assert_eq!(classify("OBS: træner er syg").rule_type, RuleType::Obs);
        assert_eq!(classify("Tak for sidst").rule_type, RuleType::Unknown);
        assert_eq!(classify("").rule_type, RuleType::Unknown);
    }

    #[test]
    fn test_phrases_match_whole_words() {
        assert_eq!(classify("Ghost denote").rule_type, RuleType::Unknown);
        assert_eq!(classify("Jobs i weekenden").rule_type, RuleType::Unknown);
        assert_eq!(classify("We can host").rule_type, RuleType::ForceHost);
    }

    #[test]
    fn test_named_clubs_in_text_order() {
        let result = classify("Undgå Fremad Amager og B93");
        assert_eq!(result.rule_type, RuleType::AvoidClub);
        assert_eq!(result.target_clubs, vec!["Fremad Amager".to_string(), "B93".to_string()]);
    }

    #[test]
    fn test_club_names_need_word_boundaries() {
        // "ob" inside "skovbo" is not OB
        assert_eq!(classify("Samme sted som Skovbo IF").target_clubs, vec!["Skovbo IF".to_string()]);
    }
}
