//! Club-submitted wishes ("ønsker") and their classified rule type.

use super::club::{normalize_club, same_club};
use super::row::{Gender, RowMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    ForceHost,
    AvoidHost,
    SamePool,
    SameLocation,
    AvoidClub,
    Obs,
    #[default]
    Unknown,
}

impl RuleType {
    /// Rule types the engine acts on; `Obs` and `Unknown` are notes only.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, RuleType::Obs | RuleType::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    pub id: String,
    pub club: String,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub koen: Option<Gender>,
    #[serde(default)]
    pub niveauer: Vec<String>,
    #[serde(default)]
    pub kategori: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub rule_type: RuleType,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: i32,
    /// Clubs named by the wish, filled by the classifier.
    #[serde(default)]
    pub target_clubs: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl Wish {
    pub fn new(id: impl Into<String>, club: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            id: id.into(),
            club: club.into(),
            age: None,
            koen: None,
            niveauer: Vec::new(),
            kategori: None,
            text: String::new(),
            contact: String::new(),
            rule_type,
            is_active: true,
            priority: 0,
            target_clubs: Vec::new(),
        }
    }

    pub fn for_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn targeting(mut self, club: impl Into<String>) -> Self {
        self.target_clubs.push(club.into());
        self
    }

    /// Loose filter match: a missing dimension on the wish matches every row,
    /// a present one requires the row to carry the same value.
    pub fn applies_to(&self, meta: &RowMeta) -> bool {
        if let Some(age) = &self.age {
            match &meta.age_group {
                Some(row_age) if row_age.eq_ignore_ascii_case(age.trim()) => {}
                _ => return false,
            }
        }
        if let Some(gender) = self.koen {
            if meta.gender != Some(gender) {
                return false;
            }
        }
        if !self.niveauer.is_empty() {
            let Some(level) = &meta.level else {
                return false;
            };
            if !self.niveauer.iter().any(|n| n.trim().eq_ignore_ascii_case(level)) {
                return false;
            }
        }
        true
    }

    pub fn is_from(&self, club: &str) -> bool {
        same_club(&self.club, club)
    }

    /// Whether the wish names `club`, via the classifier output or the raw text.
    pub fn references_club(&self, club: &str) -> bool {
        if self.target_clubs.iter().any(|c| same_club(c, club)) {
            return true;
        }
        let needle = normalize_club(club);
        !needle.is_empty() && contains_word(&normalize_club(&self.text), &needle)
    }

    /// Named clubs, or the wishing club itself when none are named.
    pub fn targets_or_self(&self) -> Vec<String> {
        if self.target_clubs.is_empty() {
            vec![self.club.clone()]
        } else {
            self.target_clubs.clone()
        }
    }
}

/// Word-boundary substring search so "OB" does not match inside "Skovbo".
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

/// Active wishes of `club` applying to a row, optionally of one rule type.
pub fn applicable_wishes<'a>(
    wishes: &'a [Wish],
    club: &'a str,
    meta: &'a RowMeta,
) -> impl Iterator<Item = &'a Wish> + 'a {
    wishes.iter().filter(move |w| w.is_active && w.is_from(club) && w.applies_to(meta))
}

pub fn has_rule(wishes: &[Wish], club: &str, meta: &RowMeta, rule: RuleType) -> bool {
    applicable_wishes(wishes, club, meta).any(|w| w.rule_type == rule)
}

/// Wishes grouped by `kategori`, each group ordered by priority.
pub fn group_by_kategori(wishes: &[Wish]) -> Vec<(Option<String>, Vec<&Wish>)> {
    let mut groups: Vec<(Option<String>, Vec<&Wish>)> = Vec::new();
    for wish in wishes {
        match groups.iter_mut().find(|(k, _)| *k == wish.kategori) {
            Some((_, list)) => list.push(wish),
            None => groups.push((wish.kategori.clone(), vec![wish])),
        }
    }
    for (_, list) in groups.iter_mut() {
        list.sort_by_key(|w| w.priority);
    }
    groups
}
