//! Turning free-text wishes into rule types.
//!
//! The engine only needs `rule_type` and `target_clubs` on each wish; how they
//! are derived is up to the [`WishClassifier`] in use.

pub mod keyword;

pub use keyword::KeywordClassifier;

use crate::models::{RuleType, Wish};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub rule_type: RuleType,
    /// Known clubs named in the text, in order of appearance.
    pub target_clubs: Vec<String>,
}

pub trait WishClassifier {
    fn classify(&self, text: &str, known_clubs: &[String]) -> Classification;
}

/// Classifies the wishes still marked `Unknown`, or all of them with `force`.
/// The wishing club itself is never listed as a target. Returns how many
/// wishes changed.
pub fn classify_wishes(
    wishes: &mut [Wish],
    classifier: &dyn WishClassifier,
    known_clubs: &[String],
    force: bool,
) -> usize {
    let mut changed = 0;
    for wish in wishes.iter_mut().filter(|w| force || w.rule_type == RuleType::Unknown) {
        let mut result = classifier.classify(&wish.text, known_clubs);
        result.target_clubs.retain(|c| !wish.is_from(c));
        if result.rule_type != wish.rule_type || result.target_clubs != wish.target_clubs {
            wish.rule_type = result.rule_type;
            wish.target_clubs = result.target_clubs;
            changed += 1;
        }
    }
    tracing::info!(total = wishes.len(), changed, "wishes classified");
    changed
}
