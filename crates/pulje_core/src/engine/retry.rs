//! Best-of-N distribution.
//!
//! Greedy placement depends on the shuffle, so the whole pass is repeated with
//! fresh seeds and the attempt with the fewest unresolved conflicts is kept.

use super::conflicts::collect_all_conflicts;
use super::context::DistributionContext;
use super::pipeline::{distribute_scoped, DistributionMode, Scope};
use crate::models::{count_unresolved, Row};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub attempt: u32,
    pub seed: u64,
    pub unresolved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryOutcome {
    pub rows: Vec<Row>,
    pub attempts: Vec<AttemptReport>,
    /// Index into `attempts`; `None` when nothing in scope could be distributed.
    pub best_attempt: Option<usize>,
}

impl RetryOutcome {
    pub fn unresolved(&self) -> Option<usize> {
        self.best_attempt.map(|i| self.attempts[i].unresolved)
    }
}

/// Runs up to `ctx.tuning.max_attempts` passes, attempt `n` seeded with
/// `seed + n`. Stops at the first conflict-free attempt; on ties the earlier
/// attempt wins.
pub fn distribute_with_retry(
    rows: &[Row],
    mode: DistributionMode,
    scope: &Scope,
    ctx: &DistributionContext,
    seed: u64,
) -> RetryOutcome {
    if !rows.iter().any(|r| scope.contains(r) && r.is_assignable()) {
        tracing::info!(?scope, "nothing to distribute");
        return RetryOutcome { rows: rows.to_vec(), attempts: Vec::new(), best_attempt: None };
    }

    let mut attempts = Vec::new();
    let mut best: Option<(usize, Vec<Row>)> = None;
    for attempt in 0..ctx.tuning.max_attempts.max(1) {
        let attempt_seed = seed.wrapping_add(u64::from(attempt));
        let mut rng = ChaCha8Rng::seed_from_u64(attempt_seed);
        let candidate = distribute_scoped(rows, mode, scope, ctx, &mut rng);

        let in_scope: Vec<Row> = candidate.iter().filter(|r| scope.contains(r)).cloned().collect();
        let unresolved = count_unresolved(&collect_all_conflicts(&in_scope, &candidate, ctx));
        tracing::debug!(attempt, seed = attempt_seed, unresolved, "distribution attempt");
        attempts.push(AttemptReport { attempt, seed: attempt_seed, unresolved });

        let improves = best.as_ref().map_or(true, |(i, _)| unresolved < attempts[*i].unresolved);
        if improves {
            best = Some((attempts.len() - 1, candidate));
        }
        if unresolved == 0 {
            break;
        }
    }

    let (best_index, best_rows) = match best {
        Some(found) => found,
        None => return RetryOutcome { rows: rows.to_vec(), attempts, best_attempt: None },
    };
    tracing::info!(
        attempts = attempts.len(),
        best = best_index,
        unresolved = attempts[best_index].unresolved,
        "distribution finished"
    );
    RetryOutcome { rows: best_rows, attempts, best_attempt: Some(best_index) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchTuning;
    use crate::data::ReferenceData;
    use crate::engine::test_support::row_with;
    use crate::models::DistributionCriteria;

    #[test]
    fn test_best_never_worse_than_first() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![row_with("U9 5:5 — 26/10", &["OB", "OB", "OB", "B", "C", "D", "E"], 2)];
        for seed in 0..10 {
            let outcome = distribute_with_retry(&rows, DistributionMode::All, &Scope::All, &ctx, seed);
            let best = outcome.unresolved().unwrap();
            assert!(best <= outcome.attempts[0].unresolved);
            assert!(outcome.attempts.len() <= 3);
            assert!(outcome.attempts.iter().all(|a| a.unresolved >= best));
        }
    }

    #[test]
    fn test_stops_on_clean_attempt() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![row_with("U9 5:5", &["A", "B", "C", "D", "E"], 1)];
        let outcome = distribute_with_retry(&rows, DistributionMode::All, &Scope::All, &ctx, 9);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.unresolved(), Some(0));
    }

    #[test]
    fn test_nothing_assignable_returns_input() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference).with_tuning(SearchTuning { max_attempts: 5, ..Default::default() });
        let rows = vec![row_with("U9 5:5", &["A"], 0)];
        let outcome = distribute_with_retry(&rows, DistributionMode::All, &Scope::All, &ctx, 0);
        assert_eq!(outcome.rows, rows);
        assert!(outcome.attempts.is_empty());
        assert_eq!(outcome.best_attempt, None);
    }
}
