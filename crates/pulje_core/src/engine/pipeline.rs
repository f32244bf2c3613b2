//! One distribution pass: shuffle, hosts, teams, geography, keys.

use super::context::DistributionContext;
use super::distributor::distribute_teams;
use super::geo::optimize_geography;
use super::host::{collect_host_records, select_hosts};
use super::keys::resolve_row_keys;
use crate::models::{Row, RowId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// Start over: every unpinned team is released first.
    #[default]
    All,
    /// Keep current placements, place only the teams without a pool.
    Unassigned,
}

/// Rows a distribution touches and whose conflicts count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Scope {
    #[default]
    All,
    Row { row_id: RowId },
}

impl Scope {
    pub fn row(row_id: impl Into<RowId>) -> Self {
        Scope::Row { row_id: row_id.into() }
    }

    pub fn contains(&self, row: &Row) -> bool {
        match self {
            Scope::All => true,
            Scope::Row { row_id } => *row_id == row.id,
        }
    }
}

/// Distributes one row and returns the new version. `all_rows` supplies the
/// hosts of the other rows; its copy of this row is ignored.
///
/// A row without teams or pools comes back unchanged.
pub fn distribute_row<R: Rng + ?Sized>(
    row: &Row,
    all_rows: &[Row],
    mode: DistributionMode,
    ctx: &DistributionContext,
    rng: &mut R,
) -> Row {
    let mut row = row.clone();
    if !row.is_assignable() {
        return row;
    }
    if mode == DistributionMode::All {
        row.teams.iter_mut().for_each(|t| t.reset_placement());
    }
    let movable: Vec<bool> = row.teams.iter().map(|t| !t.is_placed()).collect();

    let mut order: Vec<usize> = (0..row.teams.len()).collect();
    order.shuffle(rng);

    let mut hosts = collect_host_records(all_rows, Some(&row.id));
    hosts.extend(collect_host_records(std::slice::from_ref(&row), None));
    select_hosts(&mut row, &order, &mut hosts, ctx);
    distribute_teams(&mut row, &order, ctx);
    optimize_geography(&mut row, &movable, ctx);
    resolve_row_keys(&mut row, ctx);

    tracing::debug!(
        row = %row.id,
        teams = row.teams.len(),
        pools = row.pools.len(),
        placed = row.teams.iter().filter(|t| t.is_placed()).count(),
        "row distributed"
    );
    row
}

/// Distributes the rows in `scope`, one after the other, so every row sees
/// the hosts picked for the rows before it. Rows outside the scope are
/// returned as they are.
pub fn distribute_scoped<R: Rng + ?Sized>(
    rows: &[Row],
    mode: DistributionMode,
    scope: &Scope,
    ctx: &DistributionContext,
    rng: &mut R,
) -> Vec<Row> {
    let mut working = rows.to_vec();
    if mode == DistributionMode::All {
        // Old hosts of rows about to be redistributed must not steer the filters
        for row in working.iter_mut().filter(|r| scope.contains(r) && r.is_assignable()) {
            row.teams.iter_mut().for_each(|t| t.reset_placement());
        }
    }
    for i in 0..working.len() {
        if !scope.contains(&working[i]) {
            continue;
        }
        let next = distribute_row(&working[i], &working, mode, ctx, rng);
        working[i] = next;
    }
    working
}

pub fn distribute_all<R: Rng + ?Sized>(
    rows: &[Row],
    mode: DistributionMode,
    ctx: &DistributionContext,
    rng: &mut R,
) -> Vec<Row> {
    distribute_scoped(rows, mode, &Scope::All, ctx, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceData;
    use crate::engine::test_support::row_with;
    use crate::models::{DistributionCriteria, Pool, Team};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_every_team_placed_once() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let row = row_with("U9 5:5 — 26/10", &["A", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J"], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let out = distribute_row(&row, &[row.clone()], DistributionMode::All, &ctx, &mut rng);

        assert!(out.teams.iter().all(|t| t.is_placed()));
        let ids: HashSet<_> = out.teams.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), out.teams.len());
        for pool in &out.pools {
            assert_eq!(out.teams_in_pool(&pool.id).filter(|t| t.is_host).count(), 1);
            let keys: HashSet<_> = out.teams_in_pool(&pool.id).map(|t| t.foda_key).collect();
            assert_eq!(keys.len(), out.teams_in_pool(&pool.id).count());
        }
    }

    #[test]
    fn test_malformed_row_is_noop() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let row = row_with("U9 5:5", &["A", "B"], 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(distribute_row(&row, &[], DistributionMode::All, &ctx, &mut rng), row);
    }

    #[test]
    fn test_pinned_team_stays() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B", "C", "D", "E", "F"], 2);
        row.teams[5] = row.teams[5].clone().in_pool("p2").as_host().pinned().with_key(1);
        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = distribute_row(&row, &[], DistributionMode::All, &ctx, &mut rng);
            assert_eq!(out.teams[5], row.teams[5]);
            assert_eq!(out.teams_in_pool("p2").filter(|t| t.is_host).count(), 1);
        }
    }

    #[test]
    fn test_unassigned_mode_keeps_placements() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B", "C", "D"], 2);
        row.teams[0].pool_id = Some("p2".into());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = distribute_row(&row, &[], DistributionMode::Unassigned, &ctx, &mut rng);
        assert_eq!(out.teams[0].pool_id.as_deref(), Some("p2"));
        assert!(out.teams.iter().all(|t| t.is_placed()));
    }

    #[test]
    fn test_organizer_pools_have_no_host() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B", "C", "D", "E", "F"], 1);
        row.add_pool(Pool::new("p2", "Pulje 2").organized_by("Arrangør"));
        row.teams.push(Team::bye("bye"));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let out = distribute_row(&row, &[], DistributionMode::All, &ctx, &mut rng);
        assert_eq!(out.teams_in_pool("p1").filter(|t| t.is_host).count(), 1);
        assert_eq!(out.teams_in_pool("p2").filter(|t| t.is_host).count(), 0);
        assert!(out.teams.iter().filter(|t| t.is_bye).all(|t| !t.is_host));
    }

    #[test]
    fn test_scope_leaves_other_rows_alone() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut first = row_with("U9 5:5", &["A", "B", "C"], 1);
        first.id = "r1".into();
        let mut second = row_with("U10 5:5", &["D", "E", "F"], 1);
        second.id = "r2".into();
        let rows = vec![first, second];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let out = distribute_scoped(&rows, DistributionMode::All, &Scope::row("r2"), &ctx, &mut rng);
        assert_eq!(out[0], rows[0]);
        assert!(out[1].teams.iter().all(|t| t.is_placed()));
    }

    #[test]
    fn test_same_seed_same_result() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![row_with("U9 5:5 — 26/10", &["A", "B", "C", "D", "E", "F", "G", "H", "I"], 2)];
        let a = distribute_all(&rows, DistributionMode::All, &ctx, &mut ChaCha8Rng::seed_from_u64(42));
        let b = distribute_all(&rows, DistributionMode::All, &ctx, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
