//! Distribution engine: pool count, hosts, placement, geography, keys,
//! conflict evaluation, retries and remediation.

pub mod conflicts;
pub mod context;
pub mod distributor;
pub mod filter_chain;
pub mod geo;
pub mod host;
pub mod keys;
pub mod pipeline;
pub mod pool_count;
pub mod remediation;
pub mod retry;

pub use conflicts::{collect_all_conflicts, host_signature, prune_ignores};
pub use context::DistributionContext;
pub use distributor::distribute_teams;
pub use filter_chain::{narrow, narrow_all, Narrowing};
pub use geo::optimize_geography;
pub use host::{collect_host_records, select_hosts, HostRecord};
pub use keys::{
    best_host_key, find_all_non_intersecting_pairs, has_valid_keys, resolve_keys, resolve_keys_with_library,
    resolve_row_keys,
};
pub use pipeline::{distribute_all, distribute_row, distribute_scoped, DistributionMode, Scope};
pub use pool_count::{apply_optimal_pool_count, optimal_pool_config, optimal_pool_sizes, PoolConfig};
pub use remediation::{apply_remediation, suggest_remediations, KeyAssignment, Remediation};
pub use retry::{distribute_with_retry, AttemptReport, RetryOutcome};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Pool, Row, Team};

    /// Row `row` with one team per club (`t0`, `t1`, ...) and pools `p1..=pN`.
    pub fn row_with(name: &str, clubs: &[&str], pools: usize) -> Row {
        let mut row = Row::new("row", name);
        for (i, club) in clubs.iter().enumerate() {
            row.teams.push(Team::new(format!("t{i}"), format!("{club} {}", i + 1), *club));
        }
        for n in 1..=pools {
            row.add_pool(Pool::new(format!("p{n}"), format!("Pulje {n}")));
        }
        row
    }
}
