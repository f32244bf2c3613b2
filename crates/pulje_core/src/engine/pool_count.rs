//! How many pools a row should have.
//!
//! Pool sizes carry fixed costs (5 is best, then 6, 4, 7 and 3); a small
//! dynamic program finds the cheapest way to split the teams.

use crate::models::{Pool, Row};
use serde::{Deserialize, Serialize};

/// Cost per pool size, in preference order.
const SIZE_COSTS: [(usize, u32); 5] = [(5, 1), (6, 2), (4, 4), (7, 10), (3, 20)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub pool_count: usize,
    /// True when the split needs a pool of 3 or 7, or there are too few teams.
    pub has_warning: bool,
}

fn is_suboptimal(size: usize) -> bool {
    size == 3 || size == 7
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: u32,
    last_size: usize,
}

/// Cheapest decomposition of `total` into pool sizes 3-7, largest first.
/// `None` when no combination adds up (only for 1 and 2).
pub fn optimal_pool_sizes(total: usize) -> Option<Vec<usize>> {
    if total == 0 {
        return Some(Vec::new());
    }
    let mut dp: Vec<Option<Cell>> = vec![None; total + 1];
    dp[0] = Some(Cell { cost: 0, last_size: 0 });

    for i in 1..=total {
        for &(size, cost) in &SIZE_COSTS {
            if size > i {
                continue;
            }
            let Some(prev) = dp[i - size] else {
                continue;
            };
            let candidate = prev.cost + cost;
            if dp[i].map_or(true, |cell| candidate < cell.cost) {
                dp[i] = Some(Cell { cost: candidate, last_size: size });
            }
        }
    }

    dp[total]?;
    let mut sizes = Vec::new();
    let mut rest = total;
    while rest > 0 {
        let cell = dp[rest]?;
        sizes.push(cell.last_size);
        rest -= cell.last_size;
    }
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    Some(sizes)
}

pub fn optimal_pool_config(total_teams: usize) -> PoolConfig {
    if total_teams == 0 {
        return PoolConfig { pool_count: 0, has_warning: false };
    }
    if total_teams < 3 {
        return PoolConfig { pool_count: 1, has_warning: true };
    }
    match optimal_pool_sizes(total_teams) {
        Some(sizes) => PoolConfig {
            pool_count: sizes.len(),
            has_warning: sizes.iter().any(|&s| is_suboptimal(s)),
        },
        None => PoolConfig { pool_count: 1, has_warning: true },
    }
}

/// Sum of the size costs of a decomposition.
pub fn decomposition_cost(sizes: &[usize]) -> Option<u32> {
    sizes
        .iter()
        .map(|s| SIZE_COSTS.iter().find(|(size, _)| size == s).map(|(_, cost)| *cost))
        .sum()
}

/// Grows or shrinks the row's pool list towards the optimal count.
///
/// New pools get fresh ids and names `Pulje N`. Only trailing pools without
/// any team are removed, so nothing placed is ever lost.
pub fn apply_optimal_pool_count(row: &mut Row) -> PoolConfig {
    let config = optimal_pool_config(row.real_team_count());
    while row.pools.len() < config.pool_count {
        let number = row.pools.len() + 1;
        row.add_pool(Pool::new(uuid::Uuid::new_v4().to_string(), format!("Pulje {number}")));
    }
    while row.pools.len() > config.pool_count.max(1) {
        let Some(last) = row.pools.last() else { break };
        if row.teams_in_pool(&last.id).next().is_some() {
            break;
        }
        let id = last.id.clone();
        row.remove_pool(&id);
    }
    tracing::debug!(
        row = %row.id,
        pools = row.pools.len(),
        target = config.pool_count,
        warning = config.has_warning,
        "pool count applied"
    );
    config
}
