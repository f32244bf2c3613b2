//! Fixture-key assignment.
//!
//! Every team in a pool gets a 1-based key indexing the pool's meeting matrix.
//! Two teams of one club are best placed on a key pair that never meets.

use super::context::DistributionContext;
use crate::models::{FixtureTemplate, Row, Team, TemplateLibrary};
use std::collections::HashSet;

/// Key with most matches in the template: the host plays the most at home.
///
/// Ties go to the lowest key; a template where every key plays equally often
/// yields key 2.
pub fn best_host_key(template: &FixtureTemplate) -> u32 {
    let sums = template.row_sums();
    let (Some(&max), Some(&min)) = (sums.iter().max(), sums.iter().min()) else {
        return 1;
    };
    if max == min {
        return if template.size >= 2 { 2 } else { 1 };
    }
    sums.iter().position(|&s| s == max).map_or(1, |i| i as u32 + 1)
}

/// Key reserved for the host of a pool using `template`.
pub fn host_key(template: &FixtureTemplate, use_host_match_logic: bool, custom_override: Option<u32>) -> u32 {
    if let Some(key) = custom_override.filter(|k| (1..=template.size as u32).contains(k)) {
        return key;
    }
    if use_host_match_logic {
        best_host_key(template)
    } else {
        1
    }
}

/// Every team holds a distinct key within `1..=teams.len()`.
pub fn has_valid_keys(teams: &[Team]) -> bool {
    let size = teams.len() as u32;
    let mut seen = HashSet::with_capacity(teams.len());
    teams.iter().all(|t| matches!(t.foda_key, Some(k) if (1..=size).contains(&k) && seen.insert(k)))
}

/// Assigns keys to the teams of one pool, returned in input order.
///
/// A complete valid key set is left untouched. Otherwise pinned keys are kept,
/// the host gets its reserved key and the rest fill the free keys in the order
/// of their previous key (teams without one last).
pub fn resolve_keys(
    pool_teams: &[Team],
    use_host_match_logic: bool,
    template: &FixtureTemplate,
    host_key_override: Option<u32>,
) -> Vec<Team> {
    let size = pool_teams.len();
    if size == 0 || has_valid_keys(pool_teams) {
        return pool_teams.to_vec();
    }

    let mut teams = pool_teams.to_vec();
    let mut taken = vec![false; size + 1];
    let mut done = vec![false; size];

    for (i, team) in teams.iter().enumerate() {
        if !team.is_pinned {
            continue;
        }
        if let Some(key) = team.foda_key.map(|k| k as usize) {
            if (1..=size).contains(&key) && !taken[key] {
                taken[key] = true;
                done[i] = true;
            }
        }
    }

    if let Some(i) = (0..size).find(|&i| teams[i].is_host && !done[i]) {
        let preferred = host_key(template, use_host_match_logic, host_key_override) as usize;
        let key = if (1..=size).contains(&preferred) && !taken[preferred] {
            Some(preferred)
        } else {
            (1..=size).find(|&k| !taken[k])
        };
        if let Some(key) = key {
            taken[key] = true;
            done[i] = true;
            teams[i].foda_key = Some(key as u32);
        }
    }

    let mut rest: Vec<usize> = (0..size).filter(|&i| !done[i]).collect();
    rest.sort_by_key(|&i| (teams[i].foda_key.is_none(), teams[i].foda_key.unwrap_or(0)));
    let free: Vec<usize> = (1..=size).filter(|&k| !taken[k]).collect();
    for (i, key) in rest.into_iter().zip(free) {
        teams[i].foda_key = Some(key as u32);
    }
    teams
}

/// Same as [`resolve_keys`], looking the template up by name with the size
/// fallback of the library.
pub fn resolve_keys_with_library(
    pool_teams: &[Team],
    use_host_match_logic: bool,
    template_key: Option<&str>,
    library: &TemplateLibrary,
) -> Vec<Team> {
    let resolved = library.resolve(template_key, pool_teams.len());
    let custom = library.host_key_override(resolved.name.as_deref());
    resolve_keys(pool_teams, use_host_match_logic, &resolved.template, custom)
}

/// Key pairs `(a, b)`, `a < b`, that never meet in the template.
pub fn find_all_non_intersecting_pairs(template: &FixtureTemplate) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for i in 0..template.size {
        for j in (i + 1)..template.size {
            if template.matrix[i][j] == 0 {
                pairs.push((i as u32 + 1, j as u32 + 1));
            }
        }
    }
    pairs
}

/// Resolves keys for every pool of a row in place.
pub fn resolve_row_keys(row: &mut Row, ctx: &DistributionContext) {
    for pool in row.pools.clone() {
        let indices: Vec<usize> = (0..row.teams.len()).filter(|&i| row.teams[i].is_in(&pool.id)).collect();
        if indices.is_empty() {
            continue;
        }
        let pool_teams: Vec<Team> = indices.iter().map(|&i| row.teams[i].clone()).collect();
        let use_host_match_logic = ctx.effective(&pool).use_host_match_logic;
        let resolved =
            resolve_keys_with_library(&pool_teams, use_host_match_logic, pool.template_key.as_deref(), &ctx.reference.templates);
        for (i, team) in indices.into_iter().zip(resolved) {
            row.teams[i] = team;
        }
    }
}
