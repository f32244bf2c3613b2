//! Suggested fixes for conflicts, and applying them.
//!
//! Suggestions are deterministic: the same rows and conflict always yield the
//! same list in the same order.

use super::conflicts::host_signature;
use super::context::DistributionContext;
use super::keys::{find_all_non_intersecting_pairs, has_valid_keys, resolve_row_keys};
use crate::error::{CoreError, Result};
use crate::models::{
    same_club, Conflict, ConflictKind, HostedPool, IgnoreKey, IgnoreList, PoolId, Row, RowId,
    RuleType, TeamId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most key reassignments offered for one duplication.
const MAX_KEY_OPTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAssignment {
    pub team_id: TeamId,
    pub key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Remediation {
    /// New keys for some teams of one pool; teams not listed keep theirs.
    ReassignKeys { row_id: RowId, pool_id: PoolId, assignments: Vec<KeyAssignment> },
    MoveTeam { row_id: RowId, team_id: TeamId, to_pool: PoolId },
    ReassignHost { row_id: RowId, pool_id: PoolId, team_id: TeamId },
    /// Accept the conflict for the current host set.
    Ignore { key: IgnoreKey, hosts: Vec<HostedPool> },
}

impl Remediation {
    pub fn describe(&self) -> String {
        match self {
            Remediation::ReassignKeys { pool_id, assignments, .. } => {
                let keys: Vec<String> = assignments.iter().map(|a| format!("{}→{}", a.team_id, a.key)).collect();
                format!("reassign keys in {pool_id}: {}", keys.join(", "))
            }
            Remediation::MoveTeam { team_id, to_pool, .. } => format!("move {team_id} to {to_pool}"),
            Remediation::ReassignHost { pool_id, team_id, .. } => format!("make {team_id} host of {pool_id}"),
            Remediation::Ignore { key, .. } => format!("ignore {key:?}"),
        }
    }
}

/// Key changes that put `pair` on keys `(a, b)` by swapping with the current
/// holders. `None` when a pinned team would have to change.
fn key_option(row: &Row, pool_id: &str, pair: (&str, &str), keys: (u32, u32)) -> Option<Vec<KeyAssignment>> {
    let members: Vec<_> = row.teams_in_pool(pool_id).collect();
    let mut current: BTreeMap<&str, u32> = members.iter().filter_map(|t| Some((t.id.as_str(), t.foda_key?))).collect();
    let original = current.clone();

    for (team, key) in [(pair.0, keys.0), (pair.1, keys.1)] {
        let old = *current.get(team)?;
        if let Some(holder) = current.iter().find(|(id, k)| **k == key && **id != team).map(|(id, _)| *id) {
            current.insert(holder, old);
        }
        current.insert(team, key);
    }

    let mut changes = Vec::new();
    for team in &members {
        let (Some(before), Some(after)) = (original.get(team.id.as_str()), current.get(team.id.as_str())) else {
            continue;
        };
        if before != after {
            if team.is_pinned {
                return None;
            }
            changes.push(KeyAssignment { team_id: team.id.clone(), key: *after });
        }
    }
    Some(changes)
}

fn key_options(row: &Row, pool_id: &str, team_ids: &[TeamId], ctx: &DistributionContext) -> Vec<Remediation> {
    let Some(pool) = row.pool(pool_id) else {
        return Vec::new();
    };
    let members: Vec<_> = row.teams_in_pool(pool_id).cloned().collect();
    if team_ids.len() != 2 || !has_valid_keys(&members) {
        return Vec::new();
    }
    let template = ctx.template_for(row, pool).template;
    let pair = (team_ids[0].as_str(), team_ids[1].as_str());

    let mut options: Vec<Vec<KeyAssignment>> = Vec::new();
    for (a, b) in find_all_non_intersecting_pairs(&template) {
        let best = [key_option(row, pool_id, pair, (a, b)), key_option(row, pool_id, pair, (b, a))]
            .into_iter()
            .flatten()
            .min_by_key(|changes| changes.len());
        if let Some(changes) = best {
            if !options.contains(&changes) {
                options.push(changes);
            }
        }
    }
    options.sort_by_key(|changes| changes.len());
    options
        .into_iter()
        .take(MAX_KEY_OPTIONS)
        .map(|assignments| Remediation::ReassignKeys {
            row_id: row.id.clone(),
            pool_id: pool_id.to_string(),
            assignments,
        })
        .collect()
}

/// Moves of `team_id` to every other pool holding neither of `clubs`.
fn move_options(row: &Row, team_id: &str, clubs: &[&str]) -> Vec<Remediation> {
    let Some(team) = row.team(team_id) else {
        return Vec::new();
    };
    if team.is_host || team.is_pinned {
        return Vec::new();
    }
    row.pools
        .iter()
        .filter(|p| !team.is_in(&p.id))
        .filter(|p| !row.teams_in_pool(&p.id).any(|t| !t.is_bye && clubs.iter().any(|c| same_club(c, &t.club))))
        .map(|p| Remediation::MoveTeam { row_id: row.id.clone(), team_id: team_id.to_string(), to_pool: p.id.clone() })
        .collect()
}

fn host_options(row: &Row, pool_id: &str, rows: &[Row], ctx: &DistributionContext) -> Vec<Remediation> {
    let Some(pool) = row.pool(pool_id) else {
        return Vec::new();
    };
    let Some(host) = row.host_of(pool_id) else {
        return Vec::new();
    };
    if pool.is_organizer_mode() || host.is_pinned {
        return Vec::new();
    }
    let meta = row.meta();
    let date = meta.date;
    let busy = |club: &str| {
        rows.iter().filter(|r| r.id != row.id).any(|r| {
            r.date().zip(date).is_some_and(|(a, b)| a.same_day(&b))
                && r.pools.iter().any(|p| r.host_of(&p.id).is_some_and(|h| same_club(&h.club, club)))
        })
    };
    row.teams_in_pool(pool_id)
        .filter(|t| !t.is_bye && !t.is_host && !same_club(&t.club, &host.club))
        .filter(|t| !ctx.has_rule(&t.club, &meta, RuleType::AvoidHost) && !busy(&t.club))
        .map(|t| Remediation::ReassignHost { row_id: row.id.clone(), pool_id: pool_id.to_string(), team_id: t.id.clone() })
        .collect()
}

fn ignore_key(kind: &ConflictKind) -> Option<IgnoreKey> {
    match kind {
        ConflictKind::HostDate { club, date, .. } => Some(IgnoreKey::host_date(club, date)),
        ConflictKind::HostPrevious { club, row_name, .. } => Some(IgnoreKey::host_previous(club, row_name)),
        ConflictKind::HostMultiPool { club, .. } => Some(IgnoreKey::host_multi_pool(club)),
        ConflictKind::BaneCapacity { club, date, format, .. } => Some(IgnoreKey::bane_capacity(club, date, *format)),
        ConflictKind::ClubDuplication { .. } | ConflictKind::AvoidClub { .. } => None,
    }
}

/// Fixes worth offering for `conflict`, most direct first.
pub fn suggest_remediations(conflict: &Conflict, rows: &[Row], ctx: &DistributionContext) -> Vec<Remediation> {
    let Some(row) = rows.iter().find(|r| r.id == conflict.row_id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    match &conflict.kind {
        ConflictKind::ClubDuplication { club, team_ids, .. } => {
            out.extend(key_options(row, &conflict.pool_id, team_ids, ctx));
            if let Some(mover) = team_ids.iter().rev().find(|id| row.team(id).is_some_and(|t| !t.is_host && !t.is_pinned)) {
                out.extend(move_options(row, mover, &[club.as_str()]));
            }
        }
        ConflictKind::AvoidClub { club, avoided_club, team_id, .. } => {
            out.extend(move_options(row, team_id, &[club.as_str(), avoided_club.as_str()]));
        }
        ConflictKind::HostDate { .. } | ConflictKind::HostPrevious { .. } | ConflictKind::HostMultiPool { .. } => {
            out.extend(host_options(row, &conflict.pool_id, rows, ctx));
        }
        ConflictKind::BaneCapacity { .. } => {}
    }
    if let Some(key) = ignore_key(&conflict.kind) {
        let hosts = host_signature(&key, rows, ctx);
        out.push(Remediation::Ignore { key, hosts });
    }
    out
}

fn row_index(rows: &[Row], row_id: &str) -> Result<usize> {
    rows.iter().position(|r| r.id == row_id).ok_or_else(|| CoreError::NotFound(format!("row '{row_id}'")))
}

fn require_pool(row: &Row, pool_id: &str) -> Result<()> {
    row.pool(pool_id).map(|_| ()).ok_or_else(|| CoreError::NotFound(format!("pool '{pool_id}' in row '{}'", row.id)))
}

fn team_index(row: &Row, team_id: &str) -> Result<usize> {
    row.teams
        .iter()
        .position(|t| t.id == team_id)
        .ok_or_else(|| CoreError::NotFound(format!("team '{team_id}' in row '{}'", row.id)))
}

/// Applies a remediation to a copy of `rows`. `Ignore` only touches `ignores`.
pub fn apply_remediation(
    rows: &[Row],
    remediation: &Remediation,
    ignores: &mut IgnoreList,
    ctx: &DistributionContext,
) -> Result<Vec<Row>> {
    let mut rows = rows.to_vec();
    match remediation {
        Remediation::ReassignKeys { row_id, pool_id, assignments } => {
            let index = row_index(&rows, row_id)?;
            let row = &mut rows[index];
            require_pool(row, pool_id)?;
            for assignment in assignments {
                let i = team_index(row, &assignment.team_id)?;
                if !row.teams[i].is_in(pool_id) {
                    return Err(CoreError::InvalidParameter(format!(
                        "team '{}' is not in pool '{pool_id}'",
                        assignment.team_id
                    )));
                }
                row.teams[i].foda_key = Some(assignment.key);
            }
            let members: Vec<_> = row.teams_in_pool(pool_id).cloned().collect();
            if !has_valid_keys(&members) {
                return Err(CoreError::InvalidParameter(format!("key assignment leaves duplicate keys in '{pool_id}'")));
            }
        }
        Remediation::MoveTeam { row_id, team_id, to_pool } => {
            let index = row_index(&rows, row_id)?;
            let row = &mut rows[index];
            require_pool(row, to_pool)?;
            let i = team_index(row, team_id)?;
            let team = &mut row.teams[i];
            if team.is_pinned {
                return Err(CoreError::InvalidParameter(format!("team '{team_id}' is pinned")));
            }
            let from = team.pool_id.replace(to_pool.clone());
            team.is_host = false;
            team.foda_key = None;
            for other in row.teams.iter_mut().filter(|t| !t.is_pinned) {
                if other.pool_id.as_deref() == from.as_deref() || other.is_in(to_pool) {
                    other.foda_key = None;
                }
            }
            resolve_row_keys(row, ctx);
        }
        Remediation::ReassignHost { row_id, pool_id, team_id } => {
            let index = row_index(&rows, row_id)?;
            let row = &mut rows[index];
            require_pool(row, pool_id)?;
            if row.pool(pool_id).is_some_and(|p| p.is_organizer_mode()) {
                return Err(CoreError::InvalidParameter(format!("pool '{pool_id}' is run by an organizer")));
            }
            let i = team_index(row, team_id)?;
            if !row.teams[i].is_in(pool_id) || row.teams[i].is_bye {
                return Err(CoreError::InvalidParameter(format!("team '{team_id}' cannot host '{pool_id}'")));
            }
            if row.host_of(pool_id).is_some_and(|h| h.is_pinned) {
                return Err(CoreError::InvalidParameter(format!("host of '{pool_id}' is pinned")));
            }
            for team in row.teams.iter_mut().filter(|t| t.is_in(pool_id) && !t.is_pinned) {
                team.is_host = false;
                team.foda_key = None;
            }
            row.teams[i].is_host = true;
            resolve_row_keys(row, ctx);
        }
        Remediation::Ignore { key, hosts } => {
            ignores.accept(key.clone(), hosts.clone());
        }
    }
    tracing::info!(action = %remediation.describe(), "remediation applied");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceData;
    use crate::engine::conflicts::collect_all_conflicts;
    use crate::engine::test_support::row_with;
    use crate::models::{DistributionCriteria, Pool};

    /// Two OB teams on keys 1 and 2 of the built-in six-team template.
    fn duplicated() -> Row {
        let mut row = row_with("U9 5:5", &["OB", "OB", "A", "B", "C", "D"], 1);
        row.add_pool(Pool::new("p2", "Pulje 2"));
        for (i, team) in row.teams.iter_mut().enumerate() {
            team.pool_id = Some("p1".into());
            team.foda_key = Some(i as u32 + 1);
        }
        row.teams[2].is_host = true;
        row
    }

    fn duplication(rows: &[Row], ctx: &DistributionContext) -> Conflict {
        collect_all_conflicts(rows, rows, ctx)
            .into_iter()
            .find(|c| c.kind.label() == "club_duplication")
            .unwrap()
    }

    #[test]
    fn test_key_option_resolves_duplication() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![duplicated()];
        let conflict = duplication(&rows, &ctx);

        let suggestions = suggest_remediations(&conflict, &rows, &ctx);
        assert!(matches!(suggestions[0], Remediation::ReassignKeys { .. }));
        assert!(suggestions.iter().any(|s| matches!(s, Remediation::MoveTeam { to_pool, .. } if to_pool == "p2")));

        let mut ignores = IgnoreList::new();
        let fixed = apply_remediation(&rows, &suggestions[0], &mut ignores, &ctx).unwrap();
        assert!(duplication(&fixed, &ctx).resolved);
    }

    #[test]
    fn test_move_team_rekeys_both_pools() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![duplicated()];
        let mut ignores = IgnoreList::new();
        let moved = Remediation::MoveTeam { row_id: "row".into(), team_id: "t1".into(), to_pool: "p2".into() };
        let out = apply_remediation(&rows, &moved, &mut ignores, &ctx).unwrap();
        assert_eq!(out[0].team("t1").and_then(|t| t.foda_key), Some(1));
        let p1: Vec<_> = out[0].teams_in_pool("p1").cloned().collect();
        assert!(has_valid_keys(&p1));
    }

    #[test]
    fn test_reassign_host() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![duplicated()];
        let mut ignores = IgnoreList::new();
        let change = Remediation::ReassignHost { row_id: "row".into(), pool_id: "p1".into(), team_id: "t3".into() };
        let out = apply_remediation(&rows, &change, &mut ignores, &ctx).unwrap();
        assert_eq!(out[0].host_of("p1").map(|t| t.id.as_str()), Some("t3"));
        assert_eq!(out[0].teams_in_pool("p1").filter(|t| t.is_host).count(), 1);
    }

    #[test]
    fn test_ignore_suggestion_suppresses_conflict() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut first = row_with("U9 5:5 — 26/10", &["OB", "A"], 1);
        first.id = "r1".into();
        let mut second = row_with("U10 5:5 — 26/10", &["OB", "B"], 1);
        second.id = "r2".into();
        for row in [&mut first, &mut second] {
            row.teams.iter_mut().for_each(|t| t.pool_id = Some("p1".into()));
            row.teams[0].is_host = true;
        }
        let rows = vec![first, second];
        let conflict = collect_all_conflicts(&rows, &rows, &ctx)
            .into_iter()
            .find(|c| c.kind.label() == "host_date")
            .unwrap();
        let suggestions = suggest_remediations(&conflict, &rows, &ctx);
        let ignore = suggestions.iter().find(|s| matches!(s, Remediation::Ignore { .. })).unwrap();
        assert!(suggestions.iter().any(|s| matches!(s, Remediation::ReassignHost { .. })));

        let mut ignores = IgnoreList::new();
        apply_remediation(&rows, ignore, &mut ignores, &ctx).unwrap();
        let ctx = ctx.with_ignores(&ignores);
        assert!(collect_all_conflicts(&rows, &rows, &ctx).iter().all(|c| c.kind.label() != "host_date"));
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let rows = vec![duplicated()];
        let mut ignores = IgnoreList::new();
        let bad_row = Remediation::MoveTeam { row_id: "nope".into(), team_id: "t1".into(), to_pool: "p2".into() };
        assert!(matches!(apply_remediation(&rows, &bad_row, &mut ignores, &ctx), Err(CoreError::NotFound(_))));
        let bad_pool = Remediation::MoveTeam { row_id: "row".into(), team_id: "t1".into(), to_pool: "p9".into() };
        assert!(matches!(apply_remediation(&rows, &bad_pool, &mut ignores, &ctx), Err(CoreError::NotFound(_))));
    }
}
