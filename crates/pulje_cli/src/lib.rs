//! Pulje command line library
//!
//! File-level commands behind the `pulje` binary: every command loads a
//! project (`.json` or `.pulje`), runs one engine operation and optionally
//! writes the project back.

use anyhow::{Context, Result};
use pulje_core::api::ConflictReport;
use pulje_core::classify::{classify_wishes, KeywordClassifier};
use pulje_core::engine::{
    apply_optimal_pool_count, collect_all_conflicts, distribute_with_retry, optimal_pool_config,
    optimal_pool_sizes, prune_ignores, resolve_row_keys, suggest_remediations, AttemptReport, DistributionContext,
    DistributionMode, Scope,
};
use pulje_core::models::{normalize_club, Row, BYE_CLUB};
use pulje_core::{EngineConfig, Project, ProjectStore, ReferenceData};
use serde::Serialize;
use std::path::Path;

pub fn load_project(path: &Path) -> Result<Project> {
    ProjectStore::load(path).with_context(|| format!("Failed to load project: {}", path.display()))
}

/// Writes `project` to `path`, refreshing its save time.
pub fn save_project(path: &Path, project: &mut Project) -> Result<()> {
    project.touch();
    ProjectStore::save(path, project).with_context(|| format!("Failed to save project: {}", path.display()))
}

/// Reference tables from a `.json`/`.yaml` file, or the built-in templates.
pub fn load_reference(path: Option<&Path>) -> Result<ReferenceData> {
    match path {
        Some(path) => ReferenceData::load(path)
            .with_context(|| format!("Failed to load reference data: {}", path.display())),
        None => Ok(ReferenceData::builtin()),
    }
}

pub fn scope_for(row: Option<&str>) -> Scope {
    row.map_or(Scope::All, Scope::row)
}

fn require_row(project: &Project, scope: &Scope) -> Result<()> {
    if let Some(row_id) = scope_row_id(scope) {
        if project.row(row_id).is_none() {
            anyhow::bail!("Row '{row_id}' not found in project");
        }
    }
    Ok(())
}

fn scope_row_id(scope: &Scope) -> Option<&str> {
    match scope {
        Scope::All => None,
        Scope::Row { row_id } => Some(row_id.as_str()),
    }
}

fn in_scope(rows: &[Row], scope: &Scope) -> Vec<Row> {
    rows.iter().filter(|r| scope.contains(r)).cloned().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributeSummary {
    pub attempts: Vec<AttemptReport>,
    pub best_attempt: Option<usize>,
    pub unresolved: usize,
    pub pruned_ignores: usize,
}

/// Best-of-N distribution of the rows in `scope`; stale ignores are pruned.
pub fn distribute(
    project: &mut Project,
    reference: &ReferenceData,
    config: &EngineConfig,
    mode: DistributionMode,
    scope: &Scope,
    seed: u64,
) -> Result<DistributeSummary> {
    require_row(project, scope)?;

    let criteria = project.criteria_or(&config.criteria).clone();
    let outcome = {
        let ctx = DistributionContext::new(&criteria, reference)
            .with_wishes(&project.wishes)
            .with_ignores(&project.ignores)
            .with_tuning(config.tuning);
        distribute_with_retry(&project.rows, mode, scope, &ctx, seed)
    };
    project.rows = outcome.rows;

    let pruned_ignores = {
        let ctx = DistributionContext::new(&criteria, reference).with_wishes(&project.wishes);
        prune_ignores(&mut project.ignores, &project.rows, &ctx)
    };
    let unresolved = {
        let ctx = DistributionContext::new(&criteria, reference)
            .with_wishes(&project.wishes)
            .with_ignores(&project.ignores);
        collect_all_conflicts(&in_scope(&project.rows, scope), &project.rows, &ctx)
            .iter()
            .filter(|c| !c.resolved)
            .count()
    };

    tracing::info!(?mode, seed, unresolved, pruned_ignores, "project distributed");
    Ok(DistributeSummary { attempts: outcome.attempts, best_attempt: outcome.best_attempt, unresolved, pruned_ignores })
}

pub fn conflicts(
    project: &Project,
    reference: &ReferenceData,
    config: &EngineConfig,
    scope: &Scope,
    with_fixes: bool,
) -> Result<Vec<ConflictReport>> {
    require_row(project, scope)?;
    let ctx = DistributionContext::new(project.criteria_or(&config.criteria), reference)
        .with_wishes(&project.wishes)
        .with_ignores(&project.ignores);
    let reports = collect_all_conflicts(&in_scope(&project.rows, scope), &project.rows, &ctx)
        .into_iter()
        .map(|conflict| {
            let remediations = if with_fixes && !conflict.resolved {
                suggest_remediations(&conflict, &project.rows, &ctx)
            } else {
                Vec::new()
            };
            ConflictReport { conflict, remediations }
        })
        .collect();
    Ok(reports)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolCountLine {
    pub row_id: String,
    pub teams: usize,
    pub pools_before: usize,
    pub pool_count: usize,
    pub has_warning: bool,
    pub sizes: Option<Vec<usize>>,
}

/// Optimal pool count per row in scope; with `apply` the rows are resized.
pub fn pool_counts(project: &mut Project, scope: &Scope, apply: bool) -> Result<Vec<PoolCountLine>> {
    require_row(project, scope)?;
    let mut lines = Vec::new();
    for row in project.rows.iter_mut().filter(|r| scope.contains(r)) {
        let teams = row.real_team_count();
        let pools_before = row.pools.len();
        let config = if apply { apply_optimal_pool_count(row) } else { optimal_pool_config(teams) };
        lines.push(PoolCountLine {
            row_id: row.id.clone(),
            teams,
            pools_before,
            pool_count: config.pool_count,
            has_warning: config.has_warning,
            sizes: optimal_pool_sizes(teams),
        });
    }
    Ok(lines)
}

/// Re-resolves fixture keys in the rows in scope. Returns how many teams
/// changed key.
pub fn resolve_keys(
    project: &mut Project,
    reference: &ReferenceData,
    config: &EngineConfig,
    scope: &Scope,
) -> Result<usize> {
    require_row(project, scope)?;
    let criteria = project.criteria_or(&config.criteria).clone();
    let ctx = DistributionContext::new(&criteria, reference);
    let mut changed = 0;
    for row in project.rows.iter_mut().filter(|r| scope.contains(r)) {
        let before: Vec<Option<u32>> = row.teams.iter().map(|t| t.foda_key).collect();
        resolve_row_keys(row, &ctx);
        changed += row.teams.iter().zip(before).filter(|(t, key)| t.foda_key != *key).count();
    }
    Ok(changed)
}

/// Clubs a wish text may name: the reference club list plus every club with
/// a registered team, deduplicated by normalized name.
pub fn known_clubs(project: &Project, reference: &ReferenceData) -> Vec<String> {
    let mut clubs: Vec<String> = Vec::new();
    let team_clubs = project.rows.iter().flat_map(|r| r.teams.iter()).filter(|t| !t.is_bye).map(|t| t.club.clone());
    for club in reference.clubs.names().into_iter().chain(team_clubs) {
        if club == BYE_CLUB {
            continue;
        }
        if !clubs.iter().any(|c| normalize_club(c) == normalize_club(&club)) {
            clubs.push(club);
        }
    }
    clubs
}

pub fn classify(project: &mut Project, reference: &ReferenceData, force: bool) -> usize {
    let clubs = known_clubs(project, reference);
    classify_wishes(&mut project.wishes, &KeywordClassifier::new(), &clubs, force)
}
