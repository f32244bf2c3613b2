//! String-in, string-out entry points for front-ends that speak JSON.
//!
//! Every request carries `schema_version`; anything other than
//! [`SCHEMA_VERSION`] is rejected before the payload is looked at.

use crate::config::EngineConfig;
use crate::data::{ReferenceData, ReferenceFile};
use crate::engine::{
    collect_all_conflicts, distribute_with_retry, optimal_pool_config, optimal_pool_sizes, prune_ignores,
    suggest_remediations, AttemptReport, DistributionContext, DistributionMode, Remediation, Scope,
};
use crate::error::{CoreError, Result};
use crate::models::{count_unresolved, Conflict, Row};
use crate::save::{migrate_project, Project};
use crate::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    pub schema_version: u8,
    pub project: Project,
    /// Club, geo, template and history tables; built-in templates only when absent
    #[serde(default)]
    pub reference: Option<ReferenceFile>,
    #[serde(default)]
    pub mode: DistributionMode,
    #[serde(default)]
    pub scope: Scope,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
pub struct DistributeResponse {
    pub schema_version: u8,
    pub project: Project,
    pub attempts: Vec<AttemptReport>,
    pub best_attempt: Option<usize>,
    /// Conflicts of the rows in scope after distribution
    pub conflicts: Vec<Conflict>,
    pub unresolved: usize,
    pub pruned_ignores: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConflictsRequest {
    pub schema_version: u8,
    pub project: Project,
    #[serde(default)]
    pub reference: Option<ReferenceFile>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub include_remediations: bool,
}

#[derive(Debug, Serialize)]
pub struct ConflictReport {
    pub conflict: Conflict,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remediations: Vec<Remediation>,
}

#[derive(Debug, Serialize)]
pub struct ConflictsResponse {
    pub schema_version: u8,
    pub conflicts: Vec<ConflictReport>,
    pub unresolved: usize,
}

#[derive(Debug, Deserialize)]
pub struct PoolConfigRequest {
    pub schema_version: u8,
    pub total_teams: usize,
}

#[derive(Debug, Serialize)]
pub struct PoolConfigResponse {
    pub schema_version: u8,
    pub pool_count: usize,
    pub has_warning: bool,
    /// Pool sizes of the cheapest split, largest first
    pub sizes: Option<Vec<usize>>,
}

fn check_schema(found: u8) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(CoreError::SchemaMismatch { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

fn prepare(project: Project, reference: Option<ReferenceFile>) -> Result<(Project, ReferenceData)> {
    let project = migrate_project(project).map_err(|e| CoreError::InvalidParameter(e.to_string()))?;
    project.validate().map_err(|e| CoreError::InvalidParameter(e.to_string()))?;
    let reference = match reference {
        Some(file) => ReferenceData::from_file(file)?,
        None => ReferenceData::builtin(),
    };
    Ok((project, reference))
}

fn in_scope(rows: &[Row], scope: &Scope) -> Vec<Row> {
    rows.iter().filter(|r| scope.contains(r)).cloned().collect()
}

/// Best-of-N distribution of the rows in scope. Ignore entries made stale by
/// the new hosts are dropped from the returned project.
pub fn distribute_json(request_json: &str) -> Result<String> {
    let request: DistributeRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let config = EngineConfig::from_env_or_default()?;
    let (mut project, reference) = prepare(request.project, request.reference)?;
    let criteria = project.criteria_or(&config.criteria).clone();

    let outcome = {
        let ctx = DistributionContext::new(&criteria, &reference)
            .with_wishes(&project.wishes)
            .with_ignores(&project.ignores)
            .with_tuning(config.tuning);
        distribute_with_retry(&project.rows, request.mode, &request.scope, &ctx, request.seed)
    };
    project.rows = outcome.rows;

    let pruned_ignores = {
        let ctx = DistributionContext::new(&criteria, &reference).with_wishes(&project.wishes);
        prune_ignores(&mut project.ignores, &project.rows, &ctx)
    };

    let conflicts = {
        let ctx = DistributionContext::new(&criteria, &reference)
            .with_wishes(&project.wishes)
            .with_ignores(&project.ignores);
        collect_all_conflicts(&in_scope(&project.rows, &request.scope), &project.rows, &ctx)
    };
    let unresolved = count_unresolved(&conflicts);
    project.touch();

    tracing::info!(
        mode = ?request.mode,
        scope = ?request.scope,
        seed = request.seed,
        unresolved,
        pruned_ignores,
        "distribute_json"
    );

    let response = DistributeResponse {
        schema_version: SCHEMA_VERSION,
        project,
        attempts: outcome.attempts,
        best_attempt: outcome.best_attempt,
        conflicts,
        unresolved,
        pruned_ignores,
    };
    Ok(serde_json::to_string(&response)?)
}

/// Conflicts of the rows in scope, optionally with suggested fixes.
pub fn conflicts_json(request_json: &str) -> Result<String> {
    let request: ConflictsRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let config = EngineConfig::from_env_or_default()?;
    let (project, reference) = prepare(request.project, request.reference)?;

    let ctx = DistributionContext::new(project.criteria_or(&config.criteria), &reference)
        .with_wishes(&project.wishes)
        .with_ignores(&project.ignores);
    let conflicts = collect_all_conflicts(&in_scope(&project.rows, &request.scope), &project.rows, &ctx);
    let unresolved = count_unresolved(&conflicts);

    let conflicts: Vec<ConflictReport> = conflicts
        .into_iter()
        .map(|conflict| {
            let remediations = if request.include_remediations && !conflict.resolved {
                suggest_remediations(&conflict, &project.rows, &ctx)
            } else {
                Vec::new()
            };
            ConflictReport { conflict, remediations }
        })
        .collect();

    tracing::debug!(total = conflicts.len(), unresolved, "conflicts_json");
    Ok(serde_json::to_string(&ConflictsResponse { schema_version: SCHEMA_VERSION, conflicts, unresolved })?)
}

pub fn pool_config_json(request_json: &str) -> Result<String> {
    let request: PoolConfigRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;

    let config = optimal_pool_config(request.total_teams);
    let response = PoolConfigResponse {
        schema_version: SCHEMA_VERSION,
        pool_count: config.pool_count,
        has_warning: config.has_warning,
        sizes: optimal_pool_sizes(request.total_teams),
    };
    Ok(serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pool, Team};
    use serde_json::{json, Value};

    fn project_json() -> Value {
        let mut row = Row::new("r1", "U9 Drenge 5:5 - 26/10");
        for (i, club) in ["OB", "B93", "Skovbo IF", "KB", "AB", "Fremad Amager"].iter().enumerate() {
            row.teams.push(Team::new(format!("t{i}"), format!("{club} 1"), *club));
        }
        row.add_pool(Pool::new("p1", "Pulje 1"));
        row.add_pool(Pool::new("p2", "Pulje 2"));
        let mut project = Project::new();
        project.rows.push(row);
        serde_json::to_value(&project).unwrap()
    }

    #[test]
    fn test_distribute_json_places_every_team() {
        let request = json!({ "schema_version": 1, "project": project_json(), "seed": 7 });
        let response: Value = serde_json::from_str(&distribute_json(&request.to_string()).unwrap()).unwrap();

        assert_eq!(response["schema_version"], 1);
        let teams = response["project"]["rows"][0]["teams"].as_array().unwrap();
        assert!(teams.iter().all(|t| t["poolId"].is_string()));
        assert_eq!(teams.iter().filter(|t| t["isHost"] == true).count(), 2);
        assert!(!response["attempts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_schema_version_checked() {
        let request = json!({ "schema_version": 9, "project": project_json(), "seed": 7 });
        assert!(matches!(
            distribute_json(&request.to_string()),
            Err(CoreError::SchemaMismatch { found: 9, expected: 1 })
        ));
        assert!(matches!(
            pool_config_json(r#"{"schema_version": 2, "total_teams": 10}"#),
            Err(CoreError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_conflicts_json_with_remediations() {
        let mut project: Project = serde_json::from_value(project_json()).unwrap();
        let row = &mut project.rows[0];
        row.teams[1].club = "OB".to_string();
        row.teams[0].pool_id = Some("p1".to_string());
        row.teams[1].pool_id = Some("p1".to_string());

        let request = json!({
            "schema_version": 1,
            "project": project,
            "include_remediations": true,
        });
        let response: Value = serde_json::from_str(&conflicts_json(&request.to_string()).unwrap()).unwrap();
        let conflicts = response["conflicts"].as_array().unwrap();
        let duplication = conflicts.iter().find(|c| c["conflict"]["type"] == "clubDuplication").unwrap();
        assert!(!duplication["remediations"].as_array().unwrap().is_empty());
        assert!(response["unresolved"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn test_pool_config_json() {
        let response: Value =
            serde_json::from_str(&pool_config_json(r#"{"schema_version": 1, "total_teams": 12}"#).unwrap()).unwrap();
        assert_eq!(response["pool_count"], 2);
        assert_eq!(response["has_warning"], false);
        assert_eq!(response["sizes"], json!([6, 6]));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut project: Project = serde_json::from_value(project_json()).unwrap();
        let copy = project.rows[0].clone();
        project.rows.push(copy);
        let request = json!({ "schema_version": 1, "project": project });
        assert!(matches!(conflicts_json(&request.to_string()), Err(CoreError::InvalidParameter(_))));
    }
}
