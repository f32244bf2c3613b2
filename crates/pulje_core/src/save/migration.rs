use super::error::SaveError;
use super::format::Project;
use super::PROJECT_VERSION;

/// Brings a loaded project up to [`PROJECT_VERSION`].
pub fn migrate_project(mut project: Project) -> Result<Project, SaveError> {
    let original_version = project.version;

    project = match project.version {
        0 => migrate_v0_to_v1(project),
        1 => project,
        v => {
            return Err(SaveError::VersionMismatch { found: v, expected: PROJECT_VERSION });
        }
    };

    project.version = PROJECT_VERSION;
    if original_version != PROJECT_VERSION {
        log::info!("Migrated project from version {} to {}", original_version, PROJECT_VERSION);
    }

    Ok(project)
}

/// Version 0 files were written without column order and could carry
/// placement flags on teams that sit in no pool.
fn migrate_v0_to_v1(mut project: Project) -> Project {
    log::info!("Migrating project from version 0 to 1");

    for row in &mut project.rows {
        let pool_ids: Vec<String> = row.pools.iter().map(|p| p.id.clone()).collect();
        row.column_order.retain(|id| pool_ids.contains(id));
        for id in &pool_ids {
            if !row.column_order.contains(id) {
                row.column_order.push(id.clone());
            }
        }

        for team in row.teams.iter_mut().filter(|t| t.pool_id.is_none()) {
            if team.is_host || team.foda_key.is_some() {
                log::warn!("Team '{}' in row '{}' is unplaced but carries placement data, clearing", team.id, row.id);
                team.is_host = false;
                team.foda_key = None;
            }
        }
    }

    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pool, Row, Team};

    #[test]
    fn test_v0_fills_column_order() {
        let mut row = Row::new("r1", "U9");
        row.pools.push(Pool::new("p1", "Pulje 1"));
        row.pools.push(Pool::new("p2", "Pulje 2"));
        row.column_order = vec!["p2".to_string(), "gone".to_string()];
        row.teams.push(Team::new("t1", "OB 1", "OB").with_key(3));

        let mut project = Project::new();
        project.version = 0;
        project.rows.push(row);

        let migrated = migrate_project(project).unwrap();
        assert_eq!(migrated.version, PROJECT_VERSION);
        assert_eq!(migrated.rows[0].column_order, vec!["p2".to_string(), "p1".to_string()]);
        assert_eq!(migrated.rows[0].teams[0].foda_key, None);
    }

    #[test]
    fn test_current_version_untouched() {
        let project = Project::new();
        assert_eq!(migrate_project(project.clone()).unwrap(), project);
    }

    #[test]
    fn test_future_version_fails() {
        let mut project = Project::new();
        project.version = PROJECT_VERSION + 1;
        assert!(matches!(migrate_project(project), Err(SaveError::VersionMismatch { .. })));
    }
}
