use super::error::SaveError;
use super::PROJECT_VERSION;
use crate::models::{DistributionCriteria, IgnoreList, Row, Wish};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

/// Everything a planner works on: the rows, the club wishes, the global
/// criteria and the conflicts accepted so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project format version for migration
    #[serde(default)]
    pub version: u32,

    /// Last save (unix milliseconds)
    #[serde(default)]
    pub saved_at: u64,

    #[serde(default)]
    pub rows: Vec<Row>,

    #[serde(default)]
    pub wishes: Vec<Wish>,

    /// Project-specific criteria; `None` defers to the engine config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<DistributionCriteria>,

    #[serde(default)]
    pub ignores: IgnoreList,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    pub fn new() -> Self {
        Self {
            version: PROJECT_VERSION,
            saved_at: current_timestamp(),
            rows: Vec::new(),
            wishes: Vec::new(),
            criteria: None,
            ignores: IgnoreList::new(),
        }
    }

    pub fn touch(&mut self) {
        self.saved_at = current_timestamp();
    }

    /// The project's own criteria, else `fallback`.
    pub fn criteria_or<'a>(&'a self, fallback: &'a DistributionCriteria) -> &'a DistributionCriteria {
        self.criteria.as_ref().unwrap_or(fallback)
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    /// Structural checks: unique ids and placements that point at real pools.
    pub fn validate(&self) -> Result<(), SaveError> {
        let mut row_ids = HashSet::new();
        for row in &self.rows {
            if !row_ids.insert(row.id.as_str()) {
                return Err(SaveError::Invalid { reason: format!("duplicate row id '{}'", row.id) });
            }

            let mut pool_ids = HashSet::new();
            for pool in &row.pools {
                if !pool_ids.insert(pool.id.as_str()) {
                    return Err(SaveError::Invalid {
                        reason: format!("duplicate pool id '{}' in row '{}'", pool.id, row.id),
                    });
                }
            }

            let mut team_ids = HashSet::new();
            for team in &row.teams {
                if !team_ids.insert(team.id.as_str()) {
                    return Err(SaveError::Invalid {
                        reason: format!("duplicate team id '{}' in row '{}'", team.id, row.id),
                    });
                }
                if let Some(pool_id) = &team.pool_id {
                    if !pool_ids.contains(pool_id.as_str()) {
                        return Err(SaveError::Invalid {
                            reason: format!("team '{}' is placed in unknown pool '{pool_id}'", team.id),
                        });
                    }
                }
            }
        }

        let mut wish_ids = HashSet::new();
        for wish in &self.wishes {
            if !wish_ids.insert(wish.id.as_str()) {
                return Err(SaveError::Invalid { reason: format!("duplicate wish id '{}'", wish.id) });
            }
        }

        Ok(())
    }
}

/// MessagePack, then LZ4 with the size prepended, then a SHA-256 trailer.
pub fn serialize_and_compress(project: &Project) -> Result<Vec<u8>, SaveError> {
    let msgpack = to_vec_named(project)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<Project, SaveError> {
    // size header + checksum
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);
    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize()[..] != *checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let project: Project = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    if project.version > PROJECT_VERSION {
        return Err(SaveError::VersionMismatch { found: project.version, expected: PROJECT_VERSION });
    }

    Ok(project)
}

pub fn to_json(project: &Project) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn from_json(json: &str) -> Result<Project, SaveError> {
    let project: Project = serde_json::from_str(json)?;
    if project.version > PROJECT_VERSION {
        return Err(SaveError::VersionMismatch { found: project.version, expected: PROJECT_VERSION });
    }
    Ok(project)
}

pub fn current_timestamp() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
