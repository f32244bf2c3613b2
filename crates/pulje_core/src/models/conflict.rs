use super::row::MatchFormat;
use super::team::{PoolId, RowId, TeamId};
use serde::{Deserialize, Serialize};

/// A (row, pool) pair hosted by a club.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedPool {
    pub row_id: RowId,
    pub pool_id: PoolId,
}

/// Type-specific details of a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConflictKind {
    ClubDuplication {
        club: String,
        team_ids: Vec<TeamId>,
        keys: Vec<Option<u32>>,
    },
    HostDate {
        club: String,
        date: String,
        pools: Vec<HostedPool>,
    },
    HostPrevious {
        club: String,
        row_name: String,
        previous_dates: Vec<String>,
    },
    HostMultiPool {
        club: String,
        pools: Vec<HostedPool>,
    },
    BaneCapacity {
        club: String,
        date: String,
        format: MatchFormat,
        required: u32,
        capacity: u32,
        pools: Vec<HostedPool>,
    },
    AvoidClub {
        club: String,
        avoided_club: String,
        team_id: TeamId,
        wish_id: String,
    },
}

impl ConflictKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictKind::ClubDuplication { .. } => "club_duplication",
            ConflictKind::HostDate { .. } => "host_date",
            ConflictKind::HostPrevious { .. } => "host_previous",
            ConflictKind::HostMultiPool { .. } => "host_multi_pool",
            ConflictKind::BaneCapacity { .. } => "bane_capacity",
            ConflictKind::AvoidClub { .. } => "avoid_club",
        }
    }

    pub fn club(&self) -> &str {
        match self {
            ConflictKind::ClubDuplication { club, .. }
            | ConflictKind::HostDate { club, .. }
            | ConflictKind::HostPrevious { club, .. }
            | ConflictKind::HostMultiPool { club, .. }
            | ConflictKind::BaneCapacity { club, .. }
            | ConflictKind::AvoidClub { club, .. } => club,
        }
    }
}

/// Derived violation record. Never stored on teams or pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(flatten)]
    pub kind: ConflictKind,
    pub row_id: RowId,
    pub pool_id: PoolId,
    pub message: String,
    pub resolved: bool,
}

impl Conflict {
    pub fn new(kind: ConflictKind, row_id: &str, pool_id: &str, message: String) -> Self {
        Self { kind, row_id: row_id.to_string(), pool_id: pool_id.to_string(), message, resolved: false }
    }

    pub fn is_unresolved(&self) -> bool {
        !self.resolved
    }
}

pub fn count_unresolved(conflicts: &[Conflict]) -> usize {
    conflicts.iter().filter(|c| c.is_unresolved()).count()
}
