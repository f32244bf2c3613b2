use serde::{Deserialize, Serialize};

pub type TeamId = String;
pub type PoolId = String;
pub type RowId = String;

/// Club name given to bye placeholders.
pub const BYE_CLUB: &str = "__bye__";

/// One registered team inside a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub club: String,
    #[serde(default)]
    pub pool_id: Option<PoolId>,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_bye: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub foda_key: Option<u32>,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, club: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            club: club.into(),
            pool_id: None,
            is_host: false,
            is_bye: false,
            is_pinned: false,
            foda_key: None,
        }
    }

    /// Placeholder used to pad an undersized pool.
    pub fn bye(id: impl Into<TeamId>) -> Self {
        let id = id.into();
        Self { name: "Oversidder".to_string(), club: BYE_CLUB.to_string(), is_bye: true, ..Self::new(id, "", "") }
    }

    pub fn in_pool(mut self, pool_id: impl Into<PoolId>) -> Self {
        self.pool_id = Some(pool_id.into());
        self
    }

    pub fn as_host(mut self) -> Self {
        self.is_host = true;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn with_key(mut self, key: u32) -> Self {
        self.foda_key = Some(key);
        self
    }

    pub fn is_placed(&self) -> bool {
        self.pool_id.is_some()
    }

    pub fn is_in(&self, pool_id: &str) -> bool {
        self.pool_id.as_deref() == Some(pool_id)
    }

    /// Clears pool, host flag and key unless the team is pinned.
    pub fn reset_placement(&mut self) {
        if self.is_pinned {
            return;
        }
        self.pool_id = None;
        self.is_host = false;
        self.foda_key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_respects_pin() {
        let mut free = Team::new("t1", "OB 1", "OB").in_pool("p1").as_host().with_key(2);
        free.reset_placement();
        assert_eq!(free.pool_id, None);
        assert!(!free.is_host);
        assert_eq!(free.foda_key, None);

        let mut pinned = Team::new("t2", "OB 2", "OB").in_pool("p1").as_host().with_key(2).pinned();
        pinned.reset_placement();
        assert!(pinned.is_in("p1"));
        assert!(pinned.is_host);
        assert_eq!(pinned.foda_key, Some(2));
    }

    #[test]
    fn test_bye_team() {
        let bye = Team::bye("b1");
        assert!(bye.is_bye);
        assert_eq!(bye.club, BYE_CLUB);
        assert!(!bye.is_host);
    }
}
