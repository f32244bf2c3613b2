//! Distribution switches, global and per pool.

use super::pool::Pool;
use serde::{Deserialize, Serialize};

/// Narrowing steps of the host selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostFilter {
    AvoidMultipleHostsOnSameDate,
    AvoidPreviousHosts,
    AvoidInsufficientBaneCapacity,
    PrioritizeNewHostInAgeGroup,
}

impl HostFilter {
    pub const ALL: [HostFilter; 4] = [
        HostFilter::AvoidMultipleHostsOnSameDate,
        HostFilter::AvoidPreviousHosts,
        HostFilter::AvoidInsufficientBaneCapacity,
        HostFilter::PrioritizeNewHostInAgeGroup,
    ];
}

/// Enabled flags and user-chosen priority of the host filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostFilterSettings {
    pub order: Vec<HostFilter>,
    pub avoid_multiple_hosts_on_same_date: bool,
    pub avoid_previous_hosts: bool,
    pub avoid_insufficient_bane_capacity: bool,
    pub prioritize_new_host_in_age_group: bool,
}

impl Default for HostFilterSettings {
    fn default() -> Self {
        Self {
            order: HostFilter::ALL.to_vec(),
            avoid_multiple_hosts_on_same_date: true,
            avoid_previous_hosts: true,
            avoid_insufficient_bane_capacity: true,
            prioritize_new_host_in_age_group: false,
        }
    }
}

impl HostFilterSettings {
    pub fn is_enabled(&self, filter: HostFilter) -> bool {
        match filter {
            HostFilter::AvoidMultipleHostsOnSameDate => self.avoid_multiple_hosts_on_same_date,
            HostFilter::AvoidPreviousHosts => self.avoid_previous_hosts,
            HostFilter::AvoidInsufficientBaneCapacity => self.avoid_insufficient_bane_capacity,
            HostFilter::PrioritizeNewHostInAgeGroup => self.prioritize_new_host_in_age_group,
        }
    }

    /// Priority order with duplicates dropped and missing filters appended,
    /// so a persisted partial list still covers all four.
    pub fn normalized_order(order: &[HostFilter]) -> Vec<HostFilter> {
        let mut out: Vec<HostFilter> = Vec::with_capacity(HostFilter::ALL.len());
        for filter in order.iter().chain(HostFilter::ALL.iter()) {
            if !out.contains(filter) {
                out.push(*filter);
            }
        }
        out
    }
}

/// Global distribution switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistributionCriteria {
    pub avoid_same_club: bool,
    pub auto_assign_host: bool,
    pub use_geographic_proximity: bool,
    /// Give the host the key with most matches instead of key 1.
    pub use_host_match_logic: bool,
    pub host_filters: HostFilterSettings,
}

impl Default for DistributionCriteria {
    fn default() -> Self {
        Self {
            avoid_same_club: true,
            auto_assign_host: true,
            use_geographic_proximity: true,
            use_host_match_logic: true,
            host_filters: HostFilterSettings::default(),
        }
    }
}

/// Per-pool overrides; `None` falls back to the global value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriteriaOverride {
    pub avoid_same_club: Option<bool>,
    pub auto_assign_host: Option<bool>,
    pub use_geographic_proximity: Option<bool>,
    pub use_host_match_logic: Option<bool>,
}

/// Switches in force for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveCriteria {
    pub avoid_same_club: bool,
    pub auto_assign_host: bool,
    pub use_geographic_proximity: bool,
    pub use_host_match_logic: bool,
}

impl DistributionCriteria {
    pub fn for_pool(&self, pool: &Pool) -> EffectiveCriteria {
        let o = pool.specific_criteria.clone().unwrap_or_default();
        EffectiveCriteria {
            avoid_same_club: o.avoid_same_club.unwrap_or(self.avoid_same_club),
            auto_assign_host: o.auto_assign_host.unwrap_or(self.auto_assign_host),
            use_geographic_proximity: o
                .use_geographic_proximity
                .unwrap_or(self.use_geographic_proximity),
            use_host_match_logic: o.use_host_match_logic.unwrap_or(self.use_host_match_logic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_override_wins() {
        let criteria = DistributionCriteria::default();
        let pool = Pool::new("p1", "Pulje 1").with_criteria(CriteriaOverride {
            avoid_same_club: Some(false),
            ..Default::default()
        });
        let effective = criteria.for_pool(&pool);
        assert!(!effective.avoid_same_club);
        assert!(effective.auto_assign_host);
    }

    #[test]
    fn test_normalized_order() {
        let order = HostFilterSettings::normalized_order(&[
            HostFilter::AvoidPreviousHosts,
            HostFilter::AvoidPreviousHosts,
        ]);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], HostFilter::AvoidPreviousHosts);
        assert_eq!(order[1], HostFilter::AvoidMultipleHostsOnSameDate);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let criteria: DistributionCriteria =
            serde_json::from_str(r#"{"avoidSameClub": false}"#).unwrap();
        assert!(!criteria.avoid_same_club);
        assert!(criteria.auto_assign_host);
        assert_eq!(criteria.host_filters.order.len(), 4);
    }
}
