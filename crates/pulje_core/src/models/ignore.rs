//! User-accepted conflict overrides.
//!
//! Every entry remembers which pools the club hosted in the entry's scope when
//! the user accepted it. The entry only suppresses a conflict while that host
//! set is unchanged; any change to the host assignment makes it stale.

use super::club::normalize_club;
use super::conflict::HostedPool;
use super::row::MatchFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum IgnoreKey {
    HostDate { club: String, date: String },
    HostPrevious { club: String, row_name: String },
    HostMultiPool { club: String },
    BaneCapacity { club: String, date: String, format: MatchFormat },
}

impl IgnoreKey {
    pub fn host_date(club: &str, date: &str) -> Self {
        IgnoreKey::HostDate { club: normalize_club(club), date: date.to_string() }
    }

    pub fn host_previous(club: &str, row_name: &str) -> Self {
        IgnoreKey::HostPrevious { club: normalize_club(club), row_name: normalize_club(row_name) }
    }

    pub fn host_multi_pool(club: &str) -> Self {
        IgnoreKey::HostMultiPool { club: normalize_club(club) }
    }

    pub fn bane_capacity(club: &str, date: &str, format: MatchFormat) -> Self {
        IgnoreKey::BaneCapacity { club: normalize_club(club), date: date.to_string(), format }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreEntry {
    pub key: IgnoreKey,
    /// Hosted pools in scope at acceptance time, sorted.
    pub hosts: Vec<HostedPool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreList {
    #[serde(default)]
    entries: Vec<IgnoreEntry>,
}

impl IgnoreList {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn entries(&self) -> &[IgnoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records an override for the current host set, replacing any older entry
    /// with the same key.
    pub fn accept(&mut self, key: IgnoreKey, mut hosts: Vec<HostedPool>) {
        hosts.sort();
        hosts.dedup();
        self.entries.retain(|e| e.key != key);
        self.entries.push(IgnoreEntry { key, hosts });
    }

    pub fn revoke(&mut self, key: &IgnoreKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.key != key);
        before != self.entries.len()
    }

    /// True only if an entry exists for `key` and its host set equals `current`.
    pub fn suppresses(&self, key: &IgnoreKey, current: &[HostedPool]) -> bool {
        let mut current = current.to_vec();
        current.sort();
        current.dedup();
        self.entries.iter().any(|e| &e.key == key && e.hosts == current)
    }

    /// Drops entries whose host set no longer matches. `current` yields the
    /// live host set for a key. Returns the number of dropped entries.
    pub fn retain_current<F>(&mut self, mut current: F) -> usize
    where
        F: FnMut(&IgnoreKey) -> Vec<HostedPool>,
    {
        let before = self.entries.len();
        self.entries.retain(|e| {
            let mut live = current(&e.key);
            live.sort();
            live.dedup();
            live == e.hosts
        });
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hp(row: &str, pool: &str) -> HostedPool {
        HostedPool { row_id: row.into(), pool_id: pool.into() }
    }

    #[test]
    fn test_suppresses_only_same_host_set() {
        let mut list = IgnoreList::new();
        let key = IgnoreKey::host_date("OB", "26/10");
        list.accept(key.clone(), vec![hp("r2", "p1"), hp("r1", "p1")]);

        assert!(list.suppresses(&key, &[hp("r1", "p1"), hp("r2", "p1")]));
        assert!(!list.suppresses(&key, &[hp("r1", "p1"), hp("r3", "p1")]));
        assert!(!list.suppresses(&IgnoreKey::host_date("OB", "27/10"), &[hp("r1", "p1")]));
    }

    #[test]
    fn test_keys_are_normalized() {
        assert_eq!(IgnoreKey::host_multi_pool(" OB "), IgnoreKey::host_multi_pool("ob"));
    }

    #[test]
    fn test_retain_current_drops_stale() {
        let mut list = IgnoreList::new();
        list.accept(IgnoreKey::host_multi_pool("OB"), vec![hp("r1", "p1"), hp("r2", "p1")]);
        list.accept(IgnoreKey::host_multi_pool("B93"), vec![hp("r1", "p2"), hp("r2", "p2")]);

        let dropped = list.retain_current(|key| match key {
            IgnoreKey::HostMultiPool { club } if club == "ob" => vec![hp("r2", "p1"), hp("r1", "p1")],
            _ => vec![hp("r1", "p2")],
        });
        assert_eq!(dropped, 1);
        assert_eq!(list.len(), 1);
    }
}
