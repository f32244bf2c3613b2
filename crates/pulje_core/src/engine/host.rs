//! Host selection, the first phase of a distribution pass.
//!
//! Every pool gets its host before any other team is placed.

use super::context::DistributionContext;
use super::filter_chain::{narrow, Narrowing};
use crate::models::{
    previous_host_record, same_club, HostFilter, PoolId, Row, RowDate, RowId, RuleType, Team,
};

/// A pool with a playing host, as seen by the host filters.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRecord {
    pub club: String,
    pub row_id: RowId,
    pub pool_id: PoolId,
    pub date: Option<RowDate>,
    pub age_group: Option<String>,
}

/// Hosts of every host-mode pool, skipping `exclude_row`.
pub fn collect_host_records(rows: &[Row], exclude_row: Option<&str>) -> Vec<HostRecord> {
    let mut records = Vec::new();
    for row in rows.iter().filter(|r| Some(r.id.as_str()) != exclude_row) {
        let meta = row.meta();
        for pool in row.pools.iter().filter(|p| !p.is_organizer_mode()) {
            if let Some(host) = row.host_of(&pool.id) {
                records.push(HostRecord {
                    club: host.club.clone(),
                    row_id: row.id.clone(),
                    pool_id: pool.id.clone(),
                    date: meta.date,
                    age_group: meta.age_group.clone(),
                });
            }
        }
    }
    records
}

/// Team count pool `index` ends up with when `total` teams are spread evenly.
fn projected_size(total: usize, pools: usize, index: usize) -> usize {
    if pools == 0 {
        return 0;
    }
    total / pools + usize::from(index < total % pools)
}

/// Picks a host for every host-mode pool of `row` that lacks one.
///
/// `order` is the shuffled team order; candidates are considered in it.
/// `hosts` holds the hosts already known (other rows, this row's kept hosts)
/// and receives each new pick, so later pools and rows see it.
pub fn select_hosts(row: &mut Row, order: &[usize], hosts: &mut Vec<HostRecord>, ctx: &DistributionContext) {
    let meta = row.meta();
    let row_date = meta.date;
    let row_name = row.name_without_date();
    let filter_order = ctx.host_filter_order(row);
    let total_teams = row.teams.len();
    let pool_count = row.pools.len();

    for (pool_index, pool) in row.pools.clone().iter().enumerate() {
        if pool.is_organizer_mode() || row.host_of(&pool.id).is_some() {
            continue;
        }
        if !ctx.effective(pool).auto_assign_host {
            continue;
        }

        let candidates: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| {
                let team: &Team = &row.teams[i];
                !team.is_pinned
                    && !team.is_bye
                    && !team.is_host
                    && team.pool_id.as_deref().map_or(true, |id| id == pool.id)
                    && !ctx.has_rule(&team.club, &meta, RuleType::AvoidHost)
            })
            .collect();
        if candidates.is_empty() {
            tracing::debug!(row = %row.id, pool = %pool.id, "no host candidate");
            continue;
        }

        let forced = candidates.iter().copied().find(|&i| ctx.has_rule(&row.teams[i].club, &meta, RuleType::ForceHost));

        let chosen = match forced {
            Some(i) => i,
            None => {
                let mut remaining = candidates;
                for filter in filter_order.iter().copied() {
                    if !ctx.criteria.host_filters.is_enabled(filter) {
                        continue;
                    }
                    let teams = &row.teams;
                    let hosts_seen = hosts.as_slice();
                    let (kept, outcome) = narrow(remaining, |&i| {
                        let club = &teams[i].club;
                        match filter {
                            HostFilter::AvoidMultipleHostsOnSameDate => match &row_date {
                                Some(date) => !hosts_seen
                                    .iter()
                                    .any(|h| same_club(&h.club, club) && h.date.is_some_and(|d| d.same_day(date))),
                                None => true,
                            },
                            HostFilter::AvoidPreviousHosts => {
                                previous_host_record(&ctx.reference.history, club, &row_name).is_none()
                            }
                            HostFilter::AvoidInsufficientBaneCapacity => {
                                let Some(format) = row.pool_format(pool) else {
                                    return true;
                                };
                                let size = projected_size(total_teams, pool_count, pool_index);
                                let required = ctx.template_for_size(pool, size).template.required_fields();
                                ctx.capacity(club, format).map_or(true, |cap| cap >= required)
                            }
                            HostFilter::PrioritizeNewHostInAgeGroup => match &meta.age_group {
                                Some(age) => !hosts_seen.iter().any(|h| {
                                    same_club(&h.club, club)
                                        && h.age_group.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(age))
                                }),
                                None => true,
                            },
                        }
                    });
                    if outcome == Narrowing::Relaxed {
                        tracing::debug!(row = %row.id, pool = %pool.id, ?filter, "host filter relaxed");
                    }
                    remaining = kept;
                }
                remaining[0]
            }
        };

        let team = &mut row.teams[chosen];
        team.pool_id = Some(pool.id.clone());
        team.is_host = true;
        team.foda_key = None;
        tracing::debug!(row = %row.id, pool = %pool.id, club = %team.club, forced = forced.is_some(), "host selected");
        hosts.push(HostRecord {
            club: team.club.clone(),
            row_id: row.id.clone(),
            pool_id: pool.id.clone(),
            date: row_date,
            age_group: meta.age_group.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceData;
    use crate::engine::test_support::row_with;
    use crate::models::{ClubDirectory, ClubInfo, DistributionCriteria, HostHistoryRecord, Pool, Wish};

    fn order(row: &Row) -> Vec<usize> {
        (0..row.teams.len()).collect()
    }

    #[test]
    fn test_one_host_per_pool() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 B Drenge 5:5 — 26/10", &["A", "B", "C", "D", "E", "F"], 2);
        let mut hosts = Vec::new();
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut hosts, &ctx);

        assert_eq!(hosts.len(), 2);
        for pool in &row.pools {
            assert_eq!(row.teams_in_pool(&pool.id).filter(|t| t.is_host).count(), 1);
        }
    }

    #[test]
    fn test_organizer_pool_gets_no_host() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B", "C"], 0);
        row.add_pool(Pool::new("p1", "Pulje 1").organized_by("Arrangør IF"));
        let mut hosts = Vec::new();
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut hosts, &ctx);
        assert!(row.teams.iter().all(|t| !t.is_host));
    }

    #[test]
    fn test_same_date_filter_skips_busy_club() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5 — 26/10", &["A", "B"], 1);
        let mut hosts = vec![HostRecord {
            club: "A".into(),
            row_id: "other".into(),
            pool_id: "x".into(),
            date: RowDate::new(26, 10, None),
            age_group: Some("U10".into()),
        }];
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut hosts, &ctx);
        assert_eq!(row.host_of("p1").map(|t| t.club.as_str()), Some("B"));
    }

    #[test]
    fn test_filters_relax_when_everyone_fails() {
        let criteria = DistributionCriteria::default();
        let mut reference = ReferenceData::builtin();
        for club in ["A", "B"] {
            reference.history.push(HostHistoryRecord {
                row_name_without_date: "U9 5:5".into(),
                club: club.into(),
                count: 1,
                dates: vec![],
            });
        }
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B"], 1);
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut Vec::new(), &ctx);
        assert_eq!(row.host_of("p1").map(|t| t.club.as_str()), Some("A"));
    }

    #[test]
    fn test_capacity_filter_uses_projected_template() {
        let criteria = DistributionCriteria::default();
        let mut reference = ReferenceData::builtin();
        reference.clubs =
            ClubDirectory::new([ClubInfo::new("A").with_capacity(1, 1, 1), ClubInfo::new("B").with_capacity(4, 4, 4)]);
        let ctx = DistributionContext::new(&criteria, &reference);
        // Six teams in one pool need three fields
        let mut row = row_with("U9 5:5", &["A", "B", "C", "D", "E", "F"], 1);
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut Vec::new(), &ctx);
        assert_eq!(row.host_of("p1").map(|t| t.club.as_str()), Some("B"));
    }

    #[test]
    fn test_force_host_beats_filters_and_avoid_host_excludes() {
        let criteria = DistributionCriteria::default();
        let reference = ReferenceData::builtin();
        let wishes = vec![Wish::new("w1", "A", RuleType::AvoidHost), Wish::new("w2", "C", RuleType::ForceHost)];
        let ctx = DistributionContext::new(&criteria, &reference).with_wishes(&wishes);
        let mut row = row_with("U9 5:5 — 26/10", &["A", "B", "C"], 1);
        let mut hosts = vec![HostRecord {
            club: "C".into(),
            row_id: "other".into(),
            pool_id: "x".into(),
            date: RowDate::new(26, 10, None),
            age_group: None,
        }];
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut hosts, &ctx);
        assert_eq!(row.host_of("p1").map(|t| t.club.as_str()), Some("C"));
    }

    #[test]
    fn test_auto_assign_off_leaves_pool_hostless() {
        let criteria = DistributionCriteria { auto_assign_host: false, ..Default::default() };
        let reference = ReferenceData::builtin();
        let ctx = DistributionContext::new(&criteria, &reference);
        let mut row = row_with("U9 5:5", &["A", "B"], 1);
        let team_order = order(&row);
        select_hosts(&mut row, &team_order, &mut Vec::new(), &ctx);
        assert!(row.host_of("p1").is_none());
    }

    #[test]
    fn test_projected_size() {
        assert_eq!((0..3).map(|i| projected_size(11, 3, i)).collect::<Vec<_>>(), vec![4, 4, 3]);
        assert_eq!(projected_size(5, 0, 0), 0);
    }
}
