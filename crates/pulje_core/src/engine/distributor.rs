//! Greedy placement of the remaining teams, after host selection.

use super::context::DistributionContext;
use super::filter_chain::narrow;
use crate::models::{normalize_club, same_club, GeoPoint, Row, RuleType};
use std::cmp::Ordering;

/// Running per-pool state while placing teams.
struct PoolState {
    real: usize,
    total: usize,
    /// Normalized clubs of the real teams.
    clubs: Vec<String>,
    venue_club: Option<String>,
    venue: Option<GeoPoint>,
    avoid_same_club: bool,
}

impl PoolState {
    fn has_club(&self, club: &str) -> bool {
        self.clubs.iter().any(|c| c == club)
    }
}

fn pool_states(row: &Row, ctx: &DistributionContext) -> Vec<PoolState> {
    row.pools
        .iter()
        .map(|pool| {
            let members: Vec<_> = row.teams_in_pool(&pool.id).collect();
            PoolState {
                real: members.iter().filter(|t| !t.is_bye).count(),
                total: members.len(),
                clubs: members.iter().filter(|t| !t.is_bye).map(|t| normalize_club(&t.club)).collect(),
                venue_club: ctx.venue_club(row, pool),
                venue: ctx.venue_coordinates(row, pool),
                avoid_same_club: ctx.effective(pool).avoid_same_club,
            }
        })
        .collect()
}

/// Places every unplaced team of `row`, real teams in `order` first, byes last.
///
/// Each team goes to the smallest eligible pool. Eligibility narrows by club
/// avoidance, AVOID_CLUB wishes, balance and SAME_LOCATION wishes; a narrowing
/// that would leave no pool is skipped. A SAME_POOL wish naming a club already
/// placed sends the team straight to that pool.
pub fn distribute_teams(row: &mut Row, order: &[usize], ctx: &DistributionContext) {
    if row.pools.is_empty() {
        return;
    }
    let meta = row.meta();
    let mut states = pool_states(row, ctx);
    let target = row.real_team_count().div_ceil(row.pools.len());
    let use_geo = ctx.criteria.use_geographic_proximity;

    let real: Vec<usize> = order.iter().copied().filter(|&i| !row.teams[i].is_bye && !row.teams[i].is_placed()).collect();
    for i in real {
        let club = row.teams[i].club.clone();
        let own = normalize_club(&club);

        let same_pool_targets: Vec<String> = ctx
            .wishes_for(&club, &meta)
            .filter(|w| w.rule_type == RuleType::SamePool)
            .flat_map(|w| w.targets_or_self())
            .map(|c| normalize_club(&c))
            .collect();
        let forced = states.iter().position(|s| same_pool_targets.iter().any(|t| s.has_club(t)));

        let chosen = match forced {
            Some(p) => p,
            None => {
                let candidates: Vec<usize> = (0..states.len()).collect();
                let (candidates, _) = narrow(candidates, |&p| !(states[p].avoid_same_club && states[p].has_club(&own)));
                let (candidates, _) = narrow(candidates, |&p| {
                    !states[p].clubs.iter().any(|other| ctx.clubs_avoid_each_other(&club, other, &meta))
                });
                let (candidates, _) = narrow(candidates, |&p| states[p].real < target);

                let location_targets: Vec<String> = ctx
                    .wishes_for(&club, &meta)
                    .filter(|w| w.rule_type == RuleType::SameLocation)
                    .flat_map(|w| w.targets_or_self())
                    .collect();
                let mut candidates = if location_targets.is_empty() {
                    candidates
                } else {
                    narrow(candidates, |&p| {
                        states[p]
                            .venue_club
                            .as_deref()
                            .is_some_and(|venue| location_targets.iter().any(|t| same_club(t, venue)))
                    })
                    .0
                };

                let origin = if use_geo { ctx.coordinates(&club) } else { None };
                let distance = |p: usize| origin.zip(states[p].venue).map(|(a, b)| a.distance_km(&b));
                candidates.sort_by(|&a, &b| {
                    states[a]
                        .real
                        .cmp(&states[b].real)
                        .then_with(|| match (distance(a), distance(b)) {
                            (Some(x), Some(y)) => x.total_cmp(&y),
                            (Some(_), None) => Ordering::Less,
                            (None, Some(_)) => Ordering::Greater,
                            (None, None) => Ordering::Equal,
                        })
                        .then(a.cmp(&b))
                });
                candidates[0]
            }
        };

        row.teams[i].pool_id = Some(row.pools[chosen].id.clone());
        let state = &mut states[chosen];
        state.real += 1;
        state.total += 1;
        state.clubs.push(own);
        tracing::debug!(row = %row.id, team = %row.teams[i].id, pool = %row.pools[chosen].id, same_pool = forced.is_some(), "team placed");
    }

    let byes: Vec<usize> = order.iter().copied().filter(|&i| row.teams[i].is_bye && !row.teams[i].is_placed()).collect();
    for i in byes {
        let Some(chosen) = (0..states.len()).min_by_key(|&p| (states[p].total, p)) else {
            break;
        };
        row.teams[i].pool_id = Some(row.pools[chosen].id.clone());
        states[chosen].total += 1;
    }
}
