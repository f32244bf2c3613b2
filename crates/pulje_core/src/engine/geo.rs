//! Pairwise-swap local search on travel distance.
//!
//! Starting from the greedy placement, two teams in different pools trade
//! places whenever that brings both closer to their venues in sum. Stops at a
//! local minimum or after `max_geo_iterations` passes.

use super::context::DistributionContext;
use crate::models::{same_club, GeoPoint, Row, RuleType};

struct Swappable {
    team: usize,
    pool: usize,
    point: GeoPoint,
}

/// Clubs of the real teams in `pool_id`, leaving out team `except`.
fn clubs_except<'a>(row: &'a Row, pool_id: &str, except: usize) -> Vec<&'a str> {
    row.teams
        .iter()
        .enumerate()
        .filter(|(i, t)| *i != except && !t.is_bye && t.is_in(pool_id))
        .map(|(_, t)| t.club.as_str())
        .collect()
}

/// Whether team `mover` may join pool `to`, once team `leaver` has left it.
fn may_join(row: &Row, mover: usize, leaver: usize, to: usize, ctx: &DistributionContext) -> bool {
    let pool = &row.pools[to];
    let club = row.teams[mover].club.as_str();
    let residents = clubs_except(row, &pool.id, leaver);
    if ctx.effective(pool).avoid_same_club && residents.iter().any(|c| same_club(c, club)) {
        return false;
    }
    let meta = row.meta();
    !residents.iter().any(|other| ctx.clubs_avoid_each_other(club, other, &meta))
}

/// Runs the swap search on `row`. Only teams flagged in `movable` move.
/// Returns the number of swaps made.
pub fn optimize_geography(row: &mut Row, movable: &[bool], ctx: &DistributionContext) -> usize {
    if row.pools.len() < 2 || !row.pools.iter().any(|p| ctx.effective(p).use_geographic_proximity) {
        return 0;
    }
    let meta = row.meta();
    let centers: Vec<Option<GeoPoint>> = row
        .pools
        .iter()
        .map(|p| if ctx.effective(p).use_geographic_proximity { ctx.venue_coordinates(row, p) } else { None })
        .collect();

    let mut teams: Vec<Swappable> = row
        .teams
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            movable.get(*i).copied().unwrap_or(false)
                && !t.is_host
                && !t.is_bye
                && !t.is_pinned
                && !ctx.has_rule(&t.club, &meta, RuleType::SamePool)
        })
        .filter_map(|(i, t)| {
            let pool = row.pools.iter().position(|p| t.pool_id.as_deref() == Some(p.id.as_str()))?;
            centers[pool].as_ref()?;
            Some(Swappable { team: i, pool, point: ctx.coordinates(&t.club)? })
        })
        .collect();

    let tolerance = ctx.tuning.geo_tolerance_km;
    let mut swaps = 0;
    for _ in 0..ctx.tuning.max_geo_iterations {
        let mut improved = false;
        for a in 0..teams.len() {
            for b in (a + 1)..teams.len() {
                let (pa, pb) = (teams[a].pool, teams[b].pool);
                if pa == pb {
                    continue;
                }
                let (Some(ca), Some(cb)) = (centers[pa], centers[pb]) else {
                    continue;
                };
                let before = teams[a].point.distance_km(&ca) + teams[b].point.distance_km(&cb);
                let after = teams[a].point.distance_km(&cb) + teams[b].point.distance_km(&ca);
                if after - before >= -tolerance {
                    continue;
                }
                let (ta, tb) = (teams[a].team, teams[b].team);
                if !may_join(row, ta, tb, pb, ctx) || !may_join(row, tb, ta, pa, ctx) {
                    continue;
                }

                row.teams[ta].pool_id = Some(row.pools[pb].id.clone());
                row.teams[tb].pool_id = Some(row.pools[pa].id.clone());
                row.teams[ta].foda_key = None;
                row.teams[tb].foda_key = None;
                teams[a].pool = pb;
                teams[b].pool = pa;
                swaps += 1;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }
    if swaps > 0 {
        tracing::debug!(row = %row.id, swaps, "geographic swaps applied");
    }
    swaps
}
