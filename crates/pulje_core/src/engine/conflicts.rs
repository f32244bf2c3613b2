//! Constraint evaluation.
//!
//! Conflicts are derived from the current rows every time they are asked
//! for. Nothing here mutates or caches state, so two calls on the same input
//! always agree.

use super::context::DistributionContext;
use crate::models::{
    normalize_club, previous_host_record, Conflict, ConflictKind, HostedPool, IgnoreKey, IgnoreList, MatchFormat,
    Pool, Row, RowDate, RuleType,
};
use std::collections::HashSet;

/// A pool venue: the host team's club, or the organizer.
#[derive(Debug, Clone)]
struct Venue {
    club: String,
    club_key: String,
    row: usize,
    pool_id: String,
    date: Option<RowDate>,
    /// Same-day grouping key, see [`assign_day_keys`].
    day: Option<String>,
    organizer: bool,
    format: Option<MatchFormat>,
    required_fields: u32,
}

impl Venue {
    fn hosted(&self, rows: &[Row]) -> HostedPool {
        HostedPool { row_id: rows[self.row].id.clone(), pool_id: self.pool_id.clone() }
    }

    fn day_key(&self) -> Option<String> {
        self.day.clone()
    }

    /// Date bucket for capacity grouping; undated rows form their own bucket.
    fn capacity_bucket(&self, rows: &[Row]) -> String {
        self.day_key().unwrap_or_else(|| format!("row:{}", rows[self.row].id))
    }
}

fn venues(rows: &[Row], ctx: &DistributionContext) -> Vec<Venue> {
    let mut out = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let meta = row.meta();
        for pool in &row.pools {
            let Some(club) = ctx.venue_club(row, pool) else {
                continue;
            };
            out.push(Venue {
                club_key: normalize_club(&club),
                club,
                row: index,
                pool_id: pool.id.clone(),
                date: meta.date,
                day: None,
                organizer: pool.is_organizer_mode(),
                format: row.pool_format(pool),
                required_fields: ctx.template_for(row, pool).template.required_fields(),
            });
        }
    }
    assign_day_keys(&mut out);
    out
}

/// Dates with a year keep their own key; a year-less date joins the first
/// dated venue on the same day and month, matching [`RowDate::same_day`].
fn assign_day_keys(venues: &mut [Venue]) {
    let keys: Vec<Option<String>> = venues
        .iter()
        .map(|v| {
            let date = v.date?;
            if date.year.is_some() {
                return Some(date.day_key());
            }
            let anchor = venues
                .iter()
                .filter_map(|other| other.date)
                .find(|other| other.year.is_some() && other.same_day(&date))
                .unwrap_or(date);
            Some(anchor.day_key())
        })
        .collect();
    for (venue, key) in venues.iter_mut().zip(keys) {
        venue.day = key;
    }
}

/// Groups items by key, keeping first-appearance order of keys and items.
fn group_by<T, K: PartialEq>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<(K, Vec<T>)> {
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, list)) => list.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

/// Pools currently hosted in the scope of an ignore key, sorted.
pub fn host_signature(key: &IgnoreKey, rows: &[Row], ctx: &DistributionContext) -> Vec<HostedPool> {
    let mut hosted: Vec<HostedPool> = venues(rows, ctx)
        .into_iter()
        .filter(|v| match key {
            IgnoreKey::HostDate { club, date } => {
                !v.organizer && v.club_key == *club && v.day_key().as_deref() == Some(date.as_str())
            }
            IgnoreKey::HostPrevious { club, row_name } => {
                !v.organizer && v.club_key == *club && normalize_club(&rows[v.row].name_without_date()) == *row_name
            }
            IgnoreKey::HostMultiPool { club } => !v.organizer && v.club_key == *club,
            IgnoreKey::BaneCapacity { club, date, format } => {
                v.club_key == *club && v.capacity_bucket(rows) == *date && v.format == Some(*format)
            }
        })
        .map(|v| v.hosted(rows))
        .collect();
    hosted.sort();
    hosted
}

/// Drops ignore entries whose host set changed since they were accepted.
pub fn prune_ignores(ignores: &mut IgnoreList, rows: &[Row], ctx: &DistributionContext) -> usize {
    let dropped = ignores.retain_current(|key| host_signature(key, rows, ctx));
    if dropped > 0 {
        tracing::info!(dropped, "stale ignore entries removed");
    }
    dropped
}

fn club_duplications(row: &Row, pool: &Pool, ctx: &DistributionContext, out: &mut Vec<Conflict>) {
    let meta = row.meta();
    let template = ctx.template_for(row, pool).template;
    let size = template.size as u32;
    let real = row.teams_in_pool(&pool.id).filter(|t| !t.is_bye);
    for (_, teams) in group_by(real, |t| normalize_club(&t.club)) {
        if teams.len() < 2 {
            continue;
        }
        let club = teams[0].club.clone();
        if ctx.has_rule(&club, &meta, RuleType::SamePool) {
            continue;
        }
        let keys: Vec<Option<u32>> = teams.iter().map(|t| t.foda_key).collect();
        let resolved = match keys.iter().copied().collect::<Option<Vec<u32>>>() {
            Some(keys) => {
                let distinct = keys.iter().collect::<HashSet<_>>().len() == keys.len();
                let in_range = keys.iter().all(|k| (1..=size).contains(k));
                let apart = keys.iter().enumerate().all(|(i, a)| keys[i + 1..].iter().all(|b| !template.meets(*a, *b)));
                distinct && in_range && apart
            }
            None => false,
        };
        let message = format!("{club} has {} teams in {}", teams.len(), pool.name);
        let kind = ConflictKind::ClubDuplication { club, team_ids: teams.iter().map(|t| t.id.clone()).collect(), keys };
        let mut conflict = Conflict::new(kind, &row.id, &pool.id, message);
        conflict.resolved = resolved;
        out.push(conflict);
    }
}

fn avoid_club_violations(row: &Row, pool: &Pool, ctx: &DistributionContext, out: &mut Vec<Conflict>) {
    let meta = row.meta();
    let teams: Vec<_> = row.teams_in_pool(&pool.id).filter(|t| !t.is_bye).collect();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for team in &teams {
        for wish in ctx.wishes_for(&team.club, &meta).filter(|w| w.rule_type == RuleType::AvoidClub) {
            for other in &teams {
                let other_key = normalize_club(&other.club);
                if other_key == normalize_club(&team.club) || !wish.references_club(&other.club) {
                    continue;
                }
                if !seen.insert((wish.id.clone(), other_key)) {
                    continue;
                }
                let message = format!("{} shares {} with {}, which it asked to avoid", team.club, pool.name, other.club);
                let kind = ConflictKind::AvoidClub {
                    club: team.club.clone(),
                    avoided_club: other.club.clone(),
                    team_id: team.id.clone(),
                    wish_id: wish.id.clone(),
                };
                out.push(Conflict::new(kind, &row.id, &pool.id, message));
            }
        }
    }
}

/// Every conflict of the pools in `rows`, with cross-row host checks run
/// against `all_rows`. `rows` is the reporting scope and is usually a subset
/// of `all_rows`.
pub fn collect_all_conflicts(rows: &[Row], all_rows: &[Row], ctx: &DistributionContext) -> Vec<Conflict> {
    let mut out = Vec::new();
    for row in rows {
        for pool in &row.pools {
            club_duplications(row, pool, ctx, &mut out);
            avoid_club_violations(row, pool, ctx, &mut out);
        }
    }

    let scope: HashSet<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let in_scope = |v: &Venue| scope.contains(all_rows[v.row].id.as_str());
    let all_venues = venues(all_rows, ctx);
    let playing: Vec<&Venue> = all_venues.iter().filter(|v| !v.organizer).collect();
    let forced = |v: &Venue| ctx.has_rule(&v.club, &all_rows[v.row].meta(), RuleType::ForceHost);

    // Same club hosting twice on one day
    let mut date_reported: HashSet<HostedPool> = HashSet::new();
    let dated = playing.iter().copied().filter(|v| v.date.is_some());
    for ((club_key, day), group) in group_by(dated, |v| (v.club_key.clone(), v.day_key())) {
        if group.len() < 2 {
            continue;
        }
        let day = day.unwrap_or_default();
        let pools: Vec<HostedPool> = group.iter().map(|v| v.hosted(all_rows)).collect();
        date_reported.extend(pools.iter().cloned());
        let key = IgnoreKey::host_date(&club_key, &day);
        if ctx.ignores.suppresses(&key, &pools) {
            continue;
        }
        for venue in group.iter().filter(|v| in_scope(v) && !forced(v)) {
            let message = format!("{} hosts {} pools on {day}", venue.club, pools.len());
            let kind = ConflictKind::HostDate { club: venue.club.clone(), date: day.clone(), pools: pools.clone() };
            out.push(Conflict::new(kind, &all_rows[venue.row].id, &venue.pool_id, message));
        }
    }

    // Club hosted this division before
    for venue in playing.iter().filter(|v| in_scope(v) && !forced(v)) {
        let row = &all_rows[venue.row];
        let name = row.name_without_date();
        let Some(record) = previous_host_record(&ctx.reference.history, &venue.club, &name) else {
            continue;
        };
        let key = IgnoreKey::host_previous(&venue.club, &name);
        if ctx.ignores.suppresses(&key, &host_signature(&key, all_rows, ctx)) {
            continue;
        }
        let message = format!("{} hosted {name} before", venue.club);
        let kind = ConflictKind::HostPrevious {
            club: venue.club.clone(),
            row_name: name.clone(),
            previous_dates: record.dates.clone(),
        };
        out.push(Conflict::new(kind, &row.id, &venue.pool_id, message));
    }

    // Club hosting more than one pool anywhere
    for (club_key, group) in group_by(playing.iter().copied(), |v| v.club_key.clone()) {
        if group.len() < 2 {
            continue;
        }
        let pools: Vec<HostedPool> = group.iter().map(|v| v.hosted(all_rows)).collect();
        let key = IgnoreKey::host_multi_pool(&club_key);
        if ctx.ignores.suppresses(&key, &pools) {
            continue;
        }
        for venue in group.iter().skip(1) {
            let hosted = venue.hosted(all_rows);
            if !in_scope(venue) || date_reported.contains(&hosted) {
                continue;
            }
            let message = format!("{} hosts {} pools", venue.club, pools.len());
            let kind = ConflictKind::HostMultiPool { club: venue.club.clone(), pools: pools.clone() };
            out.push(Conflict::new(kind, &hosted.row_id, &hosted.pool_id, message));
        }
    }

    // Field capacity per venue, day and format
    let formatted = all_venues.iter().filter(|v| v.format.is_some());
    for ((club_key, bucket, format), group) in
        group_by(formatted, |v| (v.club_key.clone(), v.capacity_bucket(all_rows), v.format))
    {
        let Some(format) = format else { continue };
        let Some(capacity) = ctx.capacity(&group[0].club, format) else {
            continue;
        };
        let required: u32 = group.iter().map(|v| v.required_fields).sum();
        if required <= capacity {
            continue;
        }
        let pools: Vec<HostedPool> = group.iter().map(|v| v.hosted(all_rows)).collect();
        let key = IgnoreKey::bane_capacity(&club_key, &bucket, format);
        if ctx.ignores.suppresses(&key, &pools) {
            continue;
        }
        let Some(first) = group.iter().find(|v| in_scope(v)) else {
            continue;
        };
        let message = format!("{} needs {required} {format} fields but has {capacity}", first.club);
        let kind = ConflictKind::BaneCapacity { club: first.club.clone(), date: bucket, format, required, capacity, pools };
        out.push(Conflict::new(kind, &all_rows[first.row].id, &first.pool_id, message));
    }

    out
}
