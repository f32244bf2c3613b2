//! Everything a distribution or evaluation pass reads, passed explicitly.

use crate::config::SearchTuning;
use crate::data::ReferenceData;
use crate::models::{
    applicable_wishes, normalize_club, DistributionCriteria, EffectiveCriteria, GeoPoint, HostFilter,
    HostFilterSettings, IgnoreList, MatchFormat, Pool, ResolvedTemplate, Row, RowMeta, RuleType, Wish,
};

static NO_IGNORES: IgnoreList = IgnoreList::new();

/// Read-only inputs of the engine.
///
/// Holds references only; building one is free and every engine function
/// takes it by reference.
#[derive(Debug, Clone, Copy)]
pub struct DistributionContext<'a> {
    pub criteria: &'a DistributionCriteria,
    pub reference: &'a ReferenceData,
    pub wishes: &'a [Wish],
    pub ignores: &'a IgnoreList,
    pub tuning: SearchTuning,
}

impl<'a> DistributionContext<'a> {
    pub fn new(criteria: &'a DistributionCriteria, reference: &'a ReferenceData) -> Self {
        Self { criteria, reference, wishes: &[], ignores: &NO_IGNORES, tuning: SearchTuning::default() }
    }

    pub fn with_wishes(mut self, wishes: &'a [Wish]) -> Self {
        self.wishes = wishes;
        self
    }

    pub fn with_ignores(mut self, ignores: &'a IgnoreList) -> Self {
        self.ignores = ignores;
        self
    }

    pub fn with_tuning(mut self, tuning: SearchTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn effective(&self, pool: &Pool) -> EffectiveCriteria {
        self.criteria.for_pool(pool)
    }

    pub fn wishes_for<'b>(&'b self, club: &'b str, meta: &'b RowMeta) -> impl Iterator<Item = &'b Wish> + 'b {
        applicable_wishes(self.wishes, club, meta)
    }

    pub fn has_rule(&self, club: &str, meta: &RowMeta, rule: RuleType) -> bool {
        self.wishes_for(club, meta).any(|w| w.rule_type == rule)
    }

    /// Whether `club` has an active AVOID_CLUB wish naming `other` (or the reverse).
    pub fn clubs_avoid_each_other(&self, club: &str, other: &str, meta: &RowMeta) -> bool {
        if normalize_club(club) == normalize_club(other) {
            return false;
        }
        let avoids = |from: &str, to: &str| {
            self.wishes_for(from, meta).any(|w| w.rule_type == RuleType::AvoidClub && w.references_club(to))
        };
        avoids(club, other) || avoids(other, club)
    }

    pub fn coordinates(&self, club: &str) -> Option<GeoPoint> {
        self.reference.coordinates(club)
    }

    pub fn capacity(&self, club: &str, format: MatchFormat) -> Option<u32> {
        self.reference.capacity(club, format)
    }

    /// Host filter priority for a row: its own order if set, else the global one.
    pub fn host_filter_order(&self, row: &Row) -> Vec<HostFilter> {
        let order = row.host_filter_order.as_deref().unwrap_or(&self.criteria.host_filters.order);
        HostFilterSettings::normalized_order(order)
    }

    /// Club providing the venue: the organizer, else the host team's club.
    pub fn venue_club(&self, row: &Row, pool: &Pool) -> Option<String> {
        if pool.is_organizer_mode() {
            return pool.organizer_club.clone();
        }
        row.host_of(&pool.id).map(|t| t.club.clone())
    }

    pub fn venue_coordinates(&self, row: &Row, pool: &Pool) -> Option<GeoPoint> {
        self.venue_club(row, pool).and_then(|club| self.coordinates(&club))
    }

    /// Template for the pool's live team count, byes included.
    pub fn template_for(&self, row: &Row, pool: &Pool) -> ResolvedTemplate {
        let size = row.teams_in_pool(&pool.id).count();
        self.template_for_size(pool, size)
    }

    pub fn template_for_size(&self, pool: &Pool, size: usize) -> ResolvedTemplate {
        self.reference.templates.resolve(pool.template_key.as_deref(), size)
    }
}
