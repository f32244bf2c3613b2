//! Club reference data: field capacities and geographic lookup.

use super::row::MatchFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean earth radius used by the haversine distance (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Canonical form of a club name for comparisons.
///
/// Trims, lower-cases and collapses inner whitespace, so "OB " and "ob" match.
pub fn normalize_club(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub fn same_club(a: &str, b: &str) -> bool {
    normalize_club(a) == normalize_club(b)
}

/// One club from the club list.
///
/// Capacities are kept as the raw strings from the source sheet; use
/// [`ClubInfo::capacity`] for the parsed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClubInfo {
    pub name: String,
    #[serde(default)]
    pub p3: String,
    #[serde(default)]
    pub p5: String,
    #[serde(default)]
    pub p8: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ClubInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_capacity(mut self, p3: u32, p5: u32, p8: u32) -> Self {
        self.p3 = p3.to_string();
        self.p5 = p5.to_string();
        self.p8 = p8.to_string();
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Registered field count for a format. `None` when the sheet cell is empty
    /// or not a number.
    pub fn capacity(&self, format: MatchFormat) -> Option<u32> {
        let raw = match format {
            MatchFormat::ThreeVThree => &self.p3,
            MatchFormat::FiveVFive => &self.p5,
            MatchFormat::EightVEight => &self.p8,
        };
        parse_capacity(raw)
    }
}

/// Leading integer of a capacity cell ("2", "2 baner", " 3 ").
fn parse_capacity(raw: &str) -> Option<u32> {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Club and postal code coordinates.
///
/// A club-level entry wins over the postal code of the club's [`ClubInfo`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLookup {
    #[serde(default)]
    pub postal_codes: BTreeMap<String, GeoPoint>,
    #[serde(default)]
    pub clubs: BTreeMap<String, GeoPoint>,
}

/// Club list indexed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct ClubDirectory {
    clubs: BTreeMap<String, ClubInfo>,
}

impl ClubDirectory {
    pub fn new(clubs: impl IntoIterator<Item = ClubInfo>) -> Self {
        let clubs = clubs.into_iter().map(|c| (normalize_club(&c.name), c)).collect();
        Self { clubs }
    }

    pub fn get(&self, club: &str) -> Option<&ClubInfo> {
        self.clubs.get(&normalize_club(club))
    }

    pub fn capacity(&self, club: &str, format: MatchFormat) -> Option<u32> {
        self.get(club).and_then(|c| c.capacity(format))
    }

    pub fn names(&self) -> Vec<String> {
        self.clubs.values().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.clubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty()
    }

    pub fn coordinates(&self, club: &str, geo: &GeoLookup) -> Option<GeoPoint> {
        let key = normalize_club(club);
        if let Some(point) = geo.clubs.iter().find(|(name, _)| normalize_club(name) == key) {
            return Some(*point.1);
        }
        let postal = self.clubs.get(&key)?.postal_code.as_ref()?;
        geo.postal_codes.get(postal.trim()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_club() {
        assert_eq!(normalize_club("  Boldklubben   Frem "), "boldklubben frem");
        assert!(same_club("OB", "ob"));
        assert!(!same_club("OB", "B93"));
    }

    #[test]
    fn test_capacity_parsing() {
        let mut club = ClubInfo::new("OB");
        club.p3 = "4 baner".to_string();
        club.p5 = " 2".to_string();
        club.p8 = "".to_string();

        assert_eq!(club.capacity(MatchFormat::ThreeVThree), Some(4));
        assert_eq!(club.capacity(MatchFormat::FiveVFive), Some(2));
        assert_eq!(club.capacity(MatchFormat::EightVEight), None);
    }

    #[test]
    fn test_haversine_distance() {
        // Odense -> Copenhagen is roughly 140 km as the crow flies
        let odense = GeoPoint::new(55.4038, 10.4024);
        let copenhagen = GeoPoint::new(55.6761, 12.5683);
        let d = odense.distance_km(&copenhagen);
        assert!((130.0..145.0).contains(&d), "distance was {d}");
        assert!(odense.distance_km(&odense) < 1e-9);
    }

    #[test]
    fn test_coordinates_prefer_club_override() {
        let dir = ClubDirectory::new(vec![
            ClubInfo::new("OB").with_postal_code("5000"),
            ClubInfo::new("B1909").with_postal_code("5200"),
        ]);
        let mut geo = GeoLookup::default();
        geo.postal_codes.insert("5000".into(), GeoPoint::new(55.40, 10.40));
        geo.postal_codes.insert("5200".into(), GeoPoint::new(55.38, 10.34));
        geo.clubs.insert("ob".into(), GeoPoint::new(1.0, 2.0));

        assert_eq!(dir.coordinates("OB", &geo), Some(GeoPoint::new(1.0, 2.0)));
        assert_eq!(dir.coordinates("B1909", &geo), Some(GeoPoint::new(55.38, 10.34)));
        assert_eq!(dir.coordinates("Unknown", &geo), None);
    }
}
