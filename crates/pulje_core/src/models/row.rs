//! Rows (tournament divisions) and the structured metadata carried in their names.
//!
//! A row name such as `"U9 B Drenge 5:5 — 26/10"` encodes age group, level,
//! gender, match format and date. [`RowMeta`] is the structured form; when a
//! row carries no explicit meta it is parsed from the name on demand.

use super::criteria::HostFilter;
use super::pool::Pool;
use super::team::{PoolId, RowId, Team};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Year used to validate day/month pairs without a year (leap year so 29/2 parses).
const VALIDATION_YEAR: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchFormat {
    #[serde(rename = "3:3")]
    ThreeVThree,
    #[serde(rename = "5:5")]
    FiveVFive,
    #[serde(rename = "8:8")]
    EightVEight,
}

impl MatchFormat {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "3:3" | "3v3" => Some(Self::ThreeVThree),
            "5:5" | "5v5" => Some(Self::FiveVFive),
            "8:8" | "8v8" => Some(Self::EightVEight),
            _ => None,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::ThreeVThree => "3:3",
            Self::FiveVFive => "5:5",
            Self::EightVEight => "8:8",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Drenge,
    Piger,
    Mix,
}

impl Gender {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "drenge" | "dreng" | "boys" => Some(Self::Drenge),
            "piger" | "pige" | "girls" => Some(Self::Piger),
            "mix" | "mixed" | "mikset" => Some(Self::Mix),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Drenge => "Drenge",
            Self::Piger => "Piger",
            Self::Mix => "Mix",
        };
        write!(f, "{s}")
    }
}

/// Calendar day of a tournament. The year is optional because most row names
/// only carry day and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowDate {
    pub day: u32,
    pub month: u32,
    #[serde(default)]
    pub year: Option<i32>,
}

impl RowDate {
    pub fn new(day: u32, month: u32, year: Option<i32>) -> Option<Self> {
        NaiveDate::from_ymd_opt(year.unwrap_or(VALIDATION_YEAR), month, day)?;
        Some(Self { day, month, year })
    }

    /// Parses `26/10`, `26.10`, `26-10`, `26/10/25`, `26/10/2025` and `2025-10-26`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim_matches(|c: char| !c.is_ascii_digit());
        if let Ok(iso) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            return Some(Self { day: iso.day(), month: iso.month(), year: Some(iso.year()) });
        }
        let parts: Vec<&str> = token.split(['/', '.', '-']).collect();
        if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty() || p.len() > 4) {
            return None;
        }
        let day = parts[0].parse().ok()?;
        let month = parts[1].parse().ok()?;
        let year = match parts.get(2) {
            Some(y) if y.len() == 2 => Some(2000 + y.parse::<i32>().ok()?),
            Some(y) if y.len() == 4 => Some(y.parse::<i32>().ok()?),
            Some(_) => return None,
            None => None,
        };
        Self::new(day, month, year)
    }

    /// Two dates fall on the same day when day and month agree and the years
    /// do not contradict each other.
    pub fn same_day(&self, other: &RowDate) -> bool {
        self.day == other.day
            && self.month == other.month
            && match (self.year, other.year) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Grouping key: day and month, plus the year when known.
    pub fn day_key(&self) -> String {
        match self.year {
            Some(year) => format!("{:02}/{:02}/{year}", self.day, self.month),
            None => format!("{:02}/{:02}", self.day, self.month),
        }
    }
}

impl fmt::Display for RowDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}/{}/{}", self.day, self.month, year),
            None => write!(f, "{}/{}", self.day, self.month),
        }
    }
}

/// Structured view of a row name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMeta {
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub format: Option<MatchFormat>,
    #[serde(default)]
    pub date: Option<RowDate>,
}

impl RowMeta {
    /// Pattern-matches the tokens of a row name. Unrecognized tokens are ignored.
    pub fn parse(name: &str) -> Self {
        let mut meta = RowMeta::default();
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            let raw = tokens[i];
            let token = raw.trim_matches(|c: char| c == ',' || c == '(' || c == ')');
            if meta.age_group.is_none() && is_age_token(token) {
                meta.age_group = Some(token.to_uppercase());
            } else if meta.format.is_none() && MatchFormat::parse(token).is_some() {
                meta.format = MatchFormat::parse(token);
            } else if meta.gender.is_none() && Gender::parse(token).is_some() {
                meta.gender = Gender::parse(token);
            } else if meta.level.is_none() && token.eq_ignore_ascii_case("niveau") {
                if let Some(next) = tokens.get(i + 1) {
                    meta.level = Some(next.to_uppercase());
                    i += 1;
                }
            } else if meta.level.is_none() && is_level_token(token) {
                meta.level = Some(token.to_uppercase());
            } else if meta.date.is_none() {
                if let Some(date) = RowDate::parse(token) {
                    meta.date = Some(date);
                }
            }
            i += 1;
        }
        meta
    }

    /// Canonical row name. `RowMeta::parse(&meta.display_name()) == meta`.
    pub fn display_name(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(age) = &self.age_group {
            parts.push(age.clone());
        }
        if let Some(level) = &self.level {
            if is_level_token(level) {
                parts.push(level.clone());
            } else {
                parts.push(format!("niveau {level}"));
            }
        }
        if let Some(gender) = self.gender {
            parts.push(gender.to_string());
        }
        if let Some(format) = self.format {
            parts.push(format.to_string());
        }
        let mut name = parts.join(" ");
        if let Some(date) = self.date {
            name.push_str(" — ");
            name.push_str(&date.to_string());
        }
        name
    }

    pub fn is_empty(&self) -> bool {
        self.age_group.is_none() && self.gender.is_none() && self.level.is_none()
    }
}

fn is_age_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('U') | Some('u'))
        && token.len() >= 2
        && token.len() <= 3
        && chars.all(|c| c.is_ascii_digit())
}

fn is_level_token(token: &str) -> bool {
    token.len() == 1 && token.chars().all(|c| matches!(c.to_ascii_uppercase(), 'A'..='E'))
}

/// Row name with the date token and any dangling separators removed.
///
/// Used as the identity of a division across tournament days, e.g. for the
/// host history.
pub fn name_without_date(name: &str) -> String {
    let mut kept: Vec<&str> = name
        .split_whitespace()
        .filter(|t| RowDate::parse(t.trim_matches(|c: char| c == ',' || c == '(' || c == ')')).is_none())
        .collect();
    while let Some(last) = kept.last() {
        if last.chars().all(|c| matches!(c, '—' | '–' | '-' | ',' | ':' | '|')) {
            kept.pop();
        } else {
            break;
        }
    }
    kept.join(" ")
}

/// A tournament division: its teams and pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub column_order: Vec<PoolId>,
    /// Explicit metadata; authoritative over the name when present.
    #[serde(default)]
    pub meta: Option<RowMeta>,
    /// Row-specific host filter priority.
    #[serde(default)]
    pub host_filter_order: Option<Vec<HostFilter>>,
}

impl Row {
    pub fn new(id: impl Into<RowId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            teams: Vec::new(),
            pools: Vec::new(),
            column_order: Vec::new(),
            meta: None,
            host_filter_order: None,
        }
    }

    /// Builds a row from structured metadata; the name is derived.
    pub fn from_meta(id: impl Into<RowId>, meta: RowMeta) -> Self {
        let mut row = Self::new(id, meta.display_name());
        row.meta = Some(meta);
        row
    }

    pub fn meta(&self) -> RowMeta {
        self.meta.clone().unwrap_or_else(|| RowMeta::parse(&self.name))
    }

    pub fn name_without_date(&self) -> String {
        match &self.meta {
            Some(meta) => RowMeta { date: None, ..meta.clone() }.display_name(),
            None => name_without_date(&self.name),
        }
    }

    pub fn date(&self) -> Option<RowDate> {
        self.meta().date
    }

    pub fn pool(&self, pool_id: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id == pool_id)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == team_id)
    }

    pub fn teams_in_pool<'a>(&'a self, pool_id: &'a str) -> impl Iterator<Item = &'a Team> + 'a {
        self.teams.iter().filter(move |t| t.is_in(pool_id))
    }

    pub fn host_of(&self, pool_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.is_in(pool_id) && t.is_host)
    }

    pub fn real_team_count(&self) -> usize {
        self.teams.iter().filter(|t| !t.is_bye).count()
    }

    /// Match format of a pool: its override, else the row format.
    pub fn pool_format(&self, pool: &Pool) -> Option<MatchFormat> {
        pool.format_override.or(self.meta().format)
    }

    /// Whether a distributor has anything to do here.
    pub fn is_assignable(&self) -> bool {
        !self.teams.is_empty() && !self.pools.is_empty()
    }

    pub fn add_pool(&mut self, pool: Pool) -> PoolId {
        let id = pool.id.clone();
        self.column_order.push(id.clone());
        self.pools.push(pool);
        id
    }

    /// Removes a pool and releases every team in it, pinned ones included.
    pub fn remove_pool(&mut self, pool_id: &str) -> Option<Pool> {
        let index = self.pools.iter().position(|p| p.id == pool_id)?;
        let pool = self.pools.remove(index);
        self.column_order.retain(|id| id != pool_id);
        for team in self.teams.iter_mut().filter(|t| t.is_in(pool_id)) {
            team.pool_id = None;
            team.is_host = false;
            team.foda_key = None;
            team.is_pinned = false;
        }
        Some(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_name() {
        let meta = RowMeta::parse("U9 B Drenge 5:5 — 26/10");
        assert_eq!(meta.age_group.as_deref(), Some("U9"));
        assert_eq!(meta.level.as_deref(), Some("B"));
        assert_eq!(meta.gender, Some(Gender::Drenge));
        assert_eq!(meta.format, Some(MatchFormat::FiveVFive));
        assert_eq!(meta.date, RowDate::new(26, 10, None));
    }

    #[test]
    fn test_parse_alternative_spellings() {
        let meta = RowMeta::parse("u11 piger niveau 2 8:8 (2.11.2025)");
        assert_eq!(meta.age_group.as_deref(), Some("U11"));
        assert_eq!(meta.gender, Some(Gender::Piger));
        assert_eq!(meta.level.as_deref(), Some("2"));
        assert_eq!(meta.format, Some(MatchFormat::EightVEight));
        assert_eq!(meta.date, RowDate::new(2, 11, Some(2025)));
    }

    #[test]
    fn test_unparseable_name() {
        let meta = RowMeta::parse("Efterårsstævne");
        assert!(meta.is_empty());
        assert_eq!(meta.format, None);
        assert_eq!(meta.date, None);
    }

    #[test]
    fn test_invalid_date_is_ignored() {
        assert_eq!(RowDate::parse("31/02"), None);
        assert_eq!(RowDate::parse("5:5"), None);
        assert!(RowDate::parse("29/2").is_some());
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["U9 B Drenge 5:5 — 26/10", "U12 Mix 8:8", "U7 A Piger 3:3 — 1/5/2026", "U11 Piger niveau 2 8:8"] {
            let meta = RowMeta::parse(name);
            assert_eq!(RowMeta::parse(&meta.display_name()), meta, "{name}");
        }
    }

    #[test]
    fn test_niveau_level_kept_in_display() {
        let meta = RowMeta::parse("U11 Piger niveau 2 8:8");
        assert_eq!(meta.level.as_deref(), Some("2"));
        assert_eq!(meta.display_name(), "U11 niveau 2 Piger 8:8");
    }

    #[test]
    fn test_name_without_date() {
        assert_eq!(name_without_date("U9 B Drenge 5:5 — 26/10"), "U9 B Drenge 5:5");
        assert_eq!(name_without_date("U9 B Drenge 5:5 - 2025-10-26"), "U9 B Drenge 5:5");
        assert_eq!(name_without_date("U10 Piger"), "U10 Piger");
    }

    #[test]
    fn test_explicit_meta_wins() {
        let mut row = Row::new("r1", "whatever");
        row.meta = Some(RowMeta { age_group: Some("U8".into()), ..Default::default() });
        assert_eq!(row.meta().age_group.as_deref(), Some("U8"));
    }

    #[test]
    fn test_same_day() {
        let a = RowDate::new(26, 10, None).unwrap();
        let b = RowDate::new(26, 10, Some(2025)).unwrap();
        let c = RowDate::new(26, 10, Some(2024)).unwrap();
        assert!(a.same_day(&b));
        assert!(!b.same_day(&c));
        assert_eq!(a.day_key(), "26/10");
        assert_eq!(b.day_key(), "26/10/2025");
        assert_ne!(b.day_key(), c.day_key());
    }

    #[test]
    fn test_host_of_outlives_pool_id() {
        let mut row = Row::new("r1", "U9");
        row.add_pool(Pool::new("p1", "Pulje 1"));
        row.teams.push(Team::new("t1", "A 1", "A"));
        row.teams.push(Team::new("t2", "B 1", "B"));
        row.teams.iter_mut().for_each(|t| t.pool_id = Some("p1".into()));
        assert!(row.host_of("p1").is_none());

        row.teams[1].is_host = true;
        let host = {
            let pool_id = format!("p{}", 1);
            row.host_of(&pool_id)
        };
        assert_eq!(host.map(|t| t.id.as_str()), Some("t2"));
    }

    #[test]
    fn test_remove_pool_releases_teams() {
        let mut row = Row::new("r1", "U9");
        row.add_pool(Pool::new("p1", "Pulje 1"));
        row.add_pool(Pool::new("p2", "Pulje 2"));
        row.teams.push(Team::new("t1", "OB", "OB").in_pool("p1").as_host());
        row.teams.push(Team::new("t2", "B93", "B93").in_pool("p2"));

        row.remove_pool("p1");
        assert_eq!(row.column_order, vec!["p2".to_string()]);
        assert_eq!(row.team("t1").unwrap().pool_id, None);
        assert!(!row.team("t1").unwrap().is_host);
        assert!(row.team("t2").unwrap().is_in("p2"));
    }
}
