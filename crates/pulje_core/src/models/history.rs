use super::club::{normalize_club, same_club};
use serde::{Deserialize, Serialize};

/// A club that hosted a division at earlier tournaments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostHistoryRecord {
    pub row_name_without_date: String,
    pub club: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub dates: Vec<String>,
}

impl HostHistoryRecord {
    pub fn matches(&self, club: &str, row_name_without_date: &str) -> bool {
        same_club(&self.club, club)
            && normalize_club(&self.row_name_without_date) == normalize_club(row_name_without_date)
    }
}

pub fn previous_host_record<'a>(
    history: &'a [HostHistoryRecord],
    club: &str,
    row_name_without_date: &str,
) -> Option<&'a HostHistoryRecord> {
    history.iter().find(|r| r.matches(club, row_name_without_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_case_and_space_insensitive() {
        let record = HostHistoryRecord {
            row_name_without_date: "U9 B  Drenge 5:5".into(),
            club: "OB".into(),
            count: 2,
            dates: vec!["12/10".into()],
        };
        assert!(record.matches("ob", "u9 b drenge 5:5"));
        assert!(!record.matches("B93", "U9 B Drenge 5:5"));
        assert!(previous_host_record(&[record], "OB", "U9 B Drenge 5:5").is_some());
    }
}
