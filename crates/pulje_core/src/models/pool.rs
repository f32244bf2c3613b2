use super::criteria::CriteriaOverride;
use super::row::MatchFormat;
use super::team::PoolId;
use serde::{Deserialize, Serialize};

/// Who provides the venue for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostMode {
    /// One of the playing teams hosts.
    #[default]
    Host,
    /// A non-playing organizer club provides the venue.
    Organizer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    #[serde(default)]
    pub template_key: Option<String>,
    #[serde(default)]
    pub host_mode: HostMode,
    #[serde(default)]
    pub organizer_club: Option<String>,
    #[serde(default)]
    pub format_override: Option<MatchFormat>,
    #[serde(default)]
    pub specific_criteria: Option<CriteriaOverride>,
}

impl Pool {
    pub fn new(id: impl Into<PoolId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            template_key: None,
            host_mode: HostMode::Host,
            organizer_club: None,
            format_override: None,
            specific_criteria: None,
        }
    }

    pub fn organized_by(mut self, club: impl Into<String>) -> Self {
        self.host_mode = HostMode::Organizer;
        self.organizer_club = Some(club.into());
        self
    }

    pub fn with_template(mut self, template_key: impl Into<String>) -> Self {
        self.template_key = Some(template_key.into());
        self
    }

    pub fn with_criteria(mut self, criteria: CriteriaOverride) -> Self {
        self.specific_criteria = Some(criteria);
        self
    }

    pub fn is_organizer_mode(&self) -> bool {
        self.host_mode == HostMode::Organizer
    }
}
