//! Read-only reference tables consumed by the engine.
//!
//! A reference file carries the club list, coordinates, extra fixture
//! templates and the host history. JSON and YAML are both accepted.

use super::embedded::default_templates;
use crate::error::{CoreError, Result};
use crate::models::{
    ClubDirectory, ClubInfo, GeoLookup, GeoPoint, HostHistoryRecord, MatchFormat, TemplateLibrary,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk shape of the reference tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceFile {
    pub clubs: Vec<ClubInfo>,
    pub geo: GeoLookup,
    pub templates: TemplateLibrary,
    pub history: Vec<HostHistoryRecord>,
}

/// Lookup tables ready for the engine.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub clubs: ClubDirectory,
    pub geo: GeoLookup,
    pub templates: TemplateLibrary,
    pub history: Vec<HostHistoryRecord>,
}

impl ReferenceData {
    /// Builds the tables on top of the built-in templates. Templates from the
    /// file replace built-ins with the same name.
    pub fn from_file(file: ReferenceFile) -> Result<Self> {
        let mut templates = default_templates().clone();
        templates.merge(file.templates);
        templates.validate()?;

        Ok(Self { clubs: ClubDirectory::new(file.clubs), geo: file.geo, templates, history: file.history })
    }

    /// Built-in templates only.
    pub fn builtin() -> Self {
        Self { templates: default_templates().clone(), ..Default::default() }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_file(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_file(serde_yaml::from_str(yaml)?)
    }

    /// Reads a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
        let data = match extension.as_str() {
            "json" => Self::from_json_str(&content)?,
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            other => {
                return Err(CoreError::InvalidParameter(format!(
                    "unsupported reference file extension '{other}' ({})",
                    path.display()
                )))
            }
        };
        tracing::info!(
            path = %path.display(),
            clubs = data.clubs.len(),
            templates = data.templates.templates.len(),
            history = data.history.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn coordinates(&self, club: &str) -> Option<GeoPoint> {
        self.clubs.coordinates(club, &self.geo)
    }

    pub fn capacity(&self, club: &str, format: MatchFormat) -> Option<u32> {
        self.clubs.capacity(club, format)
    }
}
