//! Fixture-key templates: who meets whom inside a pool of a given size.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Meeting matrix for one pool size. `matrix[i][j]` is the number of times
/// key `i + 1` meets key `j + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureTemplate {
    pub size: usize,
    /// Fields needed to play the template; derived from the size when absent.
    #[serde(default)]
    pub fields: Option<u32>,
    pub matrix: Vec<Vec<u32>>,
}

impl FixtureTemplate {
    pub fn new(matrix: Vec<Vec<u32>>) -> Self {
        Self { size: matrix.len(), fields: None, matrix }
    }

    /// Every key meets every other key once.
    pub fn round_robin(size: usize) -> Self {
        let matrix =
            (0..size).map(|i| (0..size).map(|j| u32::from(i != j)).collect()).collect();
        Self::new(matrix)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| CoreError::InvalidTemplate { name: name.to_string(), reason };
        if self.size == 0 {
            return Err(invalid("size must be at least 1".to_string()));
        }
        if self.matrix.len() != self.size {
            return Err(invalid(format!("declared size {} but {} matrix rows", self.size, self.matrix.len())));
        }
        for (i, row) in self.matrix.iter().enumerate() {
            if row.len() != self.size {
                return Err(invalid(format!("matrix row {} has {} columns", i + 1, row.len())));
            }
            if row[i] != 0 {
                return Err(invalid(format!("key {} meets itself", i + 1)));
            }
            for (j, &value) in row.iter().enumerate() {
                if self.matrix[j][i] != value {
                    return Err(invalid(format!("matrix is not symmetric at ({}, {})", i + 1, j + 1)));
                }
            }
        }
        Ok(())
    }

    /// Whether two 1-based keys ever meet. Out-of-range keys never meet.
    pub fn meets(&self, a: u32, b: u32) -> bool {
        let (Some(i), Some(j)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.matrix[i][j] > 0
    }

    fn index(&self, key: u32) -> Option<usize> {
        let key = key as usize;
        (1..=self.size).contains(&key).then(|| key - 1)
    }

    /// Total matches per key.
    pub fn row_sums(&self) -> Vec<u32> {
        self.matrix.iter().map(|row| row.iter().sum()).collect()
    }

    /// Simultaneous matches the template needs fields for.
    pub fn required_fields(&self) -> u32 {
        self.fields.unwrap_or_else(|| ((self.size / 2) as u32).max(1))
    }
}

/// All templates known to the engine plus the per-size defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLibrary {
    #[serde(default)]
    pub templates: BTreeMap<String, FixtureTemplate>,
    /// Pool size -> default template name.
    #[serde(default)]
    pub defaults: BTreeMap<usize, String>,
    /// Template name -> key the host always gets.
    #[serde(default)]
    pub host_key_overrides: BTreeMap<String, u32>,
}

impl TemplateLibrary {
    pub fn validate(&self) -> Result<()> {
        for (name, template) in &self.templates {
            template.validate(name)?;
        }
        for (size, name) in &self.defaults {
            let template = self
                .templates
                .get(name)
                .ok_or_else(|| CoreError::NotFound(format!("default template '{name}' for size {size}")))?;
            if template.size != *size {
                return Err(CoreError::InvalidTemplate {
                    name: name.clone(),
                    reason: format!("registered as default for size {size} but has size {}", template.size),
                });
            }
        }
        for (name, key) in &self.host_key_overrides {
            if let Some(template) = self.templates.get(name) {
                if *key == 0 || *key as usize > template.size {
                    return Err(CoreError::InvalidTemplate {
                        name: name.clone(),
                        reason: format!("host key override {key} out of range"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FixtureTemplate> {
        self.templates.get(name)
    }

    /// Adds templates and defaults from `other`; entries in `other` win.
    pub fn merge(&mut self, other: TemplateLibrary) {
        self.templates.extend(other.templates);
        self.defaults.extend(other.defaults);
        self.host_key_overrides.extend(other.host_key_overrides);
    }

    /// Template for a pool with `size` teams.
    ///
    /// The stored key is used only when its size still matches; otherwise the
    /// size default, and as a last resort a plain round robin.
    pub fn resolve(&self, template_key: Option<&str>, size: usize) -> ResolvedTemplate {
        if let Some(key) = template_key {
            if let Some(template) = self.templates.get(key).filter(|t| t.size == size) {
                return ResolvedTemplate { name: Some(key.to_string()), template: template.clone() };
            }
            tracing::debug!(template = key, size, "template size mismatch, using default");
        }
        if let Some(name) = self.defaults.get(&size) {
            if let Some(template) = self.templates.get(name) {
                return ResolvedTemplate { name: Some(name.clone()), template: template.clone() };
            }
        }
        ResolvedTemplate { name: None, template: FixtureTemplate::round_robin(size) }
    }

    pub fn host_key_override(&self, name: Option<&str>) -> Option<u32> {
        name.and_then(|n| self.host_key_overrides.get(n)).copied()
    }
}

/// A template chosen for a live pool, with the library name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub name: Option<String>,
    pub template: FixtureTemplate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_with_gaps() -> FixtureTemplate {
        // Each key meets four of the five others
        FixtureTemplate::new(vec![
            vec![0, 1, 1, 1, 1, 0],
            vec![1, 0, 1, 1, 0, 1],
            vec![1, 1, 0, 0, 1, 1],
            vec![1, 1, 0, 0, 1, 1],
            vec![1, 0, 1, 1, 0, 1],
            vec![0, 1, 1, 1, 1, 0],
        ])
    }

    #[test]
    fn test_validate_rejects_asymmetric() {
        let mut template = six_with_gaps();
        template.matrix[0][1] = 2;
        assert!(matches!(template.validate("bad"), Err(CoreError::InvalidTemplate { .. })));
        assert!(six_with_gaps().validate("ok").is_ok());
    }

    #[test]
    fn test_meets() {
        let template = six_with_gaps();
        assert!(template.meets(1, 2));
        assert!(!template.meets(1, 6));
        assert!(!template.meets(0, 1));
        assert!(!template.meets(1, 7));
    }

    #[test]
    fn test_resolve_falls_back_on_size_drift() {
        let mut library = TemplateLibrary::default();
        library.templates.insert("6-gaps".into(), six_with_gaps());
        library.templates.insert("5-rr".into(), FixtureTemplate::round_robin(5));
        library.defaults.insert(5, "5-rr".into());

        assert_eq!(library.resolve(Some("6-gaps"), 6).name.as_deref(), Some("6-gaps"));
        assert_eq!(library.resolve(Some("6-gaps"), 5).name.as_deref(), Some("5-rr"));

        let synthesized = library.resolve(None, 4);
        assert_eq!(synthesized.name, None);
        assert_eq!(synthesized.template, FixtureTemplate::round_robin(4));
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(FixtureTemplate::round_robin(5).required_fields(), 2);
        assert_eq!(FixtureTemplate::round_robin(1).required_fields(), 1);
        let mut t = FixtureTemplate::round_robin(6);
        t.fields = Some(2);
        assert_eq!(t.required_fields(), 2);
    }

    #[test]
    fn test_library_validation_checks_defaults() {
        let mut library = TemplateLibrary::default();
        library.templates.insert("5-rr".into(), FixtureTemplate::round_robin(5));
        library.defaults.insert(6, "5-rr".into());
        assert!(library.validate().is_err());
    }
}
