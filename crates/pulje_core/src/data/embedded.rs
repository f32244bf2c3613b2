//! Built-in fixture-key templates.
//!
//! `include_str!` puts the JSON in the binary so a project without its own
//! template sheet still gets sensible defaults for pool sizes 3 to 7.

use crate::models::TemplateLibrary;
use std::sync::OnceLock;

// ============================================================================
// Embedded JSON
// ============================================================================

/// Default templates, one per pool size 3-7 plus a full round robin for 6
pub const DEFAULT_TEMPLATES_JSON: &str = include_str!("../../../../data/default_templates.json");

static DEFAULT_TEMPLATES: OnceLock<TemplateLibrary> = OnceLock::new();

/// Built-in template library.
///
/// Parsed on first call, cached afterwards.
///
/// # Panics
///
/// If the embedded JSON is corrupted; covered by tests.
pub fn default_templates() -> &'static TemplateLibrary {
    DEFAULT_TEMPLATES.get_or_init(|| {
        serde_json::from_str(DEFAULT_TEMPLATES_JSON).expect("Embedded default templates JSON is corrupted")
    })
}
