//! Reference data: built-in templates and loaders for club, geo and history tables.

pub mod embedded;
pub mod reference;

pub use embedded::{default_templates, DEFAULT_TEMPLATES_JSON};
pub use reference::{ReferenceData, ReferenceFile};
