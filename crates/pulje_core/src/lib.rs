//! # pulje_core - Pool assignment engine for youth football tournaments
//!
//! Splits the registered teams of each row into pools, picks a host club per
//! pool, assigns fixture keys and reports every rule the result breaks.
//!
//! ## Features
//! - Seeded, reproducible distribution with best-of-N retries
//! - Host selection through a reorderable filter chain
//! - Conflict evaluation as a pure view, with accepted-conflict ignores
//! - Deterministic remediation suggestions
//! - JSON API and compressed project snapshots
//!
//! ```rust
//! use pulje_core::engine::optimal_pool_config;
//!
//! let config = optimal_pool_config(12);
//! assert_eq!(config.pool_count, 2);
//! assert!(!config.has_warning);
//! ```

#![allow(clippy::doc_lazy_continuation)]
// Engine passes thread several borrowed tables through one call
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod api;
pub mod classify;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod save;

pub use api::{conflicts_json, distribute_json, pool_config_json};
pub use classify::{classify_wishes, Classification, KeywordClassifier, WishClassifier};
pub use config::{EngineConfig, SearchTuning};
pub use data::{ReferenceData, ReferenceFile};
pub use engine::{
    apply_remediation, collect_all_conflicts, distribute_all, distribute_row, distribute_with_retry,
    find_all_non_intersecting_pairs, optimal_pool_config, resolve_keys, suggest_remediations,
    DistributionContext, DistributionMode, Remediation, RetryOutcome, Scope,
};
pub use error::{CoreError, Result};
pub use models::{
    Conflict, ConflictKind, DistributionCriteria, IgnoreList, Pool, Row, RowMeta, RuleType, Team, Wish,
};
pub use save::{Project, ProjectStore, SaveError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
