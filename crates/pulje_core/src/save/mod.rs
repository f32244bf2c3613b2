//! Project files: pretty JSON or a MessagePack + LZ4 snapshot with a SHA-256
//! trailer, versioned and migrated on load.

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, from_json, serialize_and_compress, to_json, Project};
pub use manager::{ProjectFormat, ProjectStore};
pub use migration::migrate_project;

pub const PROJECT_VERSION: u32 = 1;
