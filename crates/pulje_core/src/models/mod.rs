//! Tournament data model: rows, pools, teams, wishes and reference tables.

pub mod club;
pub mod conflict;
pub mod criteria;
pub mod history;
pub mod ignore;
pub mod pool;
pub mod row;
pub mod team;
pub mod template;
pub mod wish;

pub use club::{normalize_club, same_club, ClubDirectory, ClubInfo, GeoLookup, GeoPoint};
pub use conflict::{count_unresolved, Conflict, ConflictKind, HostedPool};
pub use criteria::{
    CriteriaOverride, DistributionCriteria, EffectiveCriteria, HostFilter, HostFilterSettings,
};
pub use history::{previous_host_record, HostHistoryRecord};
pub use ignore::{IgnoreEntry, IgnoreKey, IgnoreList};
pub use pool::{HostMode, Pool};
pub use row::{name_without_date, Gender, MatchFormat, Row, RowDate, RowMeta};
pub use team::{PoolId, RowId, Team, TeamId, BYE_CLUB};
pub use template::{FixtureTemplate, ResolvedTemplate, TemplateLibrary};
pub use wish::{applicable_wishes, group_by_kategori, has_rule, RuleType, Wish};
