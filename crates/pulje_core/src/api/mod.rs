pub mod json_api;

pub use json_api::{
    conflicts_json, distribute_json, pool_config_json, ConflictReport, ConflictsRequest, ConflictsResponse,
    DistributeRequest, DistributeResponse, PoolConfigRequest, PoolConfigResponse,
};
