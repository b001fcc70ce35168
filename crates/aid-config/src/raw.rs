use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Raw YAML representation of the agent config file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RawConfig {
    pub agent_name: Option<String>,
    /// Failures tolerated per object before its sync state turns to error.
    pub max_operation_retry: Option<u32>,
    /// Window within which repeated failures are not accounted again.
    #[serde(default, with = "humantime_serde::option")]
    pub retry_cooldown: Option<Duration>,
}

/// Raw YAML representation of one resource in a snapshot file.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawResource {
    pub kind: String,
    pub identity: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Raw YAML representation of one fault in a snapshot file.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawFault {
    pub parent_kind: String,
    pub parent_identity: Vec<String>,
    pub fault_code: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub description: String,
}

fn default_severity() -> String {
    "warning".to_string()
}

/// Raw YAML representation of a snapshot file: one side's view of the world.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub resources: Vec<RawResource>,
    #[serde(default)]
    pub faults: Vec<RawFault>,
}
