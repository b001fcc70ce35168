use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-object synchronization marker kept in the intent store.
///
/// Transitions:
///   Pending → Synced        (push acknowledged)
///   Pending | Synced → Error (retries exhausted or operation surrendered)
///   Error → Synced          (a later push succeeds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Pending,
    Synced,
    Error,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncState::Pending => "pending",
            SyncState::Synced => "synced",
            SyncState::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultSeverity {
    Info,
    Warning,
    Minor,
    Major,
    Critical,
}

impl FaultSeverity {
    /// Lenient parse for wire attributes; unrecognized values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(FaultSeverity::Info),
            "warning" => Some(FaultSeverity::Warning),
            "minor" => Some(FaultSeverity::Minor),
            "major" => Some(FaultSeverity::Major),
            "critical" => Some(FaultSeverity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for FaultSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FaultSeverity::Info => "info",
            FaultSeverity::Warning => "warning",
            FaultSeverity::Minor => "minor",
            FaultSeverity::Major => "major",
            FaultSeverity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// A diagnostic record attached to a parent resource, distinguished by fault
/// code. `external_identifier` is the fault's DN in the foreign model; the
/// parent DN is recovered from it by trimming the fault segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub fault_code: String,
    pub external_identifier: String,
    pub severity: FaultSeverity,
    #[serde(default)]
    pub description: String,
    pub last_update: Option<DateTime<Utc>>,
}

impl Fault {
    pub fn new(fault_code: impl Into<String>, external_identifier: impl Into<String>) -> Self {
        Fault {
            fault_code: fault_code.into(),
            external_identifier: external_identifier.into(),
            severity: FaultSeverity::Warning,
            description: String::new(),
            last_update: None,
        }
    }

    pub fn with_severity(mut self, severity: FaultSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Sync marker plus attached faults for one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub sync_state: SyncState,
    #[serde(default)]
    pub sync_message: String,
    #[serde(default)]
    pub faults: Vec<Fault>,
    pub updated_at: Option<DateTime<Utc>>,
}
