use thiserror::Error;

/// Closed taxonomy of synchronization failures. The handler for each kind is
/// fixed: transient and unknown failures retry until the budget runs out,
/// operation-critical failures surrender the object immediately, and
/// system-critical failures terminate the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transient,
    Unknown,
    OperationCritical,
    SystemCritical,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Transient => "transient",
            ErrorKind::Unknown => "unknown",
            ErrorKind::OperationCritical => "operation-critical",
            ErrorKind::SystemCritical => "system-critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store error: {0}")]
    Store(#[from] aid_store::StoreError),

    #[error("tree error: {0}")]
    Tree(#[from] aid_tree::TreeError),

    #[error("domain error: {0}")]
    Domain(#[from] aid_domain::DomainError),

    /// Contract violation from a collaborator; the orchestrator treats this
    /// as system-critical.
    #[error("contract violation: {0}")]
    Contract(String),
}
