use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("malformed resource key: {0}")]
    MalformedKey(String),

    #[error("malformed dn: {0}")]
    MalformedDn(String),

    #[error("identity arity mismatch for {kind}: expected {expected}, got {got}")]
    IdentityArity {
        kind: String,
        expected: usize,
        got: usize,
    },
}
