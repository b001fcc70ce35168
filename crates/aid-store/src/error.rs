use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("domain error: {0}")]
    Domain(#[from] aid_domain::DomainError),

    #[error("tree error: {0}")]
    Tree(#[from] aid_tree::TreeError),

    #[error("internal store error: {0}")]
    Internal(String),
}
