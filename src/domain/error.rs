//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::scheme::SchemeKind;

/// Domain errors represent violations of the tree and labeling invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed tree structure: {0}")]
    Structural(String),

    #[error("label overflow at level {level}: {label} * {multiplier} exceeds 128 bits")]
    Overflow {
        level: usize,
        label: u128,
        multiplier: u128,
    },

    #[error("invalid insertion: {0}")]
    InvalidInsertion(String),

    #[error("tree is labeled by {owner}, refusing {attempted} label")]
    SchemeMismatch {
        owner: SchemeKind,
        attempted: SchemeKind,
    },

    #[error("tree has not been labeled yet")]
    Unlabeled,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
