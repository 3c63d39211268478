//! Errors that abort a reconciliation pass.
//!
//! These signal broken invariants. Routine lookup failures use
//! [`ExtractError`](crate::core::extract::ExtractError) instead.

use thiserror::Error;

use crate::core::attributes::AttributeError;
use crate::tree::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("switched kind from {expected} to {actual}")]
    KindChanged { expected: NodeKind, actual: NodeKind },
    #[error("got {0} back instead of an expression")]
    NotAnExpression(NodeKind),
    #[error("failed to add a uid to element '{uid}': {source}")]
    AttributeWrite {
        uid: String,
        #[source]
        source: AttributeError,
    },
    #[error("unable to generate a uid from '{0}': identifier space exhausted")]
    Exhausted(String),
}
