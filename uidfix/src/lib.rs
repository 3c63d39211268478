//! Uid reconciliation for markup/expression trees.
//!
//! Every node in a tree carries a uid that must be unique across the document.
//! This crate repairs trees where uids collide or are missing, records each
//! rename, and carries renames over to data keyed by uid.
//!
//! - **[`core`]**: Pure logic (generation, reconciliation, extraction,
//!   relocation). No I/O; deterministic given a deterministic generator.
//! - **[`io`]**: Filesystem and host-document boundaries.
//!
//! [`fix`] coordinates core logic with I/O to implement the CLI.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod fix;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tree;
