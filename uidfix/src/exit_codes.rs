//! Stable exit codes for uidfix CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to unreadable input, bad config or other errors.
pub const INVALID: i32 = 1;
/// `uidfix check` found duplicate uids.
pub const DUPLICATES: i32 = 2;
/// Reconciliation aborted on a broken invariant or an exhausted uid space.
pub const FATAL: i32 = 3;
