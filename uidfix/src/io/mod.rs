//! I/O helpers for uidfix commands.

pub mod config;
pub mod host;
pub mod tree_store;
