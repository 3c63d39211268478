//! Deterministic, pure logic for uid reconciliation.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! trees and return deterministic outputs suitable for tests (given a
//! deterministic generator).

pub mod attributes;
pub mod error;
pub mod extract;
pub mod generator;
pub mod invariants;
pub mod path;
pub mod reconcile;
pub mod relocate;

pub use error::FatalError;
