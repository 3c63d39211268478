//! Collision-free uid generation.
//!
//! Two modes are supported:
//! - [`GeneratorMode::Random`]: truncated UUID v4 hex, 32 characters.
//! - [`GeneratorMode::Deterministic`]: 3 characters, reusing slices of the
//!   candidate before falling back to a base-26 counter (`aaa`, `aab`, ...).
//!
//! A generator may also carry a queue of injected uids which are handed out
//! first, in order, regardless of mode or collisions.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::FatalError;

pub const RANDOM_UID_LENGTH: usize = 32;
pub const DETERMINISTIC_UID_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    #[default]
    Random,
    Deterministic,
}

impl GeneratorMode {
    pub fn uid_length(self) -> usize {
        match self {
            GeneratorMode::Random => RANDOM_UID_LENGTH,
            GeneratorMode::Deterministic => DETERMINISTIC_UID_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UidGenerator {
    mode: GeneratorMode,
    injected: VecDeque<String>,
}

impl UidGenerator {
    pub fn new(mode: GeneratorMode) -> Self {
        Self {
            mode,
            injected: VecDeque::new(),
        }
    }

    pub fn deterministic() -> Self {
        Self::new(GeneratorMode::Deterministic)
    }

    /// Queue uids that are returned, in order, ahead of normal generation.
    pub fn with_injected<I, S>(mut self, uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.injected.extend(uids.into_iter().map(Into::into));
        self
    }

    pub fn mode(&self) -> GeneratorMode {
        self.mode
    }

    pub fn uid_length(&self) -> usize {
        self.mode.uid_length()
    }

    /// Number of injected uids not yet handed out.
    pub fn injected_remaining(&self) -> usize {
        self.injected.len()
    }

    /// Generate a uid that is not in `existing`.
    pub fn generate_random(&mut self, existing: &HashSet<String>) -> Result<String, FatalError> {
        if let Some(uid) = self.injected.pop_front() {
            return Ok(uid);
        }
        let mut uid = self.fresh_uid("", existing)?;
        while existing.contains(&uid) {
            uid = self.fresh_uid("", existing)?;
        }
        Ok(uid)
    }

    /// Generate a uid derived from `candidate` if possible.
    ///
    /// The candidate is truncated to the uid length and kept when non-blank and
    /// not in `existing`; otherwise fresh uids are drawn until one is free.
    /// The result is not inserted into `existing`.
    pub fn generate_consistent(
        &mut self,
        candidate: &str,
        existing: &HashSet<String>,
    ) -> Result<String, FatalError> {
        if let Some(uid) = self.injected.pop_front() {
            return Ok(uid);
        }

        let mut uid = truncate_uid(candidate, self.uid_length());
        let seed = if uid.trim().is_empty() {
            uid = self.fresh_uid("", existing)?;
            ""
        } else {
            candidate
        };
        while existing.contains(&uid) {
            uid = self.fresh_uid(seed, existing)?;
        }
        Ok(uid)
    }

    fn fresh_uid(&self, candidate: &str, existing: &HashSet<String>) -> Result<String, FatalError> {
        match self.mode {
            GeneratorMode::Random => Ok(truncate_uid(
                &Uuid::new_v4().simple().to_string(),
                RANDOM_UID_LENGTH,
            )),
            GeneratorMode::Deterministic => {
                deterministic_uid(candidate, existing, DETERMINISTIC_UID_LENGTH)
            }
        }
    }
}

/// First `length` characters of `uid`.
pub fn truncate_uid(uid: &str, length: usize) -> String {
    uid.chars().take(length).collect()
}

/// Reuse a non-blank `length`-sized window of `candidate`, scanning left to
/// right, else count up from `aaa...` until a free value is found.
fn deterministic_uid(
    candidate: &str,
    existing: &HashSet<String>,
    length: usize,
) -> Result<String, FatalError> {
    let chars: Vec<char> = candidate.chars().collect();
    if length > 0 && chars.len() >= length {
        for window in chars.chunks_exact(length) {
            let slice: String = window.iter().collect();
            if !slice.trim().is_empty() && !existing.contains(&slice) {
                return Ok(slice);
            }
        }
    }

    let mut uid = "a".repeat(length);
    while existing.contains(&uid) {
        uid = next_counter_value(&uid)?;
    }
    Ok(uid)
}

/// Increment `value` as a base-26 counter over `a..=z`.
///
/// Characters outside `a..=z` count as `a`. All-`z` input is exhausted.
pub fn next_counter_value(value: &str) -> Result<String, FatalError> {
    let mut digits: Vec<char> = value
        .chars()
        .map(|c| if c.is_ascii_lowercase() { c } else { 'a' })
        .collect();

    for digit in digits.iter_mut().rev() {
        if *digit == 'z' {
            *digit = 'a';
        } else {
            *digit = char::from(*digit as u8 + 1);
            return Ok(digits.into_iter().collect());
        }
    }

    Err(FatalError::Exhausted(value.to_string()))
}
