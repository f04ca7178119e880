//! Canonical activity names and classification outcomes.
//!
//! The canonical name is the unique cache key of the whole system. It is
//! only ever produced by a classifier (or the classifier's raw-input
//! fallback), never stored directly from user input.

use serde::{Deserialize, Serialize};

use crate::Error;

/// A normalized, sector-preserving activity name.
///
/// Invariant: non-empty after trimming. Two textual variants of the same
/// real-world activity should collapse to one canonical name, but that is a
/// best-effort property of the remote classifier, not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalActivity(String);

impl CanonicalActivity {
    /// Construct from classifier output, enforcing the non-empty invariant.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name: String = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("canonical activity name cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of classifying raw user text.
///
/// A sum type rather than a sentinel string, so a legitimately named
/// activity can never collide with the rejection signal and every branch is
/// explicit at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// Input is a recognizable economic activity, normalized to this name.
    Accepted(CanonicalActivity),
    /// Input is not a plausible economic activity description.
    Rejected,
}
