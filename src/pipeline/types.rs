//! Text carriers and per-call context shared by every pipeline stage.
//!
//! `RawComplaintText` is the only type that ever holds the unmasked
//! complaint. It cannot be printed, serialized or cloned, and its buffer
//! is wiped on drop. It deserializes straight from a request body.
//! Everything past the masking gate works on `SafeText`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Unmasked complaint text as submitted by the caller.
pub struct RawComplaintText(Zeroizing<String>);

impl RawComplaintText {
    pub fn new(text: String) -> Self {
        Self(Zeroizing::new(text))
    }

    /// Borrow the raw text. Only the masking client may call this.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for RawComplaintText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawComplaintText(<redacted>, {} chars)", self.char_count())
    }
}

impl<'de> Deserialize<'de> for RawComplaintText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Masked complaint text: never empty, never the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeText(String);

impl SafeText {
    /// Accept the masking collaborator's output. Blank output is rejected.
    pub fn from_masked(masked: String) -> Option<Self> {
        if masked.trim().is_empty() {
            None
        } else {
            Some(Self(masked))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Correlation id and deadline attached to one stage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub request_id: Uuid,
    pub timeout: Duration,
}

impl CallContext {
    pub fn new(request_id: Uuid, timeout: Duration) -> Self {
        Self {
            request_id,
            timeout,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Per-stage call deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub masking: Duration,
    pub triage: Duration,
    pub retrieval: Duration,
    pub generation: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            masking: Duration::from_secs(5),
            triage: Duration::from_secs(10),
            retrieval: Duration::from_secs(10),
            generation: Duration::from_secs(30),
        }
    }
}
