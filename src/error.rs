//! Error taxonomy.
//!
//! The recompute path never surfaces these to the host; it logs them and
//! reports a no-op. Parsing and configuration APIs return them directly.

use crate::types::TargetPoint;

/// Errors produced while parsing configuration or resolving targets.
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    /// Align point string that is not vertical+horizontal (`"tl"`, `"bc"`, ...).
    #[error("invalid align point {0:?}")]
    InvalidAlignPoint(String),

    /// Point target without a complete finite coordinate pair.
    #[error("malformed target point {0:?}")]
    MalformedPoint(TargetPoint),

    /// Element resolver produced nothing usable.
    #[error("target unresolvable: {0}")]
    Unresolvable(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl AlignError {
    /// Build an [`AlignError::InvalidAlignPoint`] value.
    pub fn invalid_point(s: impl Into<String>) -> Self {
        Self::InvalidAlignPoint(s.into())
    }

    /// Build an [`AlignError::Unresolvable`] value.
    pub fn unresolvable(msg: impl Into<String>) -> Self {
        Self::Unresolvable(msg.into())
    }
}
