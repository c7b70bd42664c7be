//! Error types for page extraction.
//!
//! Only the strict paths (challenge solving and parameter extraction) produce
//! errors. Time and size normalization fall back to a default
//! value instead.

use std::fmt;

use thiserror::Error;

/// The structural rule that failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `arg1='<token>'` on an anti-bot interstitial.
    ChallengeToken,
    /// `data : {...}` pseudo-JSON block.
    DataBlock,
    /// `data : '...'` form-encoded block.
    FormBlock,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pattern::ChallengeToken => "challenge token",
            Pattern::DataBlock => "data block",
            Pattern::FormBlock => "form block",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found in page")]
    PatternNotFound(Pattern),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("challenge token must be {expected} characters, got {actual}")]
    TokenLength { expected: usize, actual: usize },
}

impl Error {
    pub fn is_pattern_not_found(&self) -> bool {
        matches!(self, Error::PatternNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
