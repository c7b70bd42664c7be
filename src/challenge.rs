//! Solver for the `acw_sc__v2` anti-bot interstitial.
//!
//! When a client hits the site too often, it gets a small obfuscated page
//! instead of the real one. The page embeds a 40-character token as
//! `arg1='...'`, scrambles it with a fixed permutation, XORs it with a fixed
//! key, stores the result as the `acw_sc__v2` cookie and reloads. We do the
//! same computation without running the script.
//!
//! Reverse-engineered from the interstitial's inline script:
//! ```js
//! var posList = [0xf, 0x23, 0x1d, 0x18, ...];   // inverse of PERMUTATION_TABLE
//! for (i = 0; i < arg1.length; i++)
//!     for (j = 0; j < posList.length; j++)
//!         if (posList[j] == i + 1) out[j] = arg1[i];
//! arg2 = out.join('').hexXor(mask);
//! ```

use tracing::debug;

use crate::error::{Error, Pattern, Result};
use crate::rules::CHALLENGE_TOKEN;

/// Cookie the solution must be sent back as.
pub const ACW_COOKIE_NAME: &str = "acw_sc__v2";

/// Length of every token the site has been observed to serve.
pub const TOKEN_LEN: usize = 40;

/// Character at position `i` of the token moves to `PERMUTATION_TABLE[i]`.
pub const PERMUTATION_TABLE: [usize; TOKEN_LEN] = [
    6, 28, 34, 31, 33, 18, 30, 23, 9, 8, 19, 38, 17, 24, 0, 5, 32, 21, 10, 22, 25, 14, 15, 3, 16,
    27, 13, 35, 2, 29, 11, 26, 4, 36, 1, 39, 37, 7, 20, 12,
];

/// XOR mask applied to the unboxed token, as hex.
pub const XOR_KEY: &str = "3000176000856006061501533003690027800375";

/// A token captured from `arg1='...'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeToken(String);

impl ChallengeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compute the cookie value for this token.
    pub fn solve(&self) -> Result<String> {
        Ok(hex_xor(&unbox(&self.0)?, XOR_KEY))
    }
}

/// Whether a fetched page is usable or the interstitial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Normal,
    Challenge(ChallengeToken),
}

impl PageState {
    pub fn classify(markup: &str) -> Self {
        match detect(markup) {
            Some(token) => PageState::Challenge(token),
            None => PageState::Normal,
        }
    }

    pub fn is_challenge(&self) -> bool {
        matches!(self, PageState::Challenge(_))
    }
}

/// Find the challenge token, if this is a challenge page.
pub fn detect(markup: &str) -> Option<ChallengeToken> {
    CHALLENGE_TOKEN
        .captures(markup)
        .and_then(|cap| cap.get(1))
        .map(|m| ChallengeToken::new(m.as_str()))
}

/// Detect and solve in one step.
///
/// Fails with [`Pattern::ChallengeToken`] when the page is not a challenge page.
pub fn solve_page(markup: &str) -> Result<String> {
    let token = detect(markup).ok_or(Error::PatternNotFound(Pattern::ChallengeToken))?;
    let solution = token.solve()?;
    debug!(token = token.as_str(), %solution, "solved {}", ACW_COOKIE_NAME);
    Ok(solution)
}

/// Undo the token scramble.
///
/// Tokens of any length other than [`TOKEN_LEN`] are rejected: the table only
/// describes 40 positions and a partial result would be a silently wrong cookie.
pub fn unbox(token: &str) -> Result<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() != TOKEN_LEN {
        return Err(Error::TokenLength {
            expected: TOKEN_LEN,
            actual: chars.len(),
        });
    }

    let mut out = ['\0'; TOKEN_LEN];
    for (i, &dest) in PERMUTATION_TABLE.iter().enumerate() {
        out[dest] = chars[i];
    }
    Ok(out.iter().collect())
}

/// XOR two hex strings pair by pair, stopping at the shorter one.
///
/// Each output byte is two lowercase hex digits. A pair that is not valid hex
/// counts as zero, and a trailing odd digit is ignored. The page's own script
/// uses `parseInt(pair, 16)`, which reads a valid prefix (`"1Z"` is 1); tokens
/// are hex in practice, so the two never disagree.
pub fn hex_xor(left: &str, right: &str) -> String {
    let left = left.as_bytes();
    let right = right.as_bytes();

    left.chunks_exact(2)
        .zip(right.chunks_exact(2))
        .map(|(a, b)| format!("{:02x}", hex_pair(a) ^ hex_pair(b)))
        .collect()
}

fn hex_pair(pair: &[u8]) -> u8 {
    std::str::from_utf8(pair)
        .ok()
        .and_then(|s| u8::from_str_radix(s, 16).ok())
        .unwrap_or(0)
}
