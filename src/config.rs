//! Client configuration.

use std::env;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CHALLENGE_RETRIES: u32 = 2;

/// Configuration for [`crate::LanzouClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// How many times to solve the interstitial and refetch before giving up
    pub max_challenge_retries: u32,
    /// Optional Referer header, some download pages check it
    pub referer: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_challenge_retries: DEFAULT_MAX_CHALLENGE_RETRIES,
            referer: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `LANZOU_USER_AGENT`, `LANZOU_TIMEOUT_SECS`,
    /// `LANZOU_MAX_CHALLENGE_RETRIES` and `LANZOU_REFERER`.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            user_agent: lookup("LANZOU_USER_AGENT")
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            timeout: lookup("LANZOU_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_challenge_retries: lookup("LANZOU_MAX_CHALLENGE_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_challenge_retries),
            referer: lookup("LANZOU_REFERER").or(defaults.referer),
        }
    }
}
