pub mod challenge;
pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod normalize;
pub mod params;
pub mod rules;

pub use challenge::{ACW_COOKIE_NAME, ChallengeToken, PageState};
pub use client::LanzouClient;
pub use comments::{strip_comments, strip_comments_str};
pub use config::ClientConfig;
pub use error::{Error, Pattern, Result};
pub use normalize::{parse_size, parse_time};
pub use params::{ExtractedParams, extract_form_params, extract_json_params, extract_params};
