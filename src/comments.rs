//! Comment removal for raw page markup.
//!
//! The site leaves stale `data : {...}` blocks inside commented-out script, so
//! callers strip comments before extracting parameters. This is a single
//! regex pass: nested or unterminated comments are handled best-effort, and a
//! `//` inside a string literal (e.g. a URL) is treated as a comment too.

use std::borrow::Cow;

use crate::rules::COMMENT;

/// Remove `<!-- -->`, `//` and `/* */` comments from raw bytes.
pub fn strip_comments(markup: &[u8]) -> Vec<u8> {
    COMMENT.replace_all(markup, &b""[..]).into_owned()
}

/// Text variant of [`strip_comments`]. Borrows when nothing was removed.
pub fn strip_comments_str(markup: &str) -> Cow<'_, str> {
    match COMMENT.replace_all(markup.as_bytes(), &b""[..]) {
        Cow::Borrowed(_) => Cow::Borrowed(markup),
        // Matches start and end on ASCII delimiters or line ends, so the
        // remaining bytes are still valid UTF-8.
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
