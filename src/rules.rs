//! Structural patterns recognized in lanzou pages.
//!
//! Each rule is compiled once and shared. When the site changes its markup,
//! the fix should land in exactly one of these.

use std::sync::LazyLock;

use regex::Regex;

/// `YYYY-MM-DD`-less relative time such as `3 小时前` or `昨天`.
pub static RELATIVE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9.]*)\s*([\x{4e00}-\x{9fa5}]+)").expect("relative time rule")
});

/// Human size such as `1.5 M` or `300K`. Group 2 takes the whole run of unit
/// letters, so `12 MB` captures `MB`.
pub static HUMAN_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9.]+)\s*([bkm]+)").expect("human size rule"));

/// HTML, JS line and block comments. Byte-oriented so non-UTF-8 pages survive.
pub static COMMENT: LazyLock<regex::bytes::Regex> = LazyLock::new(|| {
    regex::bytes::Regex::new(r"(?-u)<!--.*?-->|//.*|/\*.*?\*/").expect("comment rule")
});

/// `arg1='<token>'` assignment on the anti-bot interstitial.
pub static CHALLENGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"arg1='([0-9A-Z]+)'").expect("challenge token rule"));

/// First flat `{...}` after a `data` label.
pub static DATA_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data[:\s]+(\{[^}]+\})").expect("data block rule"));

/// `'key':value` pair inside a data block.
///
/// Group 2 is the raw value (quotes included when present), group 3 the
/// value with quotes stripped.
pub static DATA_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'([^']+?)'\s*:\s*('?([^' },]*)'?)").expect("data pair rule")
});

/// `data : '<form string>'`.
pub static FORM_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data\s*:\s*'([^']+)'").expect("form block rule"));

/// Rule for `var <name> = '<value>';`. Built per lookup since the name varies.
pub fn js_var(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"var\s+{}\s*=\s*'([^']*)';", regex::escape(name))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_time_rule() {
        let caps = RELATIVE_TIME.captures("3 小时前").unwrap();
        assert_eq!(&caps[1], "3");
        assert_eq!(&caps[2], "小时前");

        let caps = RELATIVE_TIME.captures("昨天").unwrap();
        assert_eq!(&caps[1], "");
        assert_eq!(&caps[2], "昨天");

        assert!(RELATIVE_TIME.captures("3 hours ago").is_none());
    }

    #[test]
    fn test_human_size_rule() {
        let caps = HUMAN_SIZE.captures("12.5 MB").unwrap();
        assert_eq!(&caps[1], "12.5");
        assert_eq!(&caps[2], "MB");
        let caps = HUMAN_SIZE.captures("300k").unwrap();
        assert_eq!(&caps[2], "k");
        assert!(HUMAN_SIZE.captures("unknown").is_none());
    }

    #[test]
    fn test_comment_rule() {
        let found: Vec<&[u8]> = COMMENT
            .find_iter(b"a<!-- x -->b/* y */c// z\nd")
            .map(|m| m.as_bytes())
            .collect();
        assert_eq!(
            found,
            vec![&b"<!-- x -->"[..], &b"/* y */"[..], &b"// z"[..]]
        );
    }

    #[test]
    fn test_challenge_token_rule() {
        let caps = CHALLENGE_TOKEN.captures("var arg1='AB12CD';").unwrap();
        assert_eq!(&caps[1], "AB12CD");
        assert!(CHALLENGE_TOKEN.captures("var arg1='ab12cd';").is_none());
    }

    #[test]
    fn test_data_block_rule() {
        let caps = DATA_BLOCK
            .captures("$.ajax({ data : { 'a':1 }, success: f })")
            .unwrap();
        assert_eq!(&caps[1], "{ 'a':1 }");
    }

    #[test]
    fn test_data_pair_rule() {
        let pairs: Vec<(String, String, String)> = DATA_PAIR
            .captures_iter("{'a':'1','b':x,'c':2}")
            .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".into(), "'1'".into(), "1".into()),
                ("b".into(), "x".into(), "x".into()),
                ("c".into(), "2".into(), "2".into()),
            ]
        );
    }

    #[test]
    fn test_form_block_rule() {
        let caps = FORM_BLOCK.captures("data : 'k1=v1&k2=v2',").unwrap();
        assert_eq!(&caps[1], "k1=v1&k2=v2");
    }

    #[test]
    fn test_js_var_rule() {
        let re = js_var("sign").unwrap();
        let html = "var signature = 'nope'; var sign = 'abc';";
        assert_eq!(&re.captures(html).unwrap()[1], "abc");

        let re = js_var("a.b").unwrap();
        assert!(re.captures("var aXb = 'no';").is_none());
    }
}
