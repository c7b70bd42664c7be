//! Extraction of request parameters embedded in page scripts.
//!
//! Share and download pages post back to `ajaxm.php` with parameters built
//! inline, in one of two shapes:
//!
//! ```js
//! $.ajax({ url: '/ajaxm.php', data : { 'action':'downprocess','sign':s_sign,'ves':1 } });
//! var s_sign = 'AGEBPw...';
//! ```
//!
//! ```js
//! $.ajax({ url: '/ajaxm.php', data : 'action=downprocess&sign=AGEBPw...&ves=1' });
//! ```
//!
//! Neither is valid JSON, so both are pulled apart with the rules in
//! [`crate::rules`].

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Pattern, Result};
use crate::rules::{self, DATA_BLOCK, DATA_PAIR, FORM_BLOCK};

/// Parameter name to value.
pub type ExtractedParams = HashMap<String, String>;

/// Extract the `data : {...}` object, resolving bare identifiers through the
/// page's `var <name> = '...';` assignments.
pub fn extract_json_params(markup: &str) -> Result<ExtractedParams> {
    let block = DATA_BLOCK
        .captures(markup)
        .and_then(|cap| cap.get(1))
        .ok_or(Error::PatternNotFound(Pattern::DataBlock))?;
    Ok(parse_data_block(block.as_str(), markup))
}

/// Parse the pairs of one data block. `markup` is searched for indirect values.
pub fn parse_data_block(block: &str, markup: &str) -> ExtractedParams {
    let mut params = ExtractedParams::new();
    for cap in DATA_PAIR.captures_iter(block) {
        let raw = &cap[2];
        let value = &cap[3];
        let resolved = if value.is_empty() || raw.contains('\'') || is_number(raw) {
            value.to_string()
        } else {
            find_js_var(value, markup).unwrap_or_else(|| {
                debug!(variable = value, "unresolved script variable");
                String::new()
            })
        };
        params.insert(cap[1].to_string(), resolved);
    }
    params
}

/// Look up `var <name> = '<value>';` anywhere in the page.
pub fn find_js_var(name: &str, markup: &str) -> Option<String> {
    rules::js_var(name)?
        .captures(markup)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the `data : '...'` form string.
pub fn extract_form_params(markup: &str) -> Result<ExtractedParams> {
    let form = FORM_BLOCK
        .captures(markup)
        .and_then(|cap| cap.get(1))
        .ok_or(Error::PatternNotFound(Pattern::FormBlock))?;
    parse_form(form.as_str())
}

/// Split `k1=v1&k2=v2` on `&`, then on the first `=`.
///
/// Empty segments are skipped. A non-empty segment without `=` is an error.
/// Values are returned as they appear, without percent-decoding.
pub fn parse_form(form: &str) -> Result<ExtractedParams> {
    form.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| Error::MalformedInput(format!("form pair without '=': {pair}")))
        })
        .collect()
}

/// Try the object shape first, then the form shape.
pub fn extract_params(markup: &str) -> Result<ExtractedParams> {
    match extract_json_params(markup) {
        Ok(params) => Ok(params),
        Err(err) if err.is_pattern_not_found() => match extract_form_params(markup) {
            Err(Error::PatternNotFound(_)) => Err(Error::PatternNotFound(Pattern::DataBlock)),
            other => other,
        },
        Err(err) => Err(err),
    }
}

/// True when every character is an ASCII digit. `"3.14"` and `"-1"` are not
/// numbers here; the empty string is.
pub fn is_number(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ExtractedParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_json_with_indirect_value() {
        let html = "data : {'a':'1','b':x}\nvar x = 'hi';";
        assert_eq!(
            extract_json_params(html).unwrap(),
            params(&[("a", "1"), ("b", "hi")])
        );
    }

    #[test]
    fn test_json_realistic_page() {
        let html = r#"
<script type="text/javascript">
var ajaxdata = '?ctdf';
var s_sign = 'AGEBPw8_bBDYIAQMxVWcPPFU5VzcDPwE4';
$.ajax({
    type : 'post',
    url : '/ajaxm.php',
    data : { 'action':'downprocess','signs':ajaxdata,'sign':s_sign,'websign':'','ves':1 },
    dataType : 'json',
});
</script>"#;
        assert_eq!(
            extract_json_params(html).unwrap(),
            params(&[
                ("action", "downprocess"),
                ("signs", "?ctdf"),
                ("sign", "AGEBPw8_bBDYIAQMxVWcPPFU5VzcDPwE4"),
                ("websign", ""),
                ("ves", "1"),
            ])
        );
    }

    #[test]
    fn test_json_unresolved_variable_is_empty() {
        let html = "data : {'k':missing}";
        assert_eq!(extract_json_params(html).unwrap(), params(&[("k", "")]));
    }

    #[test]
    fn test_json_decimal_is_treated_as_variable() {
        // "3.14" is not numeric, so it is looked up as a variable name.
        let html = "data : {'pi':3.14}";
        assert_eq!(extract_json_params(html).unwrap(), params(&[("pi", "")]));
    }

    #[test]
    fn test_json_missing_block() {
        let err = extract_json_params("<html>nothing</html>").unwrap_err();
        assert!(matches!(err, Error::PatternNotFound(Pattern::DataBlock)));
    }

    #[test]
    fn test_form_params() {
        let html = "data : 'k1=v1&k2=v2'";
        assert_eq!(
            extract_form_params(html).unwrap(),
            params(&[("k1", "v1"), ("k2", "v2")])
        );
    }

    #[test]
    fn test_form_value_keeps_extra_equals() {
        assert_eq!(
            parse_form("sign=a=b&t=&").unwrap(),
            params(&[("sign", "a=b"), ("t", "")])
        );
    }

    #[test]
    fn test_form_pair_without_equals() {
        let err = parse_form("k1=v1&broken").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_form_missing_block() {
        let err = extract_form_params("data : {'a':1}").unwrap_err();
        assert!(matches!(err, Error::PatternNotFound(Pattern::FormBlock)));
    }

    #[test]
    fn test_extract_params_picks_shape() {
        assert_eq!(
            extract_params("data : {'a':'1'}").unwrap(),
            params(&[("a", "1")])
        );
        assert_eq!(
            extract_params("data : 'a=1'").unwrap(),
            params(&[("a", "1")])
        );
        let err = extract_params("<html></html>").unwrap_err();
        assert!(matches!(err, Error::PatternNotFound(Pattern::DataBlock)));
        assert!(matches!(
            extract_params("data : 'oops'").unwrap_err(),
            Error::MalformedInput(_)
        ));
    }

    #[test]
    fn test_find_js_var() {
        let html = "var a = 'one'; var ab = 'two';";
        assert_eq!(find_js_var("ab", html), Some("two".to_string()));
        assert_eq!(find_js_var("a", html), Some("one".to_string()));
        assert_eq!(find_js_var("c", html), None);
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("123"));
        assert!(is_number(""));
        assert!(!is_number("3.14"));
        assert!(!is_number("-1"));
        assert!(!is_number("1e5"));
    }
}
