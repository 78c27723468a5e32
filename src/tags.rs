//! Tag balance validation and inline-tag extraction.
//!
//! The tag vocabulary is bounded, so a regex token scan is sufficient; no
//! grammar is needed. Validation runs before any extraction and converts
//! ambiguous nesting into a deterministic reject.

use crate::error::ParseError;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TAG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)(\w+)[^>]*>").unwrap());

// The regex crate has no backreferences, so the closing name is captured
// separately and compared in code.
static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(\w+)>([^<]+)</(\w+)>").unwrap());

/// Stack-based check that every opening tag has a correctly ordered closing
/// tag. Empty or tag-free input is valid.
pub fn validate_tags(input: &str) -> Result<(), ParseError> {
    if input.is_empty() {
        return Ok(());
    }

    let mut stack: Vec<&str> = Vec::new();
    for caps in TAG_TOKEN_RE.captures_iter(input) {
        let closing = &caps[1] == "/";
        let token = caps.get(0).unwrap();
        let name = caps.get(2).unwrap();
        if closing {
            match stack.last() {
                Some(top) if *top == name.as_str() => {
                    stack.pop();
                }
                _ => {
                    return Err(ParseError::MismatchedClosingTag {
                        tag: name.as_str().to_string(),
                        position: token.start(),
                    });
                }
            }
        } else {
            stack.push(name.as_str());
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::UnclosedTags {
            tags: stack.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

/// Scans for `<name>value</name>` pairs across the whole text. Values are
/// trimmed; the last occurrence wins when a name repeats.
pub fn extract_inline_tags(input: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for caps in INLINE_TAG_RE.captures_iter(input) {
        if caps[1] != caps[3] {
            continue;
        }
        tags.insert(caps[1].to_string(), caps[2].trim().to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_valid() {
        assert!(validate_tags("").is_ok());
    }

    #[test]
    fn tag_free_prose_is_valid() {
        assert!(validate_tags("just a plain sentence with no markup").is_ok());
    }

    #[test]
    fn balanced_tags_are_valid() {
        assert!(validate_tags("<total>120.50</total>").is_ok());
        assert!(validate_tags("<expense><total>1</total></expense>").is_ok());
    }

    #[test]
    fn nested_balanced_tags_are_valid() {
        assert!(validate_tags("<a>x<b>y<c>z</c></b></a>").is_ok());
    }

    #[test]
    fn dangling_open_tag_fails() {
        let err = validate_tags("hello <total>120.50").unwrap_err();
        assert_eq!(err.code(), "UNCLOSED_TAGS");
        assert!(matches!(err, ParseError::UnclosedTags { tags } if tags == vec!["total"]));
    }

    #[test]
    fn overlapping_tags_fail() {
        // <a><b></a></b> closes a while b is still open
        let err = validate_tags("<a><b></a></b>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MismatchedClosingTag { ref tag, .. } if tag == "a"
        ));
    }

    #[test]
    fn closing_without_opening_fails() {
        let err = validate_tags("no opening </total> here").unwrap_err();
        assert_eq!(err.code(), "UNCLOSED_TAGS");
    }

    #[test]
    fn mismatch_position_points_at_the_token() {
        let err = validate_tags("ab </total>").unwrap_err();
        assert_eq!(
            err,
            ParseError::MismatchedClosingTag {
                tag: "total".to_string(),
                position: 3,
            }
        );
    }

    #[test]
    fn multiple_unclosed_tags_are_all_reported() {
        let err = validate_tags("<vendor><total>").unwrap_err();
        match err {
            ParseError::UnclosedTags { tags } => {
                assert!(tags.contains(&"vendor".to_string()));
                assert!(tags.contains(&"total".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inline_tags_are_extracted_and_trimmed() {
        let tags = extract_inline_tags("x <vendor> Mojo Coffee </vendor> y <total>120.50</total>");
        assert_eq!(tags.get("vendor").map(String::as_str), Some("Mojo Coffee"));
        assert_eq!(tags.get("total").map(String::as_str), Some("120.50"));
    }

    #[test]
    fn duplicate_inline_tags_last_wins() {
        let tags = extract_inline_tags("<total>1.00</total> then <total>2.00</total>");
        assert_eq!(tags.get("total").map(String::as_str), Some("2.00"));
    }

    #[test]
    fn mismatched_pair_is_not_an_inline_tag() {
        let tags = extract_inline_tags("<vendor>Mojo</total>");
        assert!(tags.is_empty());
    }
}
