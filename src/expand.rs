//! Placeholder expansion for filename patterns.
//!
//! A pattern is literal text plus zero or more `{column}` tokens. Expansion
//! replaces every occurrence of `{key}` with the matching context value and
//! leaves unknown tokens verbatim, so a typo in a pattern never blocks a
//! batch run. The same token syntax is used inside document templates (see
//! [`crate::template`]); this module handles the filename side.
//!
//! ## Matching rules
//!
//! - Only exact `{key}` substrings are replaced. A key that is a substring
//!   of another key's token text cannot match partially, because the braces
//!   are part of the needle.
//! - Context keys are iterated in sorted order ([`RowContext`] is a
//!   `BTreeMap`), so the result is independent of insertion order.
//! - There is no escaping mechanism: literal text that happens to spell a
//!   valid `{column}` token is always substituted. Documented, accepted.
//!
//! ## Blank results
//!
//! A pattern can expand to nothing (all tokens empty, no literal text).
//! Archive entries need non-empty names, so [`fallback_name`] substitutes a
//! positional `Entry_{i}` name when the expansion is blank after trimming.

use crate::source::RowContext;

/// Expand every `{key}` token in `pattern` with its context value.
///
/// Unknown tokens are left verbatim:
///
/// ```
/// use doc_merge::expand::expand;
/// use std::collections::BTreeMap;
///
/// let ctx = BTreeMap::from([("Nachname".to_string(), "Meier".to_string())]);
/// assert_eq!(expand("Brief_{Nachname}", &ctx), "Brief_Meier");
/// assert_eq!(expand("Brief_{Unbekannt}", &ctx), "Brief_{Unbekannt}");
/// ```
pub fn expand(pattern: &str, context: &RowContext) -> String {
    let mut result = pattern.to_string();
    for (key, value) in context {
        let token = format!("{{{key}}}");
        if result.contains(&token) {
            result = result.replace(&token, value);
        }
    }
    result
}

/// List the `{name}` token candidates in a pattern, sorted.
///
/// Used by the preflight check to warn about pattern tokens that match no
/// source column. Same candidate rule as the template scanner: brace pairs
/// whose inner text has no whitespace or braces.
pub fn tokens(pattern: &str) -> std::collections::BTreeSet<String> {
    let mut found = std::collections::BTreeSet::new();
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        rest = &rest[start + 1..];
        let Some(end) = rest.find(['}', '{']) else {
            break;
        };
        if rest.as_bytes()[end] == b'}' {
            let candidate = &rest[..end];
            if !candidate.is_empty() && !candidate.chars().any(char::is_whitespace) {
                found.insert(candidate.to_string());
            }
            rest = &rest[end + 1..];
        }
        // On '{' the loop restarts the scan from the new brace.
    }
    found
}

/// Resolve an expanded filename, falling back to `Entry_{index}` when blank.
///
/// `index` is the 0-based row position, unique by construction, so fallback
/// names never collide with each other. Non-blank names are returned
/// unchanged (no trimming of the value actually used).
pub fn fallback_name(expanded: &str, index: usize) -> String {
    if expanded.trim().is_empty() {
        format!("Entry_{index}")
    } else {
        expanded.to_string()
    }
}
