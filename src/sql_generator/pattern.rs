//! Wildcard-to-LIKE translation.
//!
//! CQL's `*` becomes the SQL `%` wildcard; every LIKE metacharacter that
//! appears as literal text (`%`, `_`, `\`) is backslash-escaped first, so a
//! user-supplied `%` can never widen a match. The produced pattern is always
//! bound as a parameter, never spliced into SQL text.

use crate::cql_parser::ast::{CqlValue, ValueSegment};

/// Escape LIKE metacharacters in literal text.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render a value with embedded wildcards as a LIKE pattern.
pub fn like_pattern(value: &CqlValue) -> String {
    let mut out = String::new();
    for segment in &value.segments {
        match segment {
            ValueSegment::Text(t) => out.push_str(&escape_like(t)),
            ValueSegment::AnySequence => out.push('%'),
        }
    }
    out
}

/// Substring form of [`like_pattern`]: anchored nowhere, so `=` matches
/// case-insensitively anywhere inside the stored value.
pub fn contains_pattern(value: &CqlValue) -> String {
    format!("%{}%", like_pattern(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cql_parser::ast::ValueSegment::{AnySequence, Text};

    fn value(segments: Vec<ValueSegment>) -> CqlValue {
        CqlValue { segments }
    }

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn escaping_leaves_no_unescaped_metacharacters() {
        let escaped = escape_like("%_\\%");
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                chars.next();
                continue;
            }
            assert!(!matches!(c, '%' | '_' | '\\'), "unescaped `{}` survived", c);
        }
    }

    #[test]
    fn wildcard_becomes_percent() {
        let pattern = like_pattern(&value(vec![
            Text("abc".into()),
            AnySequence,
            Text("def".into()),
        ]));
        assert_eq!(pattern, "abc%def");
    }

    #[test]
    fn literal_percent_is_escaped_next_to_wildcard() {
        let pattern = like_pattern(&value(vec![Text("50%".into()), AnySequence]));
        assert_eq!(pattern, "50\\%%");
    }

    #[test]
    fn contains_pattern_wraps() {
        assert_eq!(contains_pattern(&CqlValue::literal("x1")), "%x1%");
    }
}
