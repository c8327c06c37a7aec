use nom::error::{ContextError, ParseError};
use std::fmt;
use thiserror::Error;

/// Borrowed parse error accumulated by the nom combinators. Each entry pairs
/// the remaining input with the context that failed on it.
#[derive(Debug, PartialEq)]
pub struct CqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> ParseError<&'a str> for CqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        CqlParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "while parsing"));
        other
    }
}

impl<'a> ContextError<&'a str> for CqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for CqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> CqlParsingError<'a> {
    pub fn new(input: &'a str, ctx: &'static str) -> Self {
        CqlParsingError {
            errors: vec![(input, ctx)],
        }
    }
}

/// Owned syntax error surfaced to callers, carrying the byte offset of the
/// offending token within the original query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("CQL syntax error at offset {offset}: {message}")]
pub struct QuerySyntaxError {
    pub message: String,
    pub offset: usize,
}

impl QuerySyntaxError {
    /// Convert the deepest borrowed error into an owned one. The error input
    /// slices are suffixes of `query`, so the offset is the length
    /// difference.
    pub(crate) fn from_parsing_error(query: &str, err: &CqlParsingError<'_>) -> Self {
        // The raw failure is recorded first; named contexts follow, so the
        // last entry carries the most readable description.
        let (input, ctx) = err
            .errors
            .last()
            .copied()
            .unwrap_or((query, "unparseable query"));
        let offset = query.len().saturating_sub(input.len());
        let snippet: String = input.chars().take(24).collect();
        let message = if snippet.is_empty() {
            ctx.to_string()
        } else {
            format!("{} near `{}`", ctx, snippet)
        };
        QuerySyntaxError { message, offset }
    }
}
