//! Comparison value parsing.
//!
//! Values come in two shapes: bare terms (`x1`, `abc*def`, `*`) and quoted
//! strings (`"x0')  or 1=1)--"`) that take whitespace, operators and
//! parentheses verbatim. In both shapes `\` escapes the next character, so
//! `\*` is a literal asterisk and `\"` a literal quote; an unescaped `*` is
//! recorded as a wildcard segment.

use nom::IResult;

use super::ast::{CqlValue, ValueSegment};
use super::errors::CqlParsingError;

/// Characters that end a bare (unquoted) value.
fn ends_bare_value(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')' || c == '"'
}

struct SegmentBuilder {
    segments: Vec<ValueSegment>,
    text: String,
}

impl SegmentBuilder {
    fn new() -> Self {
        SegmentBuilder {
            segments: Vec::new(),
            text: String::new(),
        }
    }

    fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    fn push_wildcard(&mut self) {
        self.flush_text();
        // Adjacent wildcards collapse; `**` matches the same strings as `*`.
        if !matches!(self.segments.last(), Some(ValueSegment::AnySequence)) {
            self.segments.push(ValueSegment::AnySequence);
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.segments
                .push(ValueSegment::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> CqlValue {
        self.flush_text();
        CqlValue {
            segments: self.segments,
        }
    }
}

pub fn parse_value(input: &str) -> IResult<&str, CqlValue, CqlParsingError<'_>> {
    if input.starts_with('"') {
        parse_quoted(input)
    } else {
        parse_bare(input)
    }
}

fn parse_quoted(input: &str) -> IResult<&str, CqlValue, CqlParsingError<'_>> {
    let mut builder = SegmentBuilder::new();
    let mut chars = input.char_indices();
    chars.next(); // opening quote
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => {
                let rest = &input[idx + 1..];
                return Ok((rest, builder.finish()));
            }
            '\\' => match chars.next() {
                Some((_, escaped)) => builder.push_char(escaped),
                None => {
                    return Err(nom::Err::Failure(CqlParsingError::new(
                        input,
                        "escape at end of quoted value",
                    )))
                }
            },
            '*' => builder.push_wildcard(),
            _ => builder.push_char(c),
        }
    }
    Err(nom::Err::Failure(CqlParsingError::new(
        input,
        "unterminated quoted value",
    )))
}

fn parse_bare(input: &str) -> IResult<&str, CqlValue, CqlParsingError<'_>> {
    let mut builder = SegmentBuilder::new();
    let mut consumed = 0usize;
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        if ends_bare_value(c) {
            break;
        }
        match c {
            '\\' => match chars.next() {
                Some((next_idx, escaped)) => {
                    builder.push_char(escaped);
                    consumed = next_idx + escaped.len_utf8();
                }
                None => {
                    return Err(nom::Err::Failure(CqlParsingError::new(
                        input,
                        "escape at end of value",
                    )))
                }
            },
            '*' => {
                builder.push_wildcard();
                consumed = idx + 1;
            }
            _ => {
                builder.push_char(c);
                consumed = idx + c.len_utf8();
            }
        }
    }
    if consumed == 0 {
        return Err(nom::Err::Error(CqlParsingError::new(
            input,
            "expected a comparison value",
        )));
    }
    Ok((&input[consumed..], builder.finish()))
}
