//! CQL parser.
//!
//! Grammar (keywords are case-insensitive, explicit parentheses are required
//! when AND and OR meet at the same nesting level):
//!
//! ```text
//! query       = expression [ sortby ]
//! expression  = term { ("AND" | "OR") term }
//! term        = "NOT" term | "(" expression ")" | comparison
//! comparison  = fieldref op value
//! fieldref    = identifier [ "." identifier ]
//! op          = "==" | "=" | "<>" | "<=" | ">=" | "<" | ">"
//! value       = quoted | bare        (with `*` wildcards, `\` escapes)
//! sortby      = "sortby" sortkey { sortkey }
//! sortkey     = fieldref [ "asc" | "desc" ]
//! ```

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::multispace0;
use nom::combinator::opt;
use nom::error::context;
use nom::multi::many1;
use nom::sequence::preceded;
use nom::{IResult, Parser};

pub mod ast;
mod common;
pub(crate) mod errors;
mod value;

use ast::{BooleanOp, CqlNode, Comparison, ComparisonOp, SortKey};
use common::{field_ref, keyword, ws};
pub use errors::QuerySyntaxError;
use errors::CqlParsingError;

/// Parse a CQL query string into its AST.
///
/// Pure and deterministic: identical input always yields a structurally
/// identical tree.
pub fn parse(query: &str) -> Result<CqlNode, QuerySyntaxError> {
    if query.trim().is_empty() {
        return Err(QuerySyntaxError {
            message: "empty query".to_string(),
            offset: 0,
        });
    }
    match parse_query(query) {
        Ok((rest, node)) if rest.trim().is_empty() => Ok(node),
        Ok((rest, _)) => Err(QuerySyntaxError {
            message: format!("unexpected trailing input `{}`", rest.trim()),
            offset: query.len() - rest.len(),
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(QuerySyntaxError::from_parsing_error(query, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(QuerySyntaxError {
            message: "incomplete query".to_string(),
            offset: query.len(),
        }),
    }
}

fn parse_query(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    let (input, expr) = parse_expression(input)?;
    let (input, sort) = opt(parse_sortby).parse(input)?;
    let node = match sort {
        Some(keys) => CqlNode::Sort {
            child: Box::new(expr),
            keys,
        },
        None => expr,
    };
    Ok((input, node))
}

/// A chain of terms joined by one boolean operator. Mixing AND and OR in a
/// single chain is rejected so that precedence is always explicit.
fn parse_expression(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    let (mut rest, first) = parse_term(input)?;
    let mut children = vec![first];
    let mut chain_op: Option<BooleanOp> = None;

    loop {
        let (after_op, op) = match parse_boolean_op(rest) {
            Ok(found) => found,
            Err(_) => break,
        };
        match chain_op {
            None => chain_op = Some(op),
            Some(previous) if previous != op => {
                return Err(nom::Err::Failure(CqlParsingError::new(
                    rest,
                    "unparenthesized mix of AND and OR; group with parentheses",
                )));
            }
            Some(_) => {}
        }
        let (after_term, term) = match parse_term(after_op) {
            Ok(found) => found,
            Err(nom::Err::Incomplete(n)) => return Err(nom::Err::Incomplete(n)),
            Err(_) => {
                return Err(nom::Err::Failure(CqlParsingError::new(
                    after_op,
                    "expected a search term after boolean operator",
                )));
            }
        };
        children.push(term);
        rest = after_term;
    }

    let node = match chain_op {
        Some(op) => CqlNode::Boolean { op, children },
        // Chain of one: no boolean node at all.
        None => children.pop().expect("chain holds the first term"),
    };
    Ok((rest, node))
}

fn parse_boolean_op(input: &str) -> IResult<&str, BooleanOp, CqlParsingError<'_>> {
    alt((
        keyword("and").map(|_| BooleanOp::And),
        keyword("or").map(|_| BooleanOp::Or),
    ))
    .parse(input)
}

fn parse_term(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    alt((parse_not, parse_group, parse_comparison)).parse(input)
}

fn parse_not(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    let (input, child) = preceded(keyword("not"), parse_term).parse(input)?;
    Ok((
        input,
        CqlNode::Boolean {
            op: BooleanOp::Not,
            children: vec![child],
        },
    ))
}

fn parse_group(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    let (input, _) = ws(tag("(")).parse(input)?;
    let (input, expr) = parse_expression(input)?;
    let (input, _) = context("expected closing parenthesis", ws(tag(")"))).parse(input)?;
    Ok((input, expr))
}

fn parse_comparison(input: &str) -> IResult<&str, CqlNode, CqlParsingError<'_>> {
    let (input, field) = ws(field_ref).parse(input)?;
    let (input, op) = context("expected comparison operator", ws(parse_comparison_op))
        .parse(input)?;
    let (input, val) = match ws(value::parse_value).parse(input) {
        Ok(found) => found,
        Err(err @ nom::Err::Failure(_)) | Err(err @ nom::Err::Incomplete(_)) => return Err(err),
        Err(nom::Err::Error(_)) => {
            return Err(nom::Err::Failure(CqlParsingError::new(
                input,
                "expected a value after comparison operator",
            )));
        }
    };
    Ok((
        input,
        CqlNode::Comparison(Comparison {
            field,
            op,
            value: val,
        }),
    ))
}

fn parse_comparison_op(input: &str) -> IResult<&str, ComparisonOp, CqlParsingError<'_>> {
    // Two-character operators first so `==` is never read as `=`.
    alt((
        tag("==").map(|_| ComparisonOp::Exact),
        tag("<>").map(|_| ComparisonOp::NotEqual),
        tag("<=").map(|_| ComparisonOp::LessOrEqual),
        tag(">=").map(|_| ComparisonOp::GreaterOrEqual),
        tag("=").map(|_| ComparisonOp::Substring),
        tag("<").map(|_| ComparisonOp::Less),
        tag(">").map(|_| ComparisonOp::Greater),
    ))
    .parse(input)
}

fn parse_sortby(input: &str) -> IResult<&str, Vec<SortKey>, CqlParsingError<'_>> {
    preceded(keyword("sortby"), many1(parse_sort_key)).parse(input)
}

fn parse_sort_key(input: &str) -> IResult<&str, SortKey, CqlParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, field) = field_ref(input)?;
    let (input, direction) = opt(alt((
        keyword("desc").map(|_| true),
        keyword("asc").map(|_| false),
    )))
    .parse(input)?;
    Ok((
        input,
        SortKey {
            field,
            descending: direction.unwrap_or(false),
        },
    ))
}
