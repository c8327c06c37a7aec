use nom::{
    bytes::complete::{tag, tag_no_case},
    character::complete::{alphanumeric1, multispace0, satisfy},
    combinator::{not, opt, recognize},
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use super::ast::FieldRef;
use super::errors::CqlParsingError;

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// one or more alphanumerics with optional embedded underscores, e.g.
// "prefix", "cindex" or "account_creation_date".
pub fn identifier(input: &str) -> IResult<&str, &str, CqlParsingError<'_>> {
    recognize(pair(alphanumeric1, many0(pair(tag("_"), alphanumeric1)))).parse(input)
}

/// A case-insensitive keyword that must not run into a following identifier,
/// so `android` is never read as the keyword `and`.
pub fn keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = CqlParsingError<'a>> {
    ws(terminated(
        tag_no_case(kw),
        not(satisfy(is_identifier_char)),
    ))
}

/// `name` or `qualifier.name`.
pub fn field_ref(input: &str) -> IResult<&str, FieldRef, CqlParsingError<'_>> {
    let (input, first) = identifier(input)?;
    let (input, second) = opt(nom::sequence::preceded(tag("."), identifier)).parse(input)?;
    let field = match second {
        Some(name) => FieldRef::qualified(first, name),
        None => FieldRef::local(first),
    };
    Ok((input, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_accepts_underscores() {
        assert_eq!(identifier("account_creation x"), Ok((" x", "account_creation")));
        assert_eq!(identifier("a1b2"), Ok(("", "a1b2")));
        assert!(identifier("_leading").is_err());
    }

    #[test]
    fn field_ref_parses_qualifier() {
        assert_eq!(
            field_ref("tableb.prefix rest"),
            Ok((" rest", FieldRef::qualified("tableb", "prefix")))
        );
        assert_eq!(field_ref("name = x"), Ok((" = x", FieldRef::local("name"))));
    }

    #[test]
    fn keyword_requires_word_boundary() {
        assert!(keyword("and").parse("and next").is_ok());
        assert!(keyword("and").parse("AND next").is_ok());
        assert!(keyword("and").parse("android").is_err());
    }
}
