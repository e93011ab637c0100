// the collection of utility parsers shared by the translator and the expression parser,
// mainly tokens and bracket checks
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    error::ParseError,
    multi::many0_count,
    sequence::{delimited, pair},
};

/// Wraps a parser so that surrounding whitespace is skipped.
pub fn ws<'a, O, E, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    E: ParseError<&'a str>,
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// identifier: letter or underscore followed by letters, digits, underscores
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Unsigned numeric literal: `12`, `1.5`, `3.`, `.25`, `2e-3`, `1.5E+4`.
/// A dangling exponent (`2e`) is not consumed, the `e` is left for the caller.
pub fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

/// true if every '(' has its pair and no ')' comes before its '('
pub fn brackets_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("sqrt(x)"), Ok(("(x)", "sqrt")));
        assert_eq!(identifier("log10 + 1"), Ok((" + 1", "log10")));
        assert!(identifier("2x").is_err());
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal("42+x"), Ok(("+x", "42")));
        assert_eq!(number_literal("0.05)"), Ok((")", "0.05")));
        assert_eq!(number_literal(".5"), Ok(("", ".5")));
        assert_eq!(number_literal("2e-3*x"), Ok(("*x", "2e-3")));
        assert_eq!(number_literal("2e"), Ok(("e", "2")));
        assert!(number_literal("x").is_err());
    }

    #[test]
    fn test_ws() {
        let mut parser = ws(identifier);
        assert_eq!(parser.parse("  x  +"), Ok(("+", "x")));
    }

    #[test]
    fn test_brackets_balanced() {
        assert!(brackets_balanced("sin((x+1)*(y))"));
        assert!(brackets_balanced("x"));
        assert!(!brackets_balanced("(x + y"));
        assert!(!brackets_balanced("x)("));
    }
}
