//! a module turns a numeric expression String into a symbolic expression
//!# Example
//! ```
//! use RustedSlopeField::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("x^2 + sin(x*y)").unwrap();
//! println!(" parsed_expression {}", parsed_expression);
//! ```
use crate::errors::FieldError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::translator::{NAMESPACE, translate};
use crate::symbolic::utils::{brackets_balanced, identifier, number_literal, ws};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{all_consuming, map, map_res, not, opt, verify},
    error::{Error, ErrorKind},
    multi::fold_many0,
    sequence::{delimited, pair, preceded, terminated},
};
//    grammar of the numeric notation, lowest precedence first
//
//    expr    := term (('+' | '-') term)*
//    term    := unary (('*' | '/') unary)*
//    unary   := '-' unary | '+' unary | power
//    power   := atom ('**' unary)?            right associative, -x**2 == -(x**2)
//    atom    := number | num.<func>(expr) | num.PI | num.E | x | y | '(' expr ')'
//
// the only names in scope are the two field variables and the `num.` library

/// variables a slope expression may depend on
pub const FIELD_VARIABLES: [&str; 2] = ["x", "y"];

fn library_function(name: &str, argument: Expr) -> Option<Expr> {
    let argument = argument.boxed();
    match name {
        "sin" => Some(Expr::sin(argument)),
        "cos" => Some(Expr::cos(argument)),
        "tan" => Some(Expr::tg(argument)),
        "log10" => Some(Expr::Log10(argument)),
        "ln" => Some(Expr::Ln(argument)),
        "sqrt" => Some(Expr::Sqrt(argument)),
        "exp" => Some(Expr::Exp(argument)),
        _ => None,
    }
}

fn library_constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn namespaced(input: &str) -> IResult<&str, &str> {
    preceded(pair(tag(NAMESPACE), char('.')), identifier).parse(input)
}

fn function_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = namespaced(input)?;
    let (rest, argument) = delimited(ws(char('(')), expr, ws(char(')'))).parse(rest)?;
    match library_function(name, argument) {
        Some(call) => Ok((rest, call)),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    }
}

fn constant(input: &str) -> IResult<&str, Expr> {
    map_res(namespaced, |name| {
        library_constant(name).map(Expr::Const).ok_or(ErrorKind::Tag)
    })
    .parse(input)
}

fn variable(input: &str) -> IResult<&str, Expr> {
    map(
        verify(identifier, |name: &str| FIELD_VARIABLES.contains(&name)),
        Expr::var,
    )
    .parse(input)
}

fn number(input: &str) -> IResult<&str, Expr> {
    map_res(number_literal, |digits: &str| digits.parse::<f64>().map(Expr::Const)).parse(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        number,
        function_call,
        constant,
        variable,
        delimited(char('('), expr, ws(char(')'))),
    )))
    .parse(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(ws(tag("**")), unary)).parse(input)?;
    let parsed = match exponent {
        Some(exponent) => base.pow(exponent),
        None => base,
    };
    Ok((input, parsed))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |inner| -inner),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    fold_many0(
        pair(
            ws(alt((terminated(char('*'), not(char('*'))), char('/')))),
            unary,
        ),
        move || first.clone(),
        |acc, (op, rhs)| if op == '*' { acc * rhs } else { acc / rhs },
    )
    .parse(input)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), term),
        move || first.clone(),
        |acc, (op, rhs)| if op == '+' { acc + rhs } else { acc - rhs },
    )
    .parse(input)
}

/// Parses an expression in the numeric notation produced by the translator
/// (`x**2 + num.sin(x)`) into a symbolic expression.
///
/// Any token outside the closed vocabulary, unbalanced brackets or trailing input is a
/// [`FieldError::Syntax`].
pub fn parse_numeric_expression(input: &str) -> Result<Expr, FieldError> {
    if input.trim().is_empty() {
        return Err(FieldError::Syntax("empty expression".to_string()));
    }
    if !brackets_balanced(input) {
        return Err(FieldError::Syntax(format!(
            "unbalanced parentheses in '{}'",
            input
        )));
    }
    match all_consuming(ws(expr)).parse(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(FieldError::Syntax(format!(
            "cannot parse '{}' near '{}'",
            input, e.input
        ))),
        Err(nom::Err::Incomplete(_)) => Err(FieldError::Syntax(format!(
            "incomplete expression '{}'",
            input
        ))),
    }
}

impl Expr {
    /// Translates a calculator-style string and parses it into a symbolic expression.
    pub fn parse_expression(input: &str) -> Result<Expr, FieldError> {
        parse_numeric_expression(&translate(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Box<Expr> {
        Box::new(Expr::Var("x".to_string()))
    }

    fn y() -> Box<Expr> {
        Box::new(Expr::Var("y".to_string()))
    }

    #[test]
    fn test_parse_constant() {
        let expr = parse_numeric_expression("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_numeric_expression("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_addition() {
        let expr = parse_numeric_expression("x + 2").unwrap();
        assert_eq!(expr, Expr::Add(x(), Box::new(Expr::Const(2.0))));
    }

    #[test]
    fn test_parse_subtraction_is_left_associative() {
        let expr = parse_numeric_expression("x - y - 1").unwrap();
        let expected = Expr::Sub(
            Box::new(Expr::Sub(x(), y())),
            Box::new(Expr::Const(1.0)),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_numeric_expression("x + y * 2").unwrap();
        let expected = Expr::Add(x(), Box::new(Expr::Mul(y(), Box::new(Expr::Const(2.0)))));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_power() {
        let expr = parse_numeric_expression("x**2").unwrap();
        assert_eq!(expr, Expr::Pow(x(), Box::new(Expr::Const(2.0))));
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_numeric_expression("x**y**2").unwrap();
        let expected = Expr::Pow(x(), Box::new(Expr::Pow(y(), Box::new(Expr::Const(2.0)))));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let expr = parse_numeric_expression("-x**2").unwrap();
        let expected = Expr::Mul(
            Box::new(Expr::Const(-1.0)),
            Box::new(Expr::Pow(x(), Box::new(Expr::Const(2.0)))),
        );
        assert_eq!(expr, expected);
        assert_eq!(parse_numeric_expression("-3").unwrap(), Expr::Const(-3.0));
    }

    #[test]
    fn test_parse_functions() {
        let expr = parse_numeric_expression("num.sin(x) + num.log10(y)").unwrap();
        let expected = Expr::Add(
            Box::new(Expr::sin(x())),
            Box::new(Expr::Log10(y())),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_nested_functions() {
        let expr = parse_numeric_expression("num.sqrt(num.ln(num.cos(x)))").unwrap();
        let expected = Expr::Sqrt(Box::new(Expr::Ln(Box::new(Expr::cos(x())))));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_library_constants() {
        let expr = parse_numeric_expression("2*num.PI").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Const(2.0)),
                Box::new(Expr::Const(std::f64::consts::PI))
            )
        );
    }

    #[test]
    fn test_parse_brackets() {
        let expr = parse_numeric_expression("(x + y) * (x - 2) / num.exp(y)").unwrap();
        let expected = Expr::Div(
            Box::new(Expr::Mul(
                Box::new(Expr::Add(x(), y())),
                Box::new(Expr::Sub(x(), Box::new(Expr::Const(2.0)))),
            )),
            Box::new(Expr::Exp(y())),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_round_trip_through_numeric_string() {
        let expr = parse_numeric_expression("num.tan(x)**2 - 3/(y + 1)").unwrap();
        let reparsed = parse_numeric_expression(&expr.to_numeric_string()).unwrap();
        assert_eq!(expr, reparsed);
    }

    #[test]
    fn test_parse_expression_from_calculator_notation() {
        let expr = Expr::parse_expression("x^2 + sin(x)").unwrap();
        let expected = Expr::Add(
            Box::new(Expr::Pow(x(), Box::new(Expr::Const(2.0)))),
            Box::new(Expr::sin(x())),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unbalanced_brackets() {
        let result = parse_numeric_expression("(x + y");
        assert!(matches!(result, Err(FieldError::Syntax(_))));
        let result = parse_numeric_expression("num.sin(x))");
        assert!(matches!(result, Err(FieldError::Syntax(_))));
    }

    #[test]
    fn test_invalid_expressions() {
        for input in ["", "   ", "x +", "* x", "x y", "z + 1", "num.sinh(x)", "num.PI(x)", "x $ y", "2 ** "] {
            let result = parse_numeric_expression(input);
            assert!(
                matches!(result, Err(FieldError::Syntax(_))),
                "'{}' should not compile",
                input
            );
        }
    }
}
