//! Calculator notation -> numeric expression notation.
//!
//! The raw string is split into tokens (numbers, identifiers, `^`, everything else) and
//! every identifier is rewritten at most once, so `log` can never turn into
//! `num.num.log10` and `ln` inside an already rewritten name is never touched again.
//! Tokens that are not recognised are passed through unchanged; rejecting them is the job
//! of the compiler.
//!
//! | calculator | numeric        |
//! |------------|----------------|
//! | `^`        | `**`           |
//! | `sin`      | `num.sin`      |
//! | `cos`      | `num.cos`      |
//! | `tan`      | `num.tan`      |
//! | `log`      | `num.log10`    |
//! | `ln`       | `num.ln`       |
//! | `sqrt`     | `num.sqrt`     |
//! | `exp`      | `num.exp`      |
//! | `pi`, `π`  | `num.PI`       |
//! | `e`        | `num.E`        |
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take},
    combinator::map,
};

use crate::symbolic::utils::{identifier, number_literal};

/// namespace of the numeric function library in translated expressions
pub const NAMESPACE: &str = "num";
/// power operator of the numeric notation
pub const POWER_OPERATOR: &str = "**";

#[derive(Debug, Clone, PartialEq)]
enum CalcToken<'a> {
    Number(&'a str),
    Ident(&'a str),
    Caret,
    Pi,
    Other(&'a str),
}

fn calc_token(input: &str) -> IResult<&str, CalcToken<'_>> {
    alt((
        map(number_literal, CalcToken::Number),
        map(identifier, CalcToken::Ident),
        map(tag("^"), |_| CalcToken::Caret),
        map(tag("π"), |_| CalcToken::Pi),
        map(take(1usize), CalcToken::Other),
    ))
    .parse(input)
}

/// Numeric-library name for a calculator identifier, `None` for identifiers that are
/// kept as they are (variables and unknown names).
pub fn numeric_name(calculator_name: &str) -> Option<&'static str> {
    match calculator_name {
        "sin" => Some("sin"),
        "cos" => Some("cos"),
        "tan" => Some("tan"),
        "log" => Some("log10"),
        "ln" => Some("ln"),
        "sqrt" => Some("sqrt"),
        "exp" => Some("exp"),
        "pi" => Some("PI"),
        "e" => Some("E"),
        _ => None,
    }
}

/// Rewrites a calculator-style expression (`x^2 + sin(x)`) into the numeric notation
/// (`x**2 + num.sin(x)`). Never fails: the output may still be an invalid expression.
pub fn translate(raw: &str) -> String {
    let mut translated = String::with_capacity(raw.len() * 2);
    let mut rest = raw;
    while !rest.is_empty() {
        let Ok((remaining, token)) = calc_token(rest) else {
            // take(1) only fails on empty input
            translated.push_str(rest);
            break;
        };
        match token {
            CalcToken::Number(digits) => translated.push_str(digits),
            CalcToken::Ident(name) => match numeric_name(name) {
                Some(numeric) => {
                    translated.push_str(NAMESPACE);
                    translated.push('.');
                    translated.push_str(numeric);
                }
                None => translated.push_str(name),
            },
            CalcToken::Caret => translated.push_str(POWER_OPERATOR),
            CalcToken::Pi => {
                translated.push_str(NAMESPACE);
                translated.push_str(".PI");
            }
            CalcToken::Other(ch) => translated.push_str(ch),
        }
        rest = remaining;
    }
    debug!("translated '{}' into '{}'", raw, translated);
    translated
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALCULATOR_FUNCTIONS: [&str; 6] = ["sin", "cos", "tan", "log", "ln", "sqrt"];

    /// every occurrence of a calculator function name must sit right after "num."
    fn all_names_namespaced(translated: &str) -> bool {
        CALCULATOR_FUNCTIONS.iter().all(|name| {
            translated
                .match_indices(name)
                .all(|(pos, _)| pos >= 4 && &translated[pos - 4..pos] == "num.")
        })
    }

    #[test]
    fn test_power_and_trig() {
        assert_eq!(translate("x^2 + sin(x)"), "x**2 + num.sin(x)");
    }

    #[test]
    fn test_log_is_decimal_and_ln_is_natural() {
        assert_eq!(translate("log(x) - ln(y)"), "num.log10(x) - num.ln(y)");
    }

    #[test]
    fn test_no_double_substitution() {
        let translated = translate("log(ln(sqrt(x)))");
        assert_eq!(translated, "num.log10(num.ln(num.sqrt(x)))");
        assert!(!translated.contains("num.num"));
    }

    #[test]
    fn test_output_has_no_caret_and_no_bare_names() {
        let inputs = [
            "x^2 + sin(x)",
            "sin(x*y) + cos(x - y)",
            "tan(x)^2 - log(y^2+1)",
            "sqrt(ln(x)) * log(x)^y",
            "cos(sin(tan(x)))^(1/3)",
            "ln(x)+ln(y)+log(x*y)",
        ];
        for input in inputs {
            let translated = translate(input);
            assert!(!translated.contains('^'), "{}", translated);
            assert!(all_names_namespaced(&translated), "{}", translated);
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(translate("2*pi*x"), "2*num.PI*x");
        assert_eq!(translate("π/2"), "num.PI/2");
        assert_eq!(translate("e^x"), "num.E**x");
        assert_eq!(translate("exp(-x)"), "num.exp(-x)");
    }

    #[test]
    fn test_numbers_keep_exponent() {
        assert_eq!(translate("1e-3*x"), "1e-3*x");
        assert_eq!(translate("2.5^y"), "2.5**y");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(translate("sinh(x) + z"), "sinh(x) + z");
        assert_eq!(translate("x $ y"), "x $ y");
        assert_eq!(translate(""), "");
    }
}
