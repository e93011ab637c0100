//! # Symbolic Engine Module
//!
//! Expression tree used by the slope field pipeline. A calculator-style string is
//! translated, parsed into an [`Expr`] and then turned into a plain Rust closure
//! (see `symbolic_lambdify`).
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - the field variables "x" and "y"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `Log10`, `Sqrt`, `sin`, `cos`, `tg`
//!
//! ### Key Methods
//! - `Var(name)` / `Const(value)` helpers via [`Expr::var`] and [`Expr::constant`]
//! - `extract_variables()` - names of all variables the expression depends on
//! - `to_numeric_string()` - back to the namespaced numeric notation
//!
//! Operator overloading (`+ - * / neg`) is provided so trees can be built as `x + y * z`.

#![allow(non_camel_case_types)]

use std::fmt;

use crate::symbolic::translator::NAMESPACE;

/// Core symbolic expression enum representing a slope expression `f(x, y)` as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedSlopeField::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name ("x" or "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Decimal logarithm: log(x) in calculator notation
    Log10(Box<Expr>),
    /// Square root
    Sqrt(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
}

/// Converts expressions to human-readable calculator notation with parentheses
/// for proper precedence.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::Log10(expr) => write!(f, "log({})", expr),
            Expr::Sqrt(expr) => write!(f, "sqrt({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Expr::Const(val) => Expr::Const(-val),
            other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
        }
    }
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn constant(val: f64) -> Expr {
        Expr::Const(val)
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::Pow(self.boxed(), exponent.boxed())
    }

    /// Returns the sorted, deduplicated names of all variables in the expression.
    pub fn extract_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Expr::Var(name) => vars.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Log10(expr)
            | Expr::Sqrt(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => expr.collect_variables(vars),
        }
    }

    /// true when the expression depends on neither x nor y
    pub fn is_constant(&self) -> bool {
        self.extract_variables().is_empty()
    }

    /// Renders the tree in the namespaced numeric notation accepted by
    /// `parse_expr::parse_numeric_expression`, fully parenthesised.
    pub fn to_numeric_string(&self) -> String {
        let unary = |name: &str, inner: &Expr| {
            format!("{}.{}({})", NAMESPACE, name, inner.to_numeric_string())
        };
        match self {
            Expr::Var(name) => name.clone(),
            Expr::Const(val) if *val < 0.0 => format!("({:?})", val),
            Expr::Const(val) => format!("{:?}", val),
            Expr::Add(lhs, rhs) => format!("({} + {})", lhs.to_numeric_string(), rhs.to_numeric_string()),
            Expr::Sub(lhs, rhs) => format!("({} - {})", lhs.to_numeric_string(), rhs.to_numeric_string()),
            Expr::Mul(lhs, rhs) => format!("({} * {})", lhs.to_numeric_string(), rhs.to_numeric_string()),
            Expr::Div(lhs, rhs) => format!("({} / {})", lhs.to_numeric_string(), rhs.to_numeric_string()),
            Expr::Pow(lhs, rhs) => format!("({} ** {})", lhs.to_numeric_string(), rhs.to_numeric_string()),
            Expr::Exp(expr) => unary("exp", expr),
            Expr::Ln(expr) => unary("ln", expr),
            Expr::Log10(expr) => unary("log10", expr),
            Expr::Sqrt(expr) => unary("sqrt", expr),
            Expr::sin(expr) => unary("sin", expr),
            Expr::cos(expr) => unary("cos", expr),
            Expr::tg(expr) => unary("tan", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_build_tree() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let expr = x.clone() + y.clone() * Expr::Const(2.0);
        let expected = Expr::Add(
            Box::new(x),
            Box::new(Expr::Mul(Box::new(y), Box::new(Expr::Const(2.0)))),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_neg() {
        assert_eq!(-Expr::Const(3.0), Expr::Const(-3.0));
        assert_eq!(
            -Expr::var("x"),
            Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(Expr::var("x")))
        );
    }

    #[test]
    fn test_extract_variables() {
        let expr = Expr::sin(Box::new(Expr::var("y") * Expr::var("x"))) + Expr::var("x");
        assert_eq!(expr.extract_variables(), vec!["x".to_string(), "y".to_string()]);
        assert!(Expr::Log10(Box::new(Expr::Const(5.0))).is_constant());
    }

    #[test]
    fn test_display() {
        let expr = Expr::var("x").pow(Expr::Const(2.0)) + Expr::Log10(Box::new(Expr::var("y")));
        assert_eq!(expr.to_string(), "((x ^ 2) + log(y))");
    }

    #[test]
    fn test_to_numeric_string() {
        let expr = Expr::tg(Box::new(Expr::var("x"))) - Expr::Const(-1.5);
        assert_eq!(expr.to_numeric_string(), "(num.tan(x) - (-1.5))");
    }
}
