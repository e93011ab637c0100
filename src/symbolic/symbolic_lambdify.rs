use crate::errors::FieldError;
use crate::symbolic::symbolic_engine::Expr;

/// compiled form of an expression: takes the values of `vars` in the order given to
/// [`Expr::lambdify_guarded`]
pub type GuardedFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// natural logarithm, `NaN` outside (0, inf)
#[inline(always)]
pub fn guarded_ln(v: f64) -> f64 {
    if v > 0.0 { v.ln() } else { f64::NAN }
}

/// decimal logarithm, `NaN` outside (0, inf)
#[inline(always)]
pub fn guarded_log10(v: f64) -> f64 {
    if v > 0.0 { v.log10() } else { f64::NAN }
}

/// square root, `NaN` for negative arguments
#[inline(always)]
pub fn guarded_sqrt(v: f64) -> f64 {
    if v >= 0.0 { v.sqrt() } else { f64::NAN }
}

/// division, `NaN` when the denominator is zero
#[inline(always)]
pub fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
    ///
    /// Turns the expression into a closure over the variables `vars`. Out-of-domain
    /// arguments (logarithm of a non-positive value, square root of a negative value,
    /// division by zero) evaluate to `NaN` instead of failing, so a single bad point never
    /// spoils the others.
    ///
    /// A variable that is not listed in `vars` is a [`FieldError::Syntax`].
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("ln(x) + y").unwrap();
    /// let func = f.lambdify_guarded(&["x", "y"]).unwrap();
    /// assert_eq!(func(&[1.0, 2.0]), 2.0);
    /// assert!(func(&[-1.0, 2.0]).is_nan());
    /// ```
    pub fn lambdify_guarded(&self, vars: &[&str]) -> Result<GuardedFn, FieldError> {
        let compiled: GuardedFn = match self {
            Expr::Var(name) => {
                let index = vars.iter().position(|&x| x == name.as_str()).ok_or_else(|| {
                    FieldError::Syntax(format!(
                        "name '{}' is not defined, expected one of {:?}",
                        name, vars
                    ))
                })?;
                Box::new(move |args| args[index])
            }
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args| lhs_fn(args) + rhs_fn(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args| lhs_fn(args) - rhs_fn(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args| lhs_fn(args) * rhs_fn(args))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args| guarded_div(lhs_fn(args), rhs_fn(args)))
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify_guarded(vars)?;
                let exp_fn = exp.lambdify_guarded(vars)?;
                Box::new(move |args| base_fn(args).powf(exp_fn(args)))
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| expr_fn(args).exp())
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| guarded_ln(expr_fn(args)))
            }
            Expr::Log10(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| guarded_log10(expr_fn(args)))
            }
            Expr::Sqrt(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| guarded_sqrt(expr_fn(args)))
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| expr_fn(args).sin())
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| expr_fn(args).cos())
            }
            Expr::tg(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                Box::new(move |args| expr_fn(args).tan())
            }
        };
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn compile(input: &str) -> GuardedFn {
        Expr::parse_expression(input)
            .unwrap()
            .lambdify_guarded(&["x", "y"])
            .unwrap()
    }

    #[test]
    fn test_arithmetic() {
        let f = compile("x^2 + 3*y - 1/4");
        assert_relative_eq!(f(&[2.0, 1.0]), 6.75);
    }

    #[test]
    fn test_functions() {
        let f = compile("sin(x) + cos(y)");
        assert_relative_eq!(f(&[0.0, 0.0]), 1.0);
        let f = compile("log(x)");
        assert_relative_eq!(f(&[1000.0, 0.0]), 3.0, epsilon = 1e-12);
        let f = compile("ln(x)");
        assert_relative_eq!(f(&[std::f64::consts::E, 0.0]), 1.0, epsilon = 1e-12);
        let f = compile("sqrt(x*y)");
        assert_relative_eq!(f(&[2.0, 8.0]), 4.0);
        let f = compile("tan(x)");
        assert_relative_eq!(f(&[std::f64::consts::FRAC_PI_4, 0.0]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_domain_guards() {
        assert!(compile("ln(x)")(&[0.0, 0.0]).is_nan());
        assert!(compile("log(x)")(&[-5.0, 0.0]).is_nan());
        assert!(compile("sqrt(y)")(&[0.0, -1.0]).is_nan());
        assert!(compile("1/0")(&[3.0, 3.0]).is_nan());
        assert!(compile("x/y")(&[1.0, 0.0]).is_nan());
        assert_relative_eq!(compile("x/y")(&[1.0, 4.0]), 0.25);
    }

    #[test]
    fn test_constant_expression_ignores_arguments() {
        let f = compile("2*pi");
        assert_relative_eq!(f(&[100.0, -100.0]), 2.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_unknown_variable_is_syntax_error() {
        let expr = Expr::var("t") + Expr::var("x");
        let result = expr.lambdify_guarded(&["x", "y"]);
        assert!(matches!(result, Err(FieldError::Syntax(_))));
    }
}
