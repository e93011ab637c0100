//! Compiled slope function `(x, y) -> dy/dx` with fault containment.
//!
//! Compilation is strict: a malformed expression is returned to the caller as
//! [`FieldError::Syntax`]. Evaluation is lenient: it never fails, failing points and
//! failing calls become `NaN`.
use std::fmt;

use log::{debug, error, info, warn};
use ndarray::{Array2, Zip};

use crate::errors::FieldError;
use crate::symbolic::parse_expr::{FIELD_VARIABLES, parse_numeric_expression};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::GuardedFn;

/// Compiled form of one numeric expression bound to `x` and `y`.
///
/// Built per expression and never cached: a new expression gives a new `CompiledField`.
pub struct CompiledField {
    expression: Expr,
    function: GuardedFn,
}

impl fmt::Debug for CompiledField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompiledField")
            .field("expression", &self.expression)
            .finish()
    }
}

/// Compiles a numeric expression (translator output) into a [`CompiledField`].
pub fn make_evaluator(expr: &str) -> Result<CompiledField, FieldError> {
    let expression = parse_numeric_expression(expr)?;
    let function = expression.lambdify_guarded(&FIELD_VARIABLES)?;
    info!("compiled slope expression: {}", expression);
    Ok(CompiledField {
        expression,
        function,
    })
}

impl CompiledField {
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Slope at a single point; out-of-domain and non-finite results are `NaN`.
    pub fn evaluate_point(&self, x: f64, y: f64) -> f64 {
        let value = (self.function)(&[x, y]);
        if value.is_finite() { value } else { f64::NAN }
    }

    /// Element-wise evaluation over two same-shape arrays.
    ///
    /// Never fails: on a shape mismatch the error is logged and an all-`NaN` array shaped
    /// like `x` is returned.
    pub fn evaluate(&self, x: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
        if x.shape() != y.shape() {
            error!(
                "Eval error: x has shape {:?} but y has shape {:?}",
                x.shape(),
                y.shape()
            );
            return Array2::from_elem(x.raw_dim(), f64::NAN);
        }
        let values = Zip::from(x)
            .and(y)
            .map_collect(|&xi, &yi| self.evaluate_point(xi, yi));
        let failed = values.iter().filter(|v| v.is_nan()).count();
        if failed > 0 {
            warn!(
                "Eval error: {} of {} points are undefined for {}",
                failed,
                values.len(),
                self.expression
            );
        } else {
            debug!("evaluated {} points", values.len());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::translator::translate;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_shape_is_preserved() {
        let evaluator = make_evaluator(&translate("x*y")).unwrap();
        let x = Array2::from_elem((3, 7), 2.0);
        let y = Array2::from_elem((3, 7), 0.5);
        let v = evaluator.evaluate(&x, &y);
        assert_eq!(v.shape(), &[3, 7]);
        assert!(v.iter().all(|&value| value == 1.0));
    }

    #[test]
    fn test_nan_exactly_at_failing_points() {
        let evaluator = make_evaluator(&translate("ln(x)")).unwrap();
        let x = array![[-1.0, 1.0], [0.0, std::f64::consts::E]];
        let y = Array2::zeros((2, 2));
        let v = evaluator.evaluate(&x, &y);
        assert!(v[[0, 0]].is_nan());
        assert!(v[[1, 0]].is_nan());
        assert_relative_eq!(v[[0, 1]], 0.0);
        assert_relative_eq!(v[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_global_fault_gives_all_nan() {
        let evaluator = make_evaluator(&translate("1/0")).unwrap();
        let x = Array2::from_elem((4, 4), 1.0);
        let v = evaluator.evaluate(&x, &x.clone());
        assert!(v.iter().all(|value| value.is_nan()));
    }

    #[test]
    fn test_shape_mismatch_is_contained() {
        let evaluator = make_evaluator(&translate("x + y")).unwrap();
        let x = Array2::from_elem((2, 3), 1.0);
        let y = Array2::from_elem((3, 2), 1.0);
        let v = evaluator.evaluate(&x, &y);
        assert_eq!(v.shape(), &[2, 3]);
        assert!(v.iter().all(|value| value.is_nan()));
    }

    #[test]
    fn test_overflow_becomes_nan() {
        let evaluator = make_evaluator(&translate("exp(x)")).unwrap();
        assert!(evaluator.evaluate_point(1000.0, 0.0).is_nan());
        assert_relative_eq!(evaluator.evaluate_point(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_compile_errors_are_returned() {
        assert!(matches!(
            make_evaluator(&translate("sin(x")),
            Err(FieldError::Syntax(_))
        ));
        assert!(matches!(
            make_evaluator(&translate("x + t")),
            Err(FieldError::Syntax(_))
        ));
    }
}
