#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// calculator notation -> numeric notation (`x^2 + sin(x)` -> `x**2 + num.sin(x)`)
///# Example
/// ```
/// use RustedSlopeField::symbolic::translator::translate;
/// assert_eq!(translate("x^2 + sin(x)"), "x**2 + num.sin(x)");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod translator;
/// a module turns a String expression in numeric notation into a symbolic expression
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// expression tree of a slope function f(x, y)
///# Example#
/// ```
/// use RustedSlopeField::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("sin(x*y) + cos(x - y)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.extract_variables(), vec!["x".to_string(), "y".to_string()]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// turns a symbolic expression into a Rust closure with domain guards
pub mod symbolic_lambdify;
///______________________________________________________________________________________________________________________________________________
/// compiled slope function evaluated over whole sample grids
/// Example#
/// ```
/// use RustedSlopeField::symbolic::evaluator::make_evaluator;
/// use RustedSlopeField::symbolic::translator::translate;
/// use ndarray::Array2;
/// let evaluator = make_evaluator(&translate("x*y")).unwrap();
/// let x = Array2::from_elem((2, 2), 3.0);
/// let y = Array2::from_elem((2, 2), 2.0);
/// let v = evaluator.evaluate(&x, &y);
/// assert_eq!(v[[1, 1]], 6.0);
/// ```
pub mod evaluator;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility parsers shared by the translator and the expression parser
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
