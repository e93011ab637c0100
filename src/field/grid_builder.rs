//! # Grid Builder
//!
//! Sample points of the slope field for each [`CoordinateSystem`]. Every grid is returned
//! as a pair of same-shape 2-D arrays (X, Y) in Cartesian space, rows follow the second
//! axis (y or angle) and columns the first one (x or radius), as `meshgrid` does.
use std::f64::consts::PI;

use itertools::{Itertools, MinMaxResult};
use log::info;
use ndarray::Array2;

use crate::errors::FieldError;
use crate::field::coordinate_system::CoordinateSystem;

/// step of the linear grids
pub const GRID_STEP: f64 = 0.05;
/// x step of the hexagonal lattice, y step is `HEX_STEP * sqrt(3)`
pub const HEX_STEP: f64 = 0.2;
/// inner radius of the polar grid
pub const POLAR_MIN_RADIUS: f64 = 0.01;
/// decimal exponent where log-spaced axes start (10^-1)
pub const LOG_START_EXPONENT: f64 = -1.0;
/// upper bound on the number of samples of one grid
pub const MAX_GRID_POINTS: usize = 4_000_000;

/// Sample coordinates of one render call, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl SampleGrid {
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self, FieldError> {
        if x.shape() != y.shape() {
            return Err(FieldError::DegenerateGeometry(format!(
                "grid arrays have different shapes {:?} and {:?}",
                x.shape(),
                y.shape()
            )));
        }
        if x.is_empty() {
            return Err(FieldError::Configuration(
                "grid has no sample points, increase the range".to_string(),
            ));
        }
        Ok(SampleGrid { x, y })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.x.dim()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// (min, max) of the x coordinates
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.x.iter())
    }

    /// (min, max) of the y coordinates
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.y.iter())
    }
}

/// min and max over the finite values, `None` if there are none
pub fn finite_bounds<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let finite = values.into_iter().copied().filter(|v| v.is_finite());
    match finite.minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Values `start, start + step, ...` below `stop` (half-open like numpy's `arange`).
/// A relative tolerance keeps float drift from adding a sample at `stop` itself.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let count = arange_count(start, stop, step);
    if !count.is_finite() {
        return Vec::new();
    }
    (0..count as usize).map(|i| start + i as f64 * step).collect()
}

/// number of values `arange` yields, as a float so that huge or non-finite
/// counts can be told apart before anything is allocated
fn arange_count(start: f64, stop: f64, step: f64) -> f64 {
    if !(step > 0.0) || !(stop > start) {
        return 0.0;
    }
    ((stop - start) / step - 1e-9).ceil().max(0.0)
}

/// `arange` with the axis length checked against [`MAX_GRID_POINTS`] first
fn checked_arange(name: &str, start: f64, stop: f64, step: f64) -> Result<Vec<f64>, FieldError> {
    let count = arange_count(start, stop, step);
    if !count.is_finite() || count > MAX_GRID_POINTS as f64 {
        return Err(FieldError::Configuration(format!(
            "{} axis of {} points exceeds the limit of {} points",
            name, count, MAX_GRID_POINTS
        )));
    }
    Ok(arange(start, stop, step))
}

/// `num_values` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values as f64 - 1.0);
            (0..num_values).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// `10^e` for `num_values` exponents evenly spaced from `start_exp` to `end_exp`
pub fn logspace(start_exp: f64, end_exp: f64, num_values: usize) -> Vec<f64> {
    linspace(start_exp, end_exp, num_values)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

/// Outer-product combination: `X[i, j] = xs[j]`, `Y[i, j] = ys[i]`.
pub fn meshgrid(xs: &[f64], ys: &[f64]) -> (Array2<f64>, Array2<f64>) {
    let shape = (ys.len(), xs.len());
    let x = Array2::from_shape_fn(shape, |(_, j)| xs[j]);
    let y = Array2::from_shape_fn(shape, |(i, _)| ys[i]);
    (x, y)
}

/// Polar samples converted to Cartesian: rows follow the angle, columns the radius.
pub fn polar_to_cartesian(radii: &[f64], angles: &[f64]) -> (Array2<f64>, Array2<f64>) {
    let (r, theta) = meshgrid(radii, angles);
    let x = &r * &theta.mapv(f64::cos);
    let y = &r * &theta.mapv(f64::sin);
    (x, y)
}

/// Extents must be positive and finite.
pub fn validate_extent(name: &str, value: f64) -> Result<f64, FieldError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FieldError::Configuration(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

fn check_size(columns: usize, rows: usize) -> Result<(), FieldError> {
    let total = columns.saturating_mul(rows);
    if total > MAX_GRID_POINTS {
        return Err(FieldError::Configuration(format!(
            "grid of {} x {} points exceeds the limit of {} points",
            rows, columns, MAX_GRID_POINTS
        )));
    }
    Ok(())
}

/// same as `check_size` for counts not yet converted to `usize`
fn check_size_f64(columns: f64, rows: f64) -> Result<(), FieldError> {
    let total = columns * rows;
    if !total.is_finite() || total > MAX_GRID_POINTS as f64 {
        return Err(FieldError::Configuration(format!(
            "grid of {} x {} points exceeds the limit of {} points",
            rows, columns, MAX_GRID_POINTS
        )));
    }
    Ok(())
}

/// number of samples of a log-spaced axis reaching up to `max` (truncated like `int()`)
fn log_axis_len(max: f64) -> usize {
    (max / GRID_STEP).floor() as usize
}

fn log_axis(max: f64) -> Vec<f64> {
    logspace(LOG_START_EXPONENT, max.log10(), log_axis_len(max))
}

fn lattice(x_max: f64, y_max: f64, x_step: f64, y_step: f64) -> Result<SampleGrid, FieldError> {
    let x_count = arange_count(-x_max, x_max + GRID_STEP, x_step);
    let y_count = arange_count(-y_max, y_max + GRID_STEP, y_step);
    check_size_f64(x_count, y_count)?;
    let xs = checked_arange("x", -x_max, x_max + GRID_STEP, x_step)?;
    let ys = checked_arange("y", -y_max, y_max + GRID_STEP, y_step)?;
    let (x, y) = meshgrid(&xs, &ys);
    SampleGrid::new(x, y)
}

fn polar(radii: Vec<f64>, angles: Vec<f64>) -> Result<SampleGrid, FieldError> {
    check_size(radii.len(), angles.len())?;
    let (x, y) = polar_to_cartesian(&radii, &angles);
    SampleGrid::new(x, y)
}

/// Builds the sample grid of `system` for the extents `x_max`, `y_max`.
///
/// Non-positive or non-finite extents, grids with no samples and grids above
/// [`MAX_GRID_POINTS`] are configuration errors.
pub fn build_grid(
    system: CoordinateSystem,
    x_max: f64,
    y_max: f64,
) -> Result<SampleGrid, FieldError> {
    let x_max = validate_extent("x range", x_max)?;
    let y_max = validate_extent("y range", y_max)?;
    let grid = match system {
        CoordinateSystem::Cartesian | CoordinateSystem::ComplexPlane => {
            lattice(x_max, y_max, GRID_STEP, GRID_STEP)?
        }
        CoordinateSystem::Hexagonal => lattice(x_max, y_max, HEX_STEP, HEX_STEP * 3f64.sqrt())?,
        CoordinateSystem::Polar => {
            let radius_count = arange_count(POLAR_MIN_RADIUS, x_max, GRID_STEP);
            let angle_count = arange_count(0.0, 2.0 * PI, GRID_STEP);
            check_size_f64(radius_count, angle_count)?;
            polar(
                checked_arange("radius", POLAR_MIN_RADIUS, x_max, GRID_STEP)?,
                arange(0.0, 2.0 * PI, GRID_STEP),
            )?
        }
        CoordinateSystem::LogPolar => {
            let angle_count = (2.0 * PI / GRID_STEP).floor() as usize;
            check_size(log_axis_len(x_max), angle_count)?;
            polar(log_axis(x_max), linspace(0.0, 2.0 * PI, angle_count))?
        }
        CoordinateSystem::LogLog => {
            check_size(log_axis_len(x_max), log_axis_len(y_max))?;
            let (x, y) = meshgrid(&log_axis(x_max), &log_axis(y_max));
            SampleGrid::new(x, y)?
        }
    };
    let (rows, columns) = grid.shape();
    info!(
        "built {} grid of {} x {} points for x range {}, y range {}",
        system, rows, columns, x_max, y_max
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arange_is_half_open() {
        let values = arange(0.0, 1.0, 0.25);
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75]);
        assert!(arange(1.0, 0.0, 0.1).is_empty());
        assert!(arange(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_linspace_and_logspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        let values = logspace(-1.0, 1.0, 3);
        assert_relative_eq!(values[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[2], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_meshgrid_layout() {
        let (x, y) = meshgrid(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!(x.dim(), (2, 3));
        assert_eq!(x[[1, 2]], 3.0);
        assert_eq!(y[[1, 2]], 20.0);
        assert_eq!(y[[0, 2]], 10.0);
    }

    #[test]
    fn test_cartesian_spans_range() {
        let grid = build_grid(CoordinateSystem::Cartesian, 10.0, 10.0).unwrap();
        assert_eq!(grid.x().shape(), grid.y().shape());
        let (x_min, x_max) = grid.x_bounds().unwrap();
        let (y_min, y_max) = grid.y_bounds().unwrap();
        assert_relative_eq!(x_min, -10.0);
        assert_relative_eq!(y_min, -10.0);
        assert!((x_max - 10.0).abs() <= GRID_STEP);
        assert!((y_max - 10.0).abs() <= GRID_STEP);
        assert_eq!(grid.shape(), (401, 401));
    }

    #[test]
    fn test_complex_plane_matches_cartesian() {
        let cartesian = build_grid(CoordinateSystem::Cartesian, 2.0, 3.0).unwrap();
        let complex = build_grid(CoordinateSystem::ComplexPlane, 2.0, 3.0).unwrap();
        assert_eq!(cartesian, complex);
    }

    #[test]
    fn test_polar_radii_from_inner_ring_to_range() {
        let grid = build_grid(CoordinateSystem::Polar, 5.0, 5.0).unwrap();
        assert_eq!(grid.x().shape(), grid.y().shape());
        // the inner ring is at POLAR_MIN_RADIUS itself, up to cos/sin rounding
        for (x, y) in grid.x().iter().zip(grid.y().iter()) {
            let r = x.hypot(*y);
            assert!(r >= POLAR_MIN_RADIUS - 1e-12 && r < 5.0, "radius {}", r);
        }
        assert_relative_eq!(grid.x()[[0, 0]], POLAR_MIN_RADIUS, epsilon = 1e-15);
        // 100 radii, 126 angles
        assert_eq!(grid.shape(), (126, 100));
    }

    #[test]
    fn test_log_polar_grid() {
        let grid = build_grid(CoordinateSystem::LogPolar, 2.0, 2.0).unwrap();
        assert_eq!(grid.shape(), (125, 40));
        for (x, y) in grid.x().iter().zip(grid.y().iter()) {
            let r = x.hypot(*y);
            assert!(r > 0.1 - 1e-9 && r < 2.0 + 1e-9, "radius {}", r);
        }
    }

    #[test]
    fn test_log_log_grid_is_positive() {
        let grid = build_grid(CoordinateSystem::LogLog, 1.0, 2.0).unwrap();
        assert_eq!(grid.shape(), (40, 20));
        let (x_min, x_max) = grid.x_bounds().unwrap();
        let (y_min, y_max) = grid.y_bounds().unwrap();
        assert_relative_eq!(x_min, 0.1, epsilon = 1e-12);
        assert_relative_eq!(x_max, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y_min, 0.1, epsilon = 1e-12);
        assert_relative_eq!(y_max, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hexagonal_steps() {
        let grid = build_grid(CoordinateSystem::Hexagonal, 1.0, 1.0).unwrap();
        let x = grid.x();
        let y = grid.y();
        assert_relative_eq!(x[[0, 1]] - x[[0, 0]], HEX_STEP, epsilon = 1e-12);
        assert_relative_eq!(y[[1, 0]] - y[[0, 0]], HEX_STEP * 3f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_extents() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = build_grid(CoordinateSystem::Cartesian, bad, 1.0);
            assert!(matches!(result, Err(FieldError::Configuration(_))));
        }
        // too small for a single log-spaced sample
        let result = build_grid(CoordinateSystem::LogLog, 0.01, 1.0);
        assert!(matches!(result, Err(FieldError::Configuration(_))));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let result = build_grid(CoordinateSystem::Cartesian, 1000.0, 1000.0);
        assert!(matches!(result, Err(FieldError::Configuration(_))));
    }

    #[test]
    fn test_huge_extent_is_configuration_error() {
        for system in [CoordinateSystem::Cartesian, CoordinateSystem::Polar] {
            let result = build_grid(system, 1e18, 1e18);
            assert!(
                matches!(result, Err(FieldError::Configuration(_))),
                "{} accepted a huge extent",
                system
            );
        }
        let result = build_grid(CoordinateSystem::Hexagonal, 1e300, 1.0);
        assert!(matches!(result, Err(FieldError::Configuration(_))));
    }

    #[test]
    fn test_finite_bounds_skip_nan() {
        let values = [f64::NAN, 3.0, -2.0, f64::INFINITY];
        assert_eq!(finite_bounds(values.iter()), Some((-2.0, 3.0)));
        assert_eq!(finite_bounds([f64::NAN].iter()), None);
    }
}
