//! Integral curves of the direction field (1, f(x, y)).
//!
//! Seeds are taken from a coarse occupancy mask spanning the plot bounds, visited from the
//! border towards the center. Each seed is integrated forward and backward with midpoint
//! (RK2) steps of the unit direction; a curve stops when it leaves the bounds, hits an
//! undefined slope or runs into a mask cell already claimed by another curve. Curves
//! shorter than a minimum length are discarded and their cells released.
use log::{debug, info};

use crate::field::colormap::{ColorNorm, Colormap, RgbaColor};
use crate::symbolic::evaluator::CompiledField;

/// mask cells per unit of density along each axis
pub const MASK_CELLS_PER_DENSITY: f64 = 30.0;
/// default seeding density
pub const DEFAULT_DENSITY: f64 = 1.5;
/// default stroke width of a streamline
pub const DEFAULT_STREAM_WIDTH: f64 = 0.7;
/// integration step as a fraction of one mask cell
const STEP_FRACTION: f64 = 0.5;
/// minimum curve length as a fraction of the mean plot extent
const MIN_LENGTH_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamlineOptions {
    pub density: f64,
    pub line_width: f64,
}

impl Default for StreamlineOptions {
    fn default() -> Self {
        StreamlineOptions {
            density: DEFAULT_DENSITY,
            line_width: DEFAULT_STREAM_WIDTH,
        }
    }
}

/// One traced curve, `points[i]` has slope `values[i]` and color `colors[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Streamline {
    pub points: Vec<(f64, f64)>,
    pub values: Vec<f64>,
    pub colors: Vec<RgbaColor>,
}

impl Streamline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// polyline length in plot units
    pub fn arc_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .sum()
    }
}

/// Rectangle of the plot, used for both seeding and termination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

struct OccupancyMask {
    nx: usize,
    ny: usize,
    cells: Vec<bool>,
    bounds: Bounds,
}

impl OccupancyMask {
    fn new(bounds: Bounds, density: f64) -> Self {
        let side = (MASK_CELLS_PER_DENSITY * density).round().max(1.0) as usize;
        OccupancyMask {
            nx: side,
            ny: side,
            cells: vec![false; side * side],
            bounds,
        }
    }

    fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let fx = (x - self.bounds.x_min) / self.bounds.width() * self.nx as f64;
        let fy = (y - self.bounds.y_min) / self.bounds.height() * self.ny as f64;
        let i = (fx.floor() as usize).min(self.nx - 1);
        let j = (fy.floor() as usize).min(self.ny - 1);
        Some((i, j))
    }

    fn center(&self, i: usize, j: usize) -> (f64, f64) {
        (
            self.bounds.x_min + (i as f64 + 0.5) / self.nx as f64 * self.bounds.width(),
            self.bounds.y_min + (j as f64 + 0.5) / self.ny as f64 * self.bounds.height(),
        )
    }

    fn is_free(&self, cell: (usize, usize)) -> bool {
        !self.cells[cell.1 * self.nx + cell.0]
    }

    fn set(&mut self, cell: (usize, usize), value: bool) {
        self.cells[cell.1 * self.nx + cell.0] = value;
    }

    fn cell_size(&self) -> f64 {
        (self.bounds.width() / self.nx as f64).min(self.bounds.height() / self.ny as f64)
    }
}

/// Mask cells ordered from the outer ring inwards, clockwise-ish along each ring.
pub fn spiral_seed_order(nx: usize, ny: usize) -> Vec<(usize, usize)> {
    let mut order = Vec::with_capacity(nx * ny);
    if nx == 0 || ny == 0 {
        return order;
    }
    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) = (0i64, nx as i64 - 1, 0i64, ny as i64 - 1);
    while x_lo <= x_hi && y_lo <= y_hi {
        for i in x_lo..=x_hi {
            order.push((i as usize, y_lo as usize));
        }
        for j in (y_lo + 1)..=y_hi {
            order.push((x_hi as usize, j as usize));
        }
        if y_lo < y_hi {
            for i in (x_lo..x_hi).rev() {
                order.push((i as usize, y_hi as usize));
            }
        }
        if x_lo < x_hi {
            for j in ((y_lo + 1)..y_hi).rev() {
                order.push((x_lo as usize, j as usize));
            }
        }
        x_lo += 1;
        x_hi -= 1;
        y_lo += 1;
        y_hi -= 1;
    }
    order
}

/// unit direction of (1, slope), `None` where the slope is undefined
fn direction(field: &CompiledField, x: f64, y: f64) -> Option<(f64, f64)> {
    let slope = field.evaluate_point(x, y);
    if !slope.is_finite() {
        return None;
    }
    let norm = 1.0f64.hypot(slope);
    Some((1.0 / norm, slope / norm))
}

/// one midpoint step of signed length `h`
fn rk2_step(field: &CompiledField, x: f64, y: f64, h: f64) -> Option<(f64, f64)> {
    let (dx1, dy1) = direction(field, x, y)?;
    let (xm, ym) = (x + 0.5 * h * dx1, y + 0.5 * h * dy1);
    let (dx2, dy2) = direction(field, xm, ym)?;
    Some((x + h * dx2, y + h * dy2))
}

/// Integrates from `start` in one direction and returns the visited points (without
/// `start`) and the mask cells claimed on the way.
fn integrate_half(
    field: &CompiledField,
    mask: &mut OccupancyMask,
    start: (f64, f64),
    h: f64,
    max_length: f64,
) -> (Vec<(f64, f64)>, Vec<(usize, usize)>) {
    let mut points = Vec::new();
    let mut claimed = Vec::new();
    let mut current = start;
    let mut current_cell = mask.cell_of(start.0, start.1);
    let mut travelled = 0.0;
    while travelled < max_length {
        let Some(next) = rk2_step(field, current.0, current.1, h) else {
            break;
        };
        let Some(cell) = mask.cell_of(next.0, next.1) else {
            break;
        };
        if Some(cell) != current_cell {
            if !mask.is_free(cell) {
                break;
            }
            mask.set(cell, true);
            claimed.push(cell);
            current_cell = Some(cell);
        }
        travelled += h.abs();
        points.push(next);
        current = next;
    }
    (points, claimed)
}

/// Traces streamlines of `field` inside `bounds` and colors every point through `colormap`
/// with the clipping norm `norm`.
pub fn trace_streamlines(
    field: &CompiledField,
    bounds: Bounds,
    options: &StreamlineOptions,
    colormap: Colormap,
    norm: &ColorNorm,
) -> Vec<Streamline> {
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) || !(options.density > 0.0) {
        debug!("streamlines skipped: empty bounds or non-positive density");
        return Vec::new();
    }
    let mut mask = OccupancyMask::new(bounds, options.density);
    let h = mask.cell_size() * STEP_FRACTION;
    let min_length = MIN_LENGTH_FRACTION * 0.5 * (bounds.width() + bounds.height());
    let max_length = 4.0 * (bounds.width() + bounds.height());

    let mut lines = Vec::new();
    for (i, j) in spiral_seed_order(mask.nx, mask.ny) {
        if !mask.is_free((i, j)) {
            continue;
        }
        let seed = mask.center(i, j);
        if direction(field, seed.0, seed.1).is_none() {
            continue;
        }
        mask.set((i, j), true);
        let (backward, claimed_back) = integrate_half(field, &mut mask, seed, -h, max_length);
        let (forward, claimed_fwd) = integrate_half(field, &mut mask, seed, h, max_length);

        let points: Vec<(f64, f64)> = backward
            .into_iter()
            .rev()
            .chain(std::iter::once(seed))
            .chain(forward)
            .collect();
        let mut line = Streamline {
            points,
            values: Vec::new(),
            colors: Vec::new(),
        };
        if line.arc_length() < min_length {
            // release the cells so other seeds can use them
            for cell in claimed_back.into_iter().chain(claimed_fwd) {
                mask.set(cell, false);
            }
            continue;
        }
        line.values = line
            .points
            .iter()
            .map(|&(x, y)| field.evaluate_point(x, y))
            .collect();
        line.colors = line
            .values
            .iter()
            .map(|&v| colormap.color_at(norm.normalize(v)))
            .collect();
        lines.push(line);
    }
    info!(
        "traced {} streamlines with density {}",
        lines.len(),
        options.density
    );
    lines
}
