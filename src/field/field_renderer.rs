//! # Field renderer
//!
//! Turns a sample grid and a compiled slope function into a drawable description:
//! direction segments (or streamlines), their colors, axis bounds and the color scale
//! legend. Any failure on the way is collapsed into a single [`Diagnostic`] so callers
//! never have to deal with half-built output.
use log::{error, info, warn};
use ndarray::{Array2, Zip};

use crate::errors::FieldError;
use crate::field::colormap::{ColorNorm, Colormap, RgbaColor};
use crate::field::grid_builder::{SampleGrid, build_grid, linspace};
use crate::field::render_request::RenderRequest;
use crate::field::streamlines::{Bounds, Streamline, StreamlineOptions, trace_streamlines};
use crate::symbolic::evaluator::{CompiledField, make_evaluator};
use crate::symbolic::translator::translate;

/// length of every direction segment
pub const SEGMENT_SCALE: f64 = 0.25;
pub const MIN_SEGMENT_ALPHA: f64 = 0.2;
pub const MAX_SEGMENT_ALPHA: f64 = 1.0;
/// stroke width of segments and streamlines
pub const LINE_WIDTH: f64 = 0.7;
pub const LEGEND_LABEL: &str = "Slope dy/dx";
pub const LEGEND_TICKS: usize = 5;
/// text shown instead of a plot whenever the render fails
pub const INVALID_FUNCTION_MESSAGE: &str =
    "Error: Invalid function\nUse calculator-style syntax like x^2 + sin(x)";
/// line the caller writes to its operational log on failure
pub const INVALID_FUNCTION_LOG_MESSAGE: &str =
    "Invalid function input. Use calculator syntax: x^2 + sin(x), log(x), ln(x), sqrt(x)";

pub const BACKGROUND: RgbaColor = RgbaColor::rgb(0, 0, 0);
pub const FOREGROUND: RgbaColor = RgbaColor::rgb(255, 255, 255);

/// Direction segment centered on its sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// slope at the center
    pub value: f64,
    /// colormap color with the segment opacity applied
    pub color: RgbaColor,
}

impl Segment {
    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.start.0 + self.end.0),
            0.5 * (self.start.1 + self.end.1),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldGeometry {
    Segments(Vec<Segment>),
    Streamlines(Vec<Streamline>),
}

impl FieldGeometry {
    /// number of drawable items
    pub fn len(&self) -> usize {
        match self {
            FieldGeometry::Segments(segments) => segments.len(),
            FieldGeometry::Streamlines(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Color scale drawn next to the field, sharing its colormap and norm.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScaleLegend {
    pub colormap: Colormap,
    pub norm: ColorNorm,
    pub label: String,
    pub ticks: Vec<f64>,
}

impl ColorScaleLegend {
    pub fn new(colormap: Colormap, norm: ColorNorm) -> Self {
        ColorScaleLegend {
            colormap,
            norm,
            label: LEGEND_LABEL.to_string(),
            ticks: linspace(norm.vmin, norm.vmax, LEGEND_TICKS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlot {
    pub geometry: FieldGeometry,
    pub line_width: f64,
    pub bounds: Bounds,
    pub title: String,
    pub legend: ColorScaleLegend,
    pub equal_aspect: bool,
    pub background: RgbaColor,
    pub foreground: RgbaColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub show_axes: bool,
    /// the error behind the message, for logs and callers that want details
    pub cause: FieldError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderableField {
    Success(FieldPlot),
    Failure(Diagnostic),
}

impl RenderableField {
    /// Failure payload for `cause`; the cause is logged, the message is always the same.
    pub fn failure(cause: FieldError) -> Self {
        error!("slope field render failed: {}", cause);
        RenderableField::Failure(Diagnostic {
            message: INVALID_FUNCTION_MESSAGE.to_string(),
            show_axes: false,
            cause,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderableField::Success(_))
    }

    pub fn plot(&self) -> Option<&FieldPlot> {
        match self {
            RenderableField::Success(plot) => Some(plot),
            RenderableField::Failure(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            RenderableField::Success(_) => None,
            RenderableField::Failure(diagnostic) => Some(diagnostic),
        }
    }
}

/// opacity of a segment whose normalized vertical component is `dy`
pub fn segment_alpha(dy: f64) -> f64 {
    (dy.abs() / SEGMENT_SCALE).clamp(MIN_SEGMENT_ALPHA, MAX_SEGMENT_ALPHA)
}

/// One segment per grid point along (1, v), scaled to [`SEGMENT_SCALE`] and centered on
/// the point. Points with an undefined slope or a zero-length direction are skipped.
pub fn direction_segments(
    x: &Array2<f64>,
    y: &Array2<f64>,
    v: &Array2<f64>,
    colormap: Colormap,
    norm: &ColorNorm,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(v.len());
    Zip::from(x).and(y).and(v).for_each(|&xi, &yi, &vi| {
        let length = 1.0f64.hypot(vi);
        if !length.is_finite() || length == 0.0 {
            return;
        }
        let dx = SEGMENT_SCALE / length;
        let dy = SEGMENT_SCALE * vi / length;
        let color = colormap
            .color_at(norm.normalize(vi))
            .with_alpha(segment_alpha(dy));
        segments.push(Segment {
            start: (xi - 0.5 * dx, yi - 0.5 * dy),
            end: (xi + 0.5 * dx, yi + 0.5 * dy),
            value: vi,
            color,
        });
    });
    segments
}

fn axis_bounds(grid: &SampleGrid) -> Result<Bounds, FieldError> {
    let degenerate = || FieldError::DegenerateGeometry("grid has no finite coordinates".into());
    let (x_min, x_max) = grid.x_bounds().ok_or_else(degenerate)?;
    let (y_min, y_max) = grid.y_bounds().ok_or_else(degenerate)?;
    Ok(Bounds {
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

fn try_render(
    grid: &SampleGrid,
    evaluator: &CompiledField,
    colormap: Colormap,
    use_streamlines: bool,
    label: &str,
) -> Result<FieldPlot, FieldError> {
    let v = evaluator.evaluate(grid.x(), grid.y());
    let norm = ColorNorm::from_values(v.iter()).ok_or(FieldError::GlobalInvalidity)?;
    let bounds = axis_bounds(grid)?;

    let geometry = if use_streamlines {
        let options = StreamlineOptions {
            line_width: LINE_WIDTH,
            ..StreamlineOptions::default()
        };
        FieldGeometry::Streamlines(trace_streamlines(
            evaluator, bounds, &options, colormap, &norm,
        ))
    } else {
        let segments = direction_segments(grid.x(), grid.y(), &v, colormap, &norm);
        if segments.len() < v.len() {
            warn!(
                "{} of {} points have no direction and are not drawn",
                v.len() - segments.len(),
                v.len()
            );
        }
        FieldGeometry::Segments(segments)
    };
    if geometry.is_empty() {
        return Err(FieldError::DegenerateGeometry(
            "no drawable direction in the field".to_string(),
        ));
    }
    info!(
        "rendered {} {} items, slope range [{}, {}]",
        geometry.len(),
        if use_streamlines { "streamline" } else { "segment" },
        norm.vmin,
        norm.vmax
    );

    Ok(FieldPlot {
        geometry,
        line_width: LINE_WIDTH,
        bounds,
        title: format!("Slope Field for dy/dx = {}", label),
        legend: ColorScaleLegend::new(colormap, norm),
        equal_aspect: true,
        background: BACKGROUND,
        foreground: FOREGROUND,
    })
}

/// Evaluates `evaluator` over `grid` and builds the drawable field; `label` is the raw
/// expression shown in the title. Every error ends in the failure payload.
pub fn render(
    grid: &SampleGrid,
    evaluator: &CompiledField,
    colormap: Colormap,
    use_streamlines: bool,
    label: &str,
) -> RenderableField {
    match try_render(grid, evaluator, colormap, use_streamlines, label) {
        Ok(plot) => RenderableField::Success(plot),
        Err(err) => RenderableField::failure(err),
    }
}

/// Whole pipeline for one request: translate, compile, build the grid, render.
pub fn generate_field(request: &RenderRequest) -> RenderableField {
    let numeric = translate(&request.raw_expression);
    let evaluator = match make_evaluator(&numeric) {
        Ok(evaluator) => evaluator,
        Err(err) => return RenderableField::failure(err),
    };
    let grid = match build_grid(request.coordinate_system, request.x_max, request.y_max) {
        Ok(grid) => grid,
        Err(err) => return RenderableField::failure(err),
    };
    render(
        &grid,
        &evaluator,
        request.colormap,
        request.use_streamlines,
        &request.raw_expression,
    )
}
