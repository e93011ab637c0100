use itertools::Itertools;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use log::info;

use crate::errors::FieldError;
use crate::field::colormap::RgbaColor;
use crate::field::field_renderer::{
    ColorScaleLegend, Diagnostic, FieldGeometry, FieldPlot, RenderableField,
};
use crate::field::streamlines::Bounds;

/// width in pixels taken by the color bar on the right
const COLORBAR_WIDTH: u32 = 130;
/// number of color slices of the bar
const COLORBAR_STEPS: usize = 128;

fn drawing_error<E: Display>(err: E) -> FieldError {
    FieldError::Io(format!("drawing failed: {}", err))
}

fn to_plotters(color: &RgbaColor) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.alpha)
}

/// Widens the shorter side of `bounds` so one unit has the same length in pixels on both
/// axes of a `(width, height)` plotting area.
pub fn equal_aspect_ranges(bounds: &Bounds, (width, height): (u32, u32)) -> (Range<f64>, Range<f64>) {
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max);
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    let x_per_pixel = bounds.width() / w;
    let y_per_pixel = bounds.height() / h;
    if x_per_pixel > y_per_pixel {
        let grow = 0.5 * (x_per_pixel * h - bounds.height());
        y_min -= grow;
        y_max += grow;
    } else if y_per_pixel > x_per_pixel {
        let grow = 0.5 * (y_per_pixel * w - bounds.width());
        x_min -= grow;
        x_max += grow;
    }
    (x_min..x_max, y_min..y_max)
}

/// value range of the color bar, widened around a constant field
fn legend_range(legend: &ColorScaleLegend) -> Range<f64> {
    let (vmin, vmax) = (legend.norm.vmin, legend.norm.vmax);
    if vmax > vmin {
        vmin..vmax
    } else {
        (vmin - 0.5)..(vmax + 0.5)
    }
}

fn stroke(line_width: f64) -> u32 {
    line_width.round().max(1.0) as u32
}

fn draw_plot<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    plot: &FieldPlot,
) -> Result<(), FieldError> {
    let background = to_plotters(&plot.background);
    let foreground = to_plotters(&plot.foreground);
    root.fill(&background).map_err(drawing_error)?;
    let (width, _) = root.dim_in_pixel();
    let (field_area, bar_area) = root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));

    let (field_w, field_h) = field_area.dim_in_pixel();
    let (x_range, y_range) = if plot.equal_aspect {
        // label areas and caption take roughly 60 px on each axis
        equal_aspect_ranges(&plot.bounds, (field_w.saturating_sub(60), field_h.saturating_sub(60)))
    } else {
        (
            plot.bounds.x_min..plot.bounds.x_max,
            plot.bounds.y_min..plot.bounds.y_max,
        )
    };
    let text_style = ("sans-serif", 14).into_font().color(&foreground);
    let mut chart = ChartBuilder::on(&field_area)
        .caption(&plot.title, ("sans-serif", 22).into_font().color(&foreground))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing_error)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .axis_style(&foreground)
        .label_style(text_style.clone())
        .x_desc("x")
        .y_desc("y")
        .axis_desc_style(text_style.clone())
        .draw()
        .map_err(drawing_error)?;

    let line_width = stroke(plot.line_width);
    match &plot.geometry {
        FieldGeometry::Segments(segments) => {
            chart
                .draw_series(segments.iter().map(|segment| {
                    PathElement::new(
                        vec![segment.start, segment.end],
                        to_plotters(&segment.color).stroke_width(line_width),
                    )
                }))
                .map_err(drawing_error)?;
        }
        FieldGeometry::Streamlines(lines) => {
            for line in lines {
                chart
                    .draw_series(line.points.windows(2).zip(line.colors.iter()).map(
                        |(pair, color)| {
                            PathElement::new(
                                vec![pair[0], pair[1]],
                                to_plotters(color).stroke_width(line_width),
                            )
                        },
                    ))
                    .map_err(drawing_error)?;
            }
        }
    }

    draw_colorbar(&bar_area, &plot.legend, &foreground)
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    legend: &ColorScaleLegend,
    foreground: &RGBAColor,
) -> Result<(), FieldError> {
    let range = legend_range(legend);
    let text_style = ("sans-serif", 14).into_font().color(foreground);
    let mut bar = ChartBuilder::on(area)
        .margin_top(45)
        .margin_bottom(40)
        .margin_right(10)
        .y_label_area_size(0)
        .right_y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, range.clone())
        .map_err(drawing_error)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .disable_y_axis()
        .draw()
        .map_err(drawing_error)?;

    let step = (range.end - range.start) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let low = range.start + i as f64 * step;
        let color = legend
            .colormap
            .color_at(legend.norm.normalize(low + 0.5 * step));
        Rectangle::new([(0.0, low), (1.0, low + step)], to_plotters(&color).filled())
    }))
    .map_err(drawing_error)?;

    // ticks sit on the right edge of the bar, in the coordinates of `area`
    let (base_x, base_y) = area.get_base_pixel();
    let label_style = text_style.clone().pos(Pos::new(HPos::Left, VPos::Center));
    for (value, label) in tick_labels(legend) {
        let (px, py) = bar.backend_coord(&(1.0, value));
        let (px, py) = (px - base_x, py - base_y);
        area.draw(&PathElement::new(vec![(px, py), (px + 5, py)], *foreground))
            .map_err(drawing_error)?;
        area.draw(&Text::new(label, (px + 8, py), label_style.clone()))
            .map_err(drawing_error)?;
    }
    let (width, height) = area.dim_in_pixel();
    let desc_style = text_style
        .transform(FontTransform::Rotate270)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        legend.label.clone(),
        (width as i32 - 12, height as i32 / 2),
        desc_style,
    ))
    .map_err(drawing_error)?;
    Ok(())
}

/// (value, text) of each distinct finite legend tick
fn tick_labels(legend: &ColorScaleLegend) -> Vec<(f64, String)> {
    legend
        .ticks
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .dedup()
        .map(|v| (v, format!("{:.2}", v)))
        .collect()
}

fn draw_diagnostic<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    diagnostic: &Diagnostic,
) -> Result<(), FieldError> {
    root.fill(&BLACK).map_err(drawing_error)?;
    let (width, height) = root.dim_in_pixel();
    let style = ("sans-serif", 26)
        .into_font()
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let lines: Vec<&str> = diagnostic.message.lines().collect();
    let line_height = 36;
    let top = height as i32 / 2 - line_height * (lines.len() as i32 - 1) / 2;
    for (i, line) in lines.iter().enumerate() {
        root.draw(&Text::new(
            *line,
            (width as i32 / 2, top + i as i32 * line_height),
            style.clone(),
        ))
        .map_err(drawing_error)?;
    }
    Ok(())
}

/// Draws the field (or its diagnostic text, without axes) into a PNG file of `size` pixels.
pub fn draw_field<P: AsRef<Path>>(
    field: &RenderableField,
    filename: P,
    size: (u32, u32),
) -> Result<(), FieldError> {
    let root = BitMapBackend::new(filename.as_ref(), size).into_drawing_area();
    match field {
        RenderableField::Success(plot) => draw_plot(&root, plot)?,
        RenderableField::Failure(diagnostic) => draw_diagnostic(&root, diagnostic)?,
    }
    root.present().map_err(drawing_error)?;
    info!("plot saved to {}", filename.as_ref().display());
    Ok(())
}
