use log::debug;

use crate::errors::FieldError;
use crate::field::colormap::Colormap;
use crate::field::coordinate_system::CoordinateSystem;
use crate::field::grid_builder::validate_extent;

pub const DEFAULT_EXPRESSION: &str = "sin(x*y) + cos(x - y)";
pub const DEFAULT_RANGE: f64 = 10.0;

/// Validated input of one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub raw_expression: String,
    pub x_max: f64,
    pub y_max: f64,
    pub colormap: Colormap,
    pub use_streamlines: bool,
    pub coordinate_system: CoordinateSystem,
}

fn parse_extent(name: &str, text: &str) -> Result<f64, FieldError> {
    let value = text.trim().parse::<f64>().map_err(|_| {
        FieldError::Configuration(format!("{} must be a number, got '{}'", name, text))
    })?;
    validate_extent(name, value)
}

impl RenderRequest {
    pub fn new(
        raw_expression: &str,
        x_max: f64,
        y_max: f64,
        colormap: Colormap,
        use_streamlines: bool,
        coordinate_system: CoordinateSystem,
    ) -> Result<Self, FieldError> {
        let request = RenderRequest {
            raw_expression: raw_expression.to_string(),
            x_max: validate_extent("x range", x_max)?,
            y_max: validate_extent("y range", y_max)?,
            colormap,
            use_streamlines,
            coordinate_system,
        };
        debug!("render request: {:?}", request);
        Ok(request)
    }

    /// Builds a request from the text a form or a command line hands over. A missing
    /// y range reuses the x range.
    pub fn from_selectors(
        raw_expression: &str,
        x_range: &str,
        y_range: Option<&str>,
        colormap: &str,
        use_streamlines: bool,
        coordinates: &str,
    ) -> Result<Self, FieldError> {
        let x_max = parse_extent("x range", x_range)?;
        let y_max = match y_range {
            Some(text) => parse_extent("y range", text)?,
            None => x_max,
        };
        RenderRequest::new(
            raw_expression,
            x_max,
            y_max,
            Colormap::from_name(colormap)?,
            use_streamlines,
            CoordinateSystem::from_selector(coordinates)?,
        )
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        RenderRequest {
            raw_expression: DEFAULT_EXPRESSION.to_string(),
            x_max: DEFAULT_RANGE,
            y_max: DEFAULT_RANGE,
            colormap: Colormap::default(),
            use_streamlines: false,
            coordinate_system: CoordinateSystem::default(),
        }
    }
}
