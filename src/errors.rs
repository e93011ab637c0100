//! Error type shared by the expression pipeline, the grid builder, the field renderer and
//! the presentation helpers in `Utils`.
use std::fmt;

/// Errors that can stop a slope field render.
///
/// Evaluation faults at single points are deliberately absent: they never become an
/// error value, the offending point turns into `NaN` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// expression could not be compiled (bad token, unbalanced brackets, unknown name)
    Syntax(String),
    /// every sample point evaluated to `NaN`
    GlobalInvalidity,
    /// unknown selector, palette, bad extents or an oversized grid
    Configuration(String),
    /// no drawable direction could be derived from the field
    DegenerateGeometry(String),
    /// file output or task document reading failed
    Io(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldError::Syntax(msg) => write!(f, "Invalid function syntax: {}", msg),
            FieldError::GlobalInvalidity => {
                write!(f, "Invalid function: expression is undefined at every sample point")
            }
            FieldError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            FieldError::DegenerateGeometry(msg) => write!(f, "Degenerate geometry: {}", msg),
            FieldError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<std::io::Error> for FieldError {
    fn from(err: std::io::Error) -> Self {
        FieldError::Io(err.to_string())
    }
}

impl From<csv::Error> for FieldError {
    fn from(err: csv::Error) -> Self {
        FieldError::Io(err.to_string())
    }
}
