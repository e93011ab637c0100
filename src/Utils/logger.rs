use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info, warn};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::FieldError;
use crate::field::field_renderer::{FieldGeometry, FieldPlot, Segment};
use crate::field::streamlines::Streamline;

/// "debug" | "info" | "warn" | "error" -> level, "off" | "none" -> `None` (no logger at all)
pub fn parse_loglevel(loglevel: &str) -> Result<Option<LevelFilter>, FieldError> {
    match loglevel.trim().to_lowercase().as_str() {
        "debug" => Ok(Some(LevelFilter::Debug)),
        "info" => Ok(Some(LevelFilter::Info)),
        "warn" => Ok(Some(LevelFilter::Warn)),
        "error" => Ok(Some(LevelFilter::Error)),
        "off" | "none" => Ok(None),
        other => Err(FieldError::Configuration(format!(
            "loglevel must be debug, info, warn, error, off or none, got '{}'",
            other
        ))),
    }
}

static LOGGER_READY: AtomicBool = AtomicBool::new(false);

/// Initialize the terminal logger and, if asked, a file logger writing to
/// `log_<date>_<time>.txt`. A second call only logs a warning.
pub fn init_logger(loglevel: &str, log_to_file: bool) -> Result<(), FieldError> {
    init_logger_in(loglevel, log_to_file.then(|| Path::new(".")))
}

fn init_logger_in(loglevel: &str, log_dir: Option<&Path>) -> Result<(), FieldError> {
    let Some(level) = parse_loglevel(loglevel)? else {
        return Ok(());
    };
    if LOGGER_READY.load(Ordering::SeqCst) {
        warn!("logger already initialized, keeping the first configuration");
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(dir) = log_dir {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = dir.join(format!("log_{}.txt", date_and_time));
        loggers.push(WriteLogger::new(level, Config::default(), File::create(name)?));
    }
    if let Err(err) = CombinedLogger::init(loggers) {
        warn!("logger not installed: {}", err);
    }
    LOGGER_READY.store(true, Ordering::SeqCst);
    Ok(())
}

/// One row per segment: endpoints, slope and the drawn color.
pub fn save_segments_to_csv<P: AsRef<Path>>(
    segments: &[Segment],
    filename: P,
) -> Result<(), FieldError> {
    let mut writer = Writer::from_path(filename.as_ref())?;
    writer.write_record(["x_start", "y_start", "x_end", "y_end", "slope", "color", "alpha"])?;
    for segment in segments {
        writer.write_record(&[
            segment.start.0.to_string(),
            segment.start.1.to_string(),
            segment.end.0.to_string(),
            segment.end.1.to_string(),
            segment.value.to_string(),
            segment.color.to_hex(),
            segment.color.alpha.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(
        "{} segments saved to {}",
        segments.len(),
        filename.as_ref().display()
    );
    Ok(())
}

/// One row per streamline point, `line` numbers the curves from 0.
pub fn save_streamlines_to_csv<P: AsRef<Path>>(
    lines: &[Streamline],
    filename: P,
) -> Result<(), FieldError> {
    let mut writer = Writer::from_path(filename.as_ref())?;
    writer.write_record(["line", "point", "x", "y", "slope", "color"])?;
    for (line_index, line) in lines.iter().enumerate() {
        for (point_index, ((x, y), (value, color))) in line
            .points
            .iter()
            .zip(line.values.iter().zip(line.colors.iter()))
            .enumerate()
        {
            writer.write_record(&[
                line_index.to_string(),
                point_index.to_string(),
                x.to_string(),
                y.to_string(),
                value.to_string(),
                color.to_hex(),
            ])?;
        }
    }
    writer.flush()?;
    info!(
        "{} streamlines saved to {}",
        lines.len(),
        filename.as_ref().display()
    );
    Ok(())
}

/// Saves whatever geometry the plot carries.
pub fn save_field_to_csv<P: AsRef<Path>>(plot: &FieldPlot, filename: P) -> Result<(), FieldError> {
    match &plot.geometry {
        FieldGeometry::Segments(segments) => save_segments_to_csv(segments, filename),
        FieldGeometry::Streamlines(lines) => save_streamlines_to_csv(lines, filename),
    }
}
