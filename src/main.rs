#![allow(non_snake_case)]
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use RustedSlopeField::Utils::logger::{init_logger, save_field_to_csv};
use RustedSlopeField::Utils::plots::draw_field;
use RustedSlopeField::Utils::task_parser::RenderTask;
use RustedSlopeField::errors::FieldError;
use RustedSlopeField::field::colormap::Colormap;
use RustedSlopeField::field::coordinate_system::CoordinateSystem;
use RustedSlopeField::field::field_renderer::{
    INVALID_FUNCTION_LOG_MESSAGE, RenderableField, generate_field,
};
use RustedSlopeField::field::render_request::RenderRequest;

/// Draw the slope field of dy/dx = f(x, y)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Task document; flags given on the command line override its values
    #[arg(short, long)]
    task: Option<PathBuf>,
    /// Right-hand side f(x, y) in calculator notation, e.g. "x^2 + sin(y)"
    #[arg(short, long)]
    expression: Option<String>,
    /// Half-width of the plotted x range (and y range unless --y-range is given)
    #[arg(short, long)]
    range: Option<f64>,
    /// Half-height of the plotted y range
    #[arg(long)]
    y_range: Option<f64>,
    /// rainbow, viridis, plasma, magma, turbo, coolwarm or cividis
    #[arg(short, long)]
    colormap: Option<String>,
    /// Cartesian, Polar, Log-Polar, Log-Log, Hexagonal or "Complex Plane"
    #[arg(long)]
    coordinates: Option<String>,
    /// Draw streamlines instead of direction segments
    #[arg(short, long)]
    streamlines: bool,
    /// PNG file to write
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also export the field geometry to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// debug, info, warn, error or off
    #[arg(short, long)]
    loglevel: Option<String>,
}

fn build_task(cli: &Cli) -> Result<RenderTask, FieldError> {
    let mut task = match &cli.task {
        Some(path) => RenderTask::from_file(path)?,
        None => RenderTask::default(),
    };
    let base = &task.request;
    let x_max = cli.range.unwrap_or(base.x_max);
    let y_max = match (cli.y_range, cli.range) {
        (Some(y), _) => y,
        (None, Some(x)) => x,
        (None, None) => base.y_max,
    };
    let colormap = match &cli.colormap {
        Some(name) => Colormap::from_name(name)?,
        None => base.colormap,
    };
    let coordinates = match &cli.coordinates {
        Some(selector) => CoordinateSystem::from_selector(selector)?,
        None => base.coordinate_system,
    };
    task.request = RenderRequest::new(
        cli.expression.as_deref().unwrap_or(&base.raw_expression),
        x_max,
        y_max,
        colormap,
        cli.streamlines || base.use_streamlines,
        coordinates,
    )?;
    if let Some(output) = &cli.output {
        task.png = output.clone();
    }
    if let Some(csv) = &cli.csv {
        task.csv = Some(csv.clone());
    }
    if let Some(loglevel) = &cli.loglevel {
        task.loglevel = loglevel.clone();
    }
    Ok(task)
}

/// Renders the task; `Ok(false)` when the expression could not be drawn.
fn run(task: &RenderTask) -> Result<bool, FieldError> {
    info!(
        "slope field for dy/dx = {} on {} grid",
        task.request.raw_expression, task.request.coordinate_system
    );
    let field = generate_field(&task.request);
    if let RenderableField::Success(plot) = &field {
        if let Some(csv) = &task.csv {
            save_field_to_csv(plot, csv)?;
        }
    } else {
        error!("{}", INVALID_FUNCTION_LOG_MESSAGE);
    }
    draw_field(&field, &task.png, task.size)?;
    Ok(field.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let task = match build_task(&cli) {
        Ok(task) => task,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logger(&task.loglevel, task.log_to_file) {
        eprintln!("{}", err);
        return ExitCode::FAILURE;
    }
    match run(&task) {
        Ok(true) => {
            info!("Program ended");
            ExitCode::SUCCESS
        }
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
