//! parse a task document with structure like " title1 key1: value1, value2 key2: value2 title2 key3: value3 " which has
//! section titles and pairs key - list of values, and turn it into a render task.
//!
//! ```text
//! field
//!   expression: "sin(x*y) + cos(x - y)"
//!   range: 10
//!   coordinates: "Complex Plane"
//! style
//!   colormap: magma
//!   streamlines: true
//! output
//!   png: field.png
//!   width: 1200
//!   height: 900
//! ```
//! One key per line. Values containing spaces or commas must be quoted. Lines starting with //, #, % or ; are comments.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::errors::FieldError;
use crate::field::colormap::Colormap;
use crate::field::coordinate_system::CoordinateSystem;
use crate::field::render_request::{DEFAULT_EXPRESSION, DEFAULT_RANGE, RenderRequest};

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

pub const DEFAULT_OUTPUT: &str = "slope_field.png";
pub const DEFAULT_SIZE: (u32, u32) = (1000, 800);
pub const DEFAULT_LOGLEVEL: &str = "info";

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// Parses a section title or a key (word characters without spaces)
fn parse_name(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

/// "..." taken verbatim, may contain spaces and commas
fn parse_quoted(input: &str) -> IResult<&str, Value> {
    let parser = delimited(char('"'), take_while(|c: char| c != '"'), char('"'));
    map(parser, |s: &str| Value::String(s.to_string())).parse(input)
}

fn classify(s: &str) -> Value {
    // Try parsing as different types in order
    if let Ok(val) = s.parse::<i64>() {
        Value::Integer(val)
    } else if let Ok(val) = s.parse::<f64>() {
        Value::Float(val)
    } else if let Ok(val) = s.parse::<bool>() {
        Value::Boolean(val)
    } else {
        Value::String(s.to_string())
    }
}

/// Parse a single value - excluding commas, whitespace, newlines, semicolons and quotes
fn parse_bare(input: &str) -> IResult<&str, Value> {
    let parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';' | '"'));
    map(parser, classify).parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((parse_quoted, parse_bare)).parse(input)
}

/// comma separated values on one line
fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_coma = delimited(space0, tag(","), space0);
    separated_list0(separator_coma, parse_value).parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    separated_pair(parse_name, colon_separator, parse_value_list).parse(input)
}

/// Parses a section with a title and one or more key-value pairs
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = terminated(parse_name, multispace0).parse(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, multispace0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;)
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document; sections with the same title are merged.
pub fn parse_document(input: &str) -> Result<DocumentMap, FieldError> {
    let filtered = filter_comments(input);
    let mut parser = delimited(multispace0, many1(parse_section), multispace0);
    let (remaining, sections) = parser
        .parse(filtered.as_str())
        .map_err(|e| FieldError::Configuration(format!("task document parsing error: {:?}", e)))?;
    if !remaining.trim().is_empty() {
        return Err(FieldError::Configuration(format!(
            "failed to parse entire task document, remaining: '{}'",
            remaining
        )));
    }
    let mut document = DocumentMap::new();
    for (title, section) in sections {
        document.entry(title).or_default().extend(section);
    }
    Ok(document)
}

/// What to render and where to put the results.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTask {
    pub request: RenderRequest,
    pub png: PathBuf,
    pub csv: Option<PathBuf>,
    pub size: (u32, u32),
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for RenderTask {
    fn default() -> Self {
        RenderTask {
            request: RenderRequest::default(),
            png: PathBuf::from(DEFAULT_OUTPUT),
            csv: None,
            size: DEFAULT_SIZE,
            loglevel: DEFAULT_LOGLEVEL.to_string(),
            log_to_file: false,
        }
    }
}

fn single<'a>(section: &str, key: &str, values: &'a [Value]) -> Result<&'a Value, FieldError> {
    match values {
        [value] => Ok(value),
        _ => Err(FieldError::Configuration(format!(
            "{}.{} expects exactly one value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

fn number(section: &str, key: &str, values: &[Value]) -> Result<f64, FieldError> {
    let value = single(section, key, values)?;
    value.as_float().ok_or_else(|| {
        FieldError::Configuration(format!("{}.{} must be a number, got '{}'", section, key, value))
    })
}

fn pixels(section: &str, key: &str, values: &[Value]) -> Result<u32, FieldError> {
    let value = single(section, key, values)?;
    value
        .as_integer()
        .and_then(|i| u32::try_from(i).ok())
        .filter(|&i| i > 0)
        .ok_or_else(|| {
            FieldError::Configuration(format!(
                "{}.{} must be a positive integer, got '{}'",
                section, key, value
            ))
        })
}

fn flag(section: &str, key: &str, values: &[Value]) -> Result<bool, FieldError> {
    let value = single(section, key, values)?;
    value.as_boolean().ok_or_else(|| {
        FieldError::Configuration(format!("{}.{} must be true or false, got '{}'", section, key, value))
    })
}

fn text(section: &str, key: &str, values: &[Value]) -> Result<String, FieldError> {
    single(section, key, values).map(|v| v.to_string())
}

impl RenderTask {
    /// Builds a task from a parsed document. Missing keys keep their defaults, unknown
    /// sections or keys are configuration errors.
    pub fn from_map(document: &DocumentMap) -> Result<Self, FieldError> {
        let mut task = RenderTask::default();
        let mut expression = DEFAULT_EXPRESSION.to_string();
        let mut x_range = DEFAULT_RANGE;
        let mut y_range: Option<f64> = None;
        let mut colormap = Colormap::default();
        let mut coordinates = CoordinateSystem::default();
        let mut streamlines = false;

        for (section, pairs) in document {
            for (key, values) in pairs {
                let (s, k) = (section.as_str(), key.as_str());
                match (s, k) {
                    ("field", "expression") => expression = text(s, k, values)?,
                    ("field", "range") => x_range = number(s, k, values)?,
                    ("field", "y_range") => y_range = Some(number(s, k, values)?),
                    ("field", "coordinates") => {
                        coordinates = CoordinateSystem::from_selector(&text(s, k, values)?)?
                    }
                    ("style", "colormap") => colormap = Colormap::from_name(&text(s, k, values)?)?,
                    ("style", "streamlines") => streamlines = flag(s, k, values)?,
                    ("output", "png") => task.png = PathBuf::from(text(s, k, values)?),
                    ("output", "csv") => task.csv = Some(PathBuf::from(text(s, k, values)?)),
                    ("output", "width") => task.size.0 = pixels(s, k, values)?,
                    ("output", "height") => task.size.1 = pixels(s, k, values)?,
                    ("logging", "loglevel") => task.loglevel = text(s, k, values)?,
                    ("logging", "file") => task.log_to_file = flag(s, k, values)?,
                    _ => {
                        return Err(FieldError::Configuration(format!(
                            "unknown key '{}' in section '{}'",
                            key, section
                        )));
                    }
                }
            }
        }
        task.request = RenderRequest::new(
            &expression,
            x_range,
            y_range.unwrap_or(x_range),
            colormap,
            streamlines,
            coordinates,
        )?;
        Ok(task)
    }

    pub fn from_document(input: &str) -> Result<Self, FieldError> {
        RenderTask::from_map(&parse_document(input)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FieldError> {
        let content = fs::read_to_string(path.as_ref())?;
        let task = RenderTask::from_document(&content)?;
        info!("task loaded from {}", path.as_ref().display());
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        let (remaining, name) = parse_name("y_range: 4").unwrap();
        assert_eq!(name, "y_range");
        assert_eq!(remaining, ": 4");
        assert!(parse_name("1abc").is_err());
    }

    #[test]
    fn test_parse_value_kinds() {
        assert_eq!(parse_value("12, x").unwrap(), (", x", Value::Integer(12)));
        assert_eq!(parse_value("0.5\n").unwrap(), ("\n", Value::Float(0.5)));
        assert_eq!(parse_value("false").unwrap(), ("", Value::Boolean(false)));
        assert_eq!(
            parse_value("Log-Polar next").unwrap(),
            (" next", Value::String("Log-Polar".to_string()))
        );
        assert_eq!(
            parse_value("\"x^2 + sin(x), y\" rest").unwrap(),
            (" rest", Value::String("x^2 + sin(x), y".to_string()))
        );
    }

    #[test]
    fn test_value_list_stops_at_line_end() {
        let (remaining, values) = parse_value_list("1, 2.5 ,three\nkey: 4").unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::String("three".to_string())
            ]
        );
        assert_eq!(remaining, "\nkey: 4");
    }

    #[test]
    fn test_parse_section() {
        let (remaining, (title, section)) =
            parse_section("style\n  colormap: magma\n  streamlines: true\noutput\n  png: a.png")
                .unwrap();
        assert_eq!(title, "style");
        assert_eq!(section.len(), 2);
        assert_eq!(section["streamlines"], vec![Value::Boolean(true)]);
        assert_eq!(remaining, "output\n  png: a.png");
    }

    #[test]
    fn test_filter_comments() {
        let filtered = filter_comments("# header\nfield\n// note\n  range: 3\n\n% x\n; y");
        assert_eq!(filtered, "field\n  range: 3");
    }
}
