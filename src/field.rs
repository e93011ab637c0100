#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// coordinate systems the field can be sampled in
pub mod coordinate_system;
///____________________________________________________________________________________________________________________________
/// # Grid builder
/// sample points X, Y for a coordinate system and the extents of the plot
///# Example
/// ```
/// use RustedSlopeField::field::coordinate_system::CoordinateSystem;
/// use RustedSlopeField::field::grid_builder::build_grid;
/// let grid = build_grid(CoordinateSystem::Polar, 5.0, 5.0).unwrap();
/// assert_eq!(grid.x().shape(), grid.y().shape());
/// ```
pub mod grid_builder;
/// named palettes and the linear norm mapping slopes onto them
pub mod colormap;
/// flow lines through the direction field, an alternative to short segments
pub mod streamlines;
/// validated input of one render call
pub mod render_request;
///____________________________________________________________________________________________________________________________
/// # Field renderer
/// evaluation, coloring and geometry of the slope field, or the diagnostic payload on failure
///# Example
/// ```
/// use RustedSlopeField::field::field_renderer::generate_field;
/// use RustedSlopeField::field::render_request::RenderRequest;
/// let field = generate_field(&RenderRequest::default());
/// assert!(field.is_success());
/// let bad = RenderRequest { raw_expression: "sin(x".to_string(), ..RenderRequest::default() };
/// assert!(!generate_field(&bad).is_success());
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod field_renderer;
