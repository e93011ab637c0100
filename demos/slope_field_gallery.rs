use RustedSlopeField::Utils::logger::init_logger;
use RustedSlopeField::Utils::plots::draw_field;
use RustedSlopeField::field::colormap::Colormap;
use RustedSlopeField::field::coordinate_system::CoordinateSystem;
use RustedSlopeField::field::field_renderer::generate_field;
use RustedSlopeField::field::render_request::RenderRequest;
use strum::IntoEnumIterator;

fn main() {
    println!("Slope field gallery");
    println!("===================");
    init_logger("warn", false).unwrap();

    // Example 1: one picture per coordinate system
    example_coordinate_systems();

    // Uncomment to run other examples:
    // example_palettes();
    example_streamlines();
    example_invalid_function();
}

fn example_coordinate_systems() {
    for (i, system) in CoordinateSystem::iter().enumerate() {
        let request =
            RenderRequest::new("sin(x*y) + cos(x - y)", 5.0, 5.0, Colormap::Viridis, false, system)
                .unwrap();
        let field = generate_field(&request);
        let filename = format!("gallery_{}_coordinates.png", i);
        draw_field(&field, &filename, (1000, 800)).unwrap();
        println!("{} -> {}", system, filename);
    }
}

#[allow(dead_code)]
fn example_palettes() {
    for colormap in Colormap::iter() {
        let request = RenderRequest::new(
            "x^2 - y",
            3.0,
            3.0,
            colormap,
            false,
            CoordinateSystem::Cartesian,
        )
        .unwrap();
        let filename = format!("gallery_{}.png", colormap);
        draw_field(&generate_field(&request), &filename, (1000, 800)).unwrap();
        println!("{} -> {}", colormap, filename);
    }
}

fn example_streamlines() {
    let request = RenderRequest::new(
        "y - x^2/4",
        4.0,
        4.0,
        Colormap::Coolwarm,
        true,
        CoordinateSystem::Cartesian,
    )
    .unwrap();
    draw_field(&generate_field(&request), "gallery_streamlines.png", (1000, 800)).unwrap();
}

fn example_invalid_function() {
    // unbalanced parenthesis: the picture shows the diagnostic text instead of a field
    let request = RenderRequest {
        raw_expression: "sin(x".to_string(),
        ..RenderRequest::default()
    };
    let field = generate_field(&request);
    assert!(!field.is_success());
    draw_field(&field, "gallery_invalid.png", (800, 400)).unwrap();
}
