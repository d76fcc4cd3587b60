//! End-to-end tests for TOML scenes: loading, solving, compositing and the
//! reporting of scene errors with source context.

use std::path::PathBuf;

use canvas_compose::{
    render_scene, render_with_config, CanvasLocation, LayoutError, RenderConfig, RenderError,
    Scene, SceneError, DEFAULT_LEGEND,
};
use pretty_assertions::assert_eq;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn test_dashboard_layout() {
    let mut scene = Scene::from_file(&demo("dashboard.toml")).unwrap();
    let frame = scene.canvas("frame").unwrap();
    let left = scene.canvas("left").unwrap();
    let right = scene.canvas("right").unwrap();

    assert_eq!(scene.image.location(frame).unwrap(), CanvasLocation::new(2, 2, 38, 10));
    assert_eq!(scene.image.location(left).unwrap(), CanvasLocation::new(3, 3, 11, 9));
    assert_eq!(scene.image.location(right).unwrap(), CanvasLocation::new(12, 3, 37, 9));
}

#[test]
fn test_dashboard_raster() {
    let source = std::fs::read_to_string(demo("dashboard.toml")).unwrap();
    let (report, raster) = render_scene(&source).unwrap();
    assert!(report.is_clean());

    insta::assert_snapshot!(raster.to_ascii(DEFAULT_LEGEND), @r"
    ........................................
    ........................................
    ..####################################..
    ..#********#ooooooooooooooooooooooooo#..
    ..#********#oooooooooooooooooooooo+oo#..
    ..#********#oooooooooooo+oooooooooooo#..
    ..#********#ooooooooooooooooooooooooo#..
    ..#********#oo+oooooooooooooooooooooo#..
    ..#********#ooooooooooooooooooooooooo#..
    ..####################################..
    ........................................
    ........................................
    ");
}

#[test]
fn test_report_names_fix_descriptions() {
    let source = std::fs::read_to_string(demo("dashboard.toml")).unwrap();
    let (report, _) = render_scene(&source).unwrap();
    assert_eq!(report.rows.len(), 16);
    assert!(report
        .to_string()
        .contains("right panel matches the left panel's height"));
}

#[test]
fn test_layout_overrides_in_scene() {
    let source = r#"
[image]
width = 10
height = 10

[layout]
coordinate_epsilon = 0.5

[[shape]]
canvas = "master"
kind = "markers"
xs = [3.0]
ys = [3.0]
"#;
    let mut scene = Scene::from_str(source).unwrap();
    assert_eq!(scene.layout.coordinate_epsilon, 0.5);

    scene.image.calculate_image().unwrap();
    let master = scene.image.canvas(scene.image.master()).unwrap();
    let description = master.description();
    assert_eq!((description.left, description.right), (2.5, 3.5));
}

#[test]
fn test_unknown_canvas_is_reported_with_context() {
    let source = r#"[image]
width = 10
height = 10

[[canvas]]
name = "plot"

[[shape]]
canvas = "plto"
kind = "block"
from = { x = 0.0, y = 0.0 }
to = { x = 1.0, y = 1.0 }
"#;
    let err = match render_scene(source) {
        Err(RenderError::Scene(err)) => err,
        Err(other) => panic!("Expected a scene error, got: {}", other),
        Ok(_) => panic!("Expected a scene error"),
    };
    assert!(matches!(&err, SceneError::UnknownCanvas { name, .. } if name == "plto"));

    let formatted = err.format(source, "plot.toml");
    assert!(formatted.contains("plot.toml"));
    assert!(formatted.contains("Unknown canvas 'plto'"));
    assert!(formatted.contains("did you mean plot?"));
}

#[test]
fn test_duplicate_canvas_points_at_both_definitions() {
    let source = "[image]\nwidth = 4\nheight = 4\n\n[[canvas]]\nname = \"a\"\n\n[[canvas]]\nname = \"a\"\n";
    let err = Scene::from_str(source).err().unwrap();
    match &err {
        SceneError::DuplicateCanvas { span, first, .. } => {
            assert!(first.start < span.start);
            assert_eq!(&source[span.clone()], "\"a\"");
        }
        other => panic!("Expected DuplicateCanvas, got: {}", other),
    }
    assert!(err.format(source, "dup.toml").contains("first defined here"));
}

#[test]
fn test_under_constrained_scene_is_a_layout_error() {
    let source = "[image]\nwidth = 4\nheight = 4\n\n[[canvas]]\nname = \"loose\"\n";
    match render_scene(source) {
        Err(RenderError::Layout(LayoutError::Solver(err))) => {
            assert!(err.to_string().contains("under-constrained by 4"));
        }
        Err(other) => panic!("Expected a solver error, got: {}", other),
        Ok(_) => panic!("Expected a solver error"),
    }
}

#[test]
fn test_invalid_fix_parameter_points_at_fix() {
    let source = r#"[image]
width = 10
height = 10

[[fix]]
kind = "scale"
target = "master"
part = "left"
reference = "master"
dimension = "x"
lambda = nan
"#;
    match Scene::from_str(source) {
        Err(SceneError::Layout { source: layout, span }) => {
            assert!(matches!(layout, LayoutError::NonFiniteParameter { .. }));
            assert_eq!(&source[span], "\"scale\"");
        }
        Err(other) => panic!("Expected a layout error, got: {}", other),
        Ok(_) => panic!("Expected a layout error"),
    }
}

#[test]
fn test_strict_mode_accepts_clean_demo() {
    let source = std::fs::read_to_string(demo("dashboard.toml")).unwrap();
    let config = RenderConfig::new().with_strict(true);
    assert!(render_with_config(&source, config).is_ok());
}

#[test]
fn test_negative_image_size_is_a_scene_error() {
    let source = "[image]\nwidth = -50\nheight = 20\n";
    match Scene::from_str(source) {
        Err(SceneError::Layout { source: layout, .. }) => {
            assert_eq!(layout, LayoutError::InvalidImageSize { width: -50, height: 20 });
        }
        Err(other) => panic!("Expected a layout error, got: {}", other),
        Ok(_) => panic!("Expected a layout error"),
    }
}

#[test]
fn test_negative_marker_radius_points_at_shape() {
    let source = r#"[image]
width = 10
height = 10

[[shape]]
canvas = "master"
kind = "markers"
xs = [1.0]
ys = [1.0]
radius = -1
"#;
    match Scene::from_str(source) {
        Err(SceneError::Layout { source: layout, span }) => {
            assert_eq!(layout, LayoutError::InvalidRadius { radius: -1 });
            assert_eq!(&source[span], "\"markers\"");
        }
        Err(other) => panic!("Expected a layout error, got: {}", other),
        Ok(_) => panic!("Expected a layout error"),
    }
}
