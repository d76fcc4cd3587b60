//! TOML scene files
//!
//! A scene declares an image, its canvases, the fixes between them and the
//! shapes drawn on them:
//!
//! ```toml
//! [image]
//! width = 200
//! height = 100
//!
//! [[canvas]]
//! name = "plot"
//! background = "#ff0000"
//!
//! [[fix]]
//! kind = "relation"
//! first = "master"
//! first_part = "left"
//! second = "plot"
//! second_part = "left"
//! offset = 10
//! ```
//!
//! Canvas names are resolved after the whole file is read, so a canvas may
//! name a parent defined further down. The name `master` always refers to
//! the master canvas.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use toml::Spanned;

use crate::error::{SceneError, Span};
use crate::image::Image;
use crate::layout::{
    CanvasCoordinates, CanvasDimension, CanvasId, CanvasPart, Fix, LayoutConfig,
    LayoutError, Point,
};
use crate::renderer::{PixelColor, RasterConfig};
use crate::shapes::{Block, Markers};

/// Name that always refers to the master canvas
pub const MASTER: &str = "master";

// ============================================================================
// File format
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlScene {
    image: Spanned<TomlImage>,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    raster: RasterConfig,
    #[serde(default)]
    canvas: Vec<TomlCanvas>,
    #[serde(default)]
    fix: Vec<TomlFix>,
    #[serde(default)]
    shape: Vec<TomlShape>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlImage {
    width: i32,
    height: i32,
    background: Option<PixelColor>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCanvas {
    name: Spanned<String>,
    parent: Option<Spanned<String>>,
    background: Option<PixelColor>,
    paint_background: Option<bool>,
    width: Option<f64>,
    height: Option<f64>,
    coordinates: Option<CanvasCoordinates>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
enum TomlFixKind {
    Relation,
    Dimension,
    Scale,
    RelativeSize,
}

impl TomlFixKind {
    fn name(self) -> &'static str {
        match self {
            TomlFixKind::Relation => "relation",
            TomlFixKind::Dimension => "dimension",
            TomlFixKind::Scale => "scale",
            TomlFixKind::RelativeSize => "relative_size",
        }
    }
}

/// One `[[fix]]` entry; which fields are required depends on `kind`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlFix {
    kind: Spanned<TomlFixKind>,
    description: Option<String>,
    // relation
    first: Option<Spanned<String>>,
    first_part: Option<CanvasPart>,
    second: Option<Spanned<String>>,
    second_part: Option<CanvasPart>,
    offset: Option<f64>,
    // dimension, scale, relative_size
    target: Option<Spanned<String>>,
    dimension: Option<CanvasDimension>,
    extent: Option<f64>,
    part: Option<CanvasPart>,
    reference: Option<Spanned<String>>,
    reference_dimension: Option<CanvasDimension>,
    lambda: Option<f64>,
    scale: Option<f64>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
enum TomlShapeKind {
    Block,
    Markers,
}

impl TomlShapeKind {
    fn name(self) -> &'static str {
        match self {
            TomlShapeKind::Block => "block",
            TomlShapeKind::Markers => "markers",
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlShape {
    canvas: Spanned<String>,
    kind: Spanned<TomlShapeKind>,
    color: Option<PixelColor>,
    depth: Option<f64>,
    // block
    from: Option<Point>,
    to: Option<Point>,
    // markers
    xs: Option<Vec<f64>>,
    ys: Option<Vec<f64>>,
    radius: Option<i32>,
}

// ============================================================================
// Building
// ============================================================================

/// A scene turned into a ready-to-render image
pub struct Scene {
    pub image: Image,
    pub layout: LayoutConfig,
    pub raster: RasterConfig,
    names: HashMap<String, CanvasId>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;
        Builder::new(parsed)?.build()
    }

    /// Canvas id for a name used in the scene
    pub fn canvas(&self, name: &str) -> Option<CanvasId> {
        self.names.get(name).copied()
    }

    /// Scene name of a canvas
    pub fn name_of(&self, id: CanvasId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, c)| **c == id)
            .map(|(name, _)| name.as_str())
    }
}

/// Largest edit distance at which an unknown name still gets suggestions
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Insertions, deletions and substitutions needed to turn `a` into `b`
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(b.len() + 1);
        current.push(i + 1);
        for (j, &cb) in b.iter().enumerate() {
            let substitute = previous[j] + usize::from(ca != cb);
            let delete = previous[j + 1] + 1;
            let insert = current[j] + 1;
            current.push(substitute.min(delete).min(insert));
        }
        previous = current;
    }
    previous[b.len()]
}

/// Known names close enough to `name` to be a likely typo, nearest first
fn suggest_names<'a>(known: impl IntoIterator<Item = &'a str>, name: &str) -> Vec<String> {
    let mut close: Vec<(usize, &str)> = known
        .into_iter()
        .map(|candidate| (edit_distance(candidate, name), candidate))
        .filter(|&(distance, _)| (1..=MAX_SUGGESTION_DISTANCE).contains(&distance))
        .collect();
    close.sort_unstable();
    close
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

fn span_of<T>(spanned: &Spanned<T>) -> Span {
    spanned.span()
}

fn layout_error(source: LayoutError, span: Span) -> SceneError {
    SceneError::Layout { source, span }
}

fn require<T: Clone>(value: &Option<T>, kind: &'static str, field: &'static str, span: &Span) -> Result<T, SceneError> {
    value.clone().ok_or_else(|| SceneError::MissingField {
        kind,
        field,
        span: span.clone(),
    })
}

struct Builder {
    scene: TomlScene,
    /// Index into `scene.canvas` for every declared name
    declared: HashMap<String, usize>,
}

impl Builder {
    fn new(scene: TomlScene) -> Result<Self, SceneError> {
        let mut declared: HashMap<String, usize> = HashMap::new();
        for (i, canvas) in scene.canvas.iter().enumerate() {
            let name = canvas.name.get_ref();
            let span = span_of(&canvas.name);
            if name == MASTER {
                return Err(SceneError::ReservedName { span });
            }
            if let Some(&first) = declared.get(name) {
                return Err(SceneError::DuplicateCanvas {
                    name: name.clone(),
                    span,
                    first: span_of(&scene.canvas[first].name),
                });
            }
            declared.insert(name.clone(), i);
        }
        Ok(Self { scene, declared })
    }

    fn unknown(&self, name: &Spanned<String>) -> SceneError {
        let known = self
            .declared
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(MASTER));
        SceneError::UnknownCanvas {
            name: name.get_ref().clone(),
            span: span_of(name),
            suggestions: suggest_names(known, name.get_ref()),
        }
    }

    /// Parents before children, so every parent exists when its child is created
    fn creation_order(&self) -> Result<Vec<usize>, SceneError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.scene.canvas.len()];
        let mut order = Vec::with_capacity(marks.len());

        for start in 0..self.scene.canvas.len() {
            let mut path: Vec<usize> = Vec::new();
            let mut current = Some(start);
            while let Some(i) = current {
                match marks[i] {
                    Mark::Done => break,
                    Mark::Visiting => {
                        let from = path.iter().position(|&p| p == i).unwrap_or(0);
                        let mut cycle: Vec<String> = path[from..]
                            .iter()
                            .map(|&p| self.scene.canvas[p].name.get_ref().clone())
                            .collect();
                        cycle.push(self.scene.canvas[i].name.get_ref().clone());
                        let closing = &self.scene.canvas[path.last().copied().unwrap_or(i)];
                        let span = closing
                            .parent
                            .as_ref()
                            .map(span_of)
                            .unwrap_or_else(|| span_of(&closing.name));
                        return Err(SceneError::CyclicParent { cycle, span });
                    }
                    Mark::Unvisited => {
                        marks[i] = Mark::Visiting;
                        path.push(i);
                        current = match &self.scene.canvas[i].parent {
                            None => None,
                            Some(parent) if parent.get_ref() == MASTER => None,
                            Some(parent) => match self.declared.get(parent.get_ref()) {
                                Some(&p) => Some(p),
                                None => return Err(self.unknown(parent)),
                            },
                        };
                    }
                }
            }
            // The path runs child to parent; create from the far end.
            for &i in path.iter().rev() {
                marks[i] = Mark::Done;
                order.push(i);
            }
        }
        Ok(order)
    }

    fn build(self) -> Result<Scene, SceneError> {
        let order = self.creation_order()?;
        let header = self.scene.image.get_ref();
        let mut image = Image::with_config(header.width, header.height, self.scene.layout.clone())
            .map_err(|e| layout_error(e, span_of(&self.scene.image)))?;
        let master = image.master();
        let mut names: HashMap<String, CanvasId> = HashMap::new();
        names.insert(MASTER.to_string(), master);

        if let Some(color) = header.background {
            image
                .set_background(master, color)
                .map_err(|e| layout_error(e, span_of(&self.scene.image)))?;
        }

        for i in order {
            let canvas = &self.scene.canvas[i];
            let span = span_of(&canvas.name);
            let parent = match &canvas.parent {
                None => master,
                Some(p) => names
                    .get(p.get_ref())
                    .copied()
                    .ok_or_else(|| self.unknown(p))?,
            };
            let wrap = |e| layout_error(e, span.clone());

            let id = image.create_child(parent).map_err(wrap)?;
            image.set_label(id, canvas.name.get_ref().clone()).map_err(wrap)?;
            if let Some(color) = canvas.background {
                image.set_background(id, color).map_err(wrap)?;
            }
            if let Some(paint) = canvas.paint_background {
                image.set_paint_background(id, paint).map_err(wrap)?;
            }
            if canvas.width.is_some() || canvas.height.is_some() {
                image
                    .set_intrinsic_size(id, canvas.width, canvas.height)
                    .map_err(wrap)?;
            }
            if let Some(coordinates) = canvas.coordinates {
                image.set_coordinates(id, coordinates).map_err(wrap)?;
            }
            names.insert(canvas.name.get_ref().clone(), id);
        }

        let resolve = |name: &Spanned<String>| -> Result<CanvasId, SceneError> {
            names.get(name.get_ref()).copied().ok_or_else(|| self.unknown(name))
        };

        for raw in &self.scene.fix {
            let span = span_of(&raw.kind);
            let fix = self.fix(raw, &span, &resolve)?;
            image.add_fix(fix).map_err(|e| layout_error(e, span))?;
        }

        for shape in &self.scene.shape {
            let span = span_of(&shape.kind);
            let canvas = resolve(&shape.canvas)?;
            let kind = shape.kind.get_ref().name();
            let color = shape.color.unwrap_or(PixelColor::BLACK);

            match shape.kind.get_ref() {
                TomlShapeKind::Block => {
                    let from = require(&shape.from, kind, "from", &span)?;
                    let to = require(&shape.to, kind, "to", &span)?;
                    let mut block = Block::new(from, to, color);
                    if let Some(depth) = shape.depth {
                        block = block.with_depth(depth);
                    }
                    image
                        .add_shape(canvas, block)
                        .map_err(|e| layout_error(e, span.clone()))?;
                }
                TomlShapeKind::Markers => {
                    let xs = require(&shape.xs, kind, "xs", &span)?;
                    let ys = require(&shape.ys, kind, "ys", &span)?;
                    let mut markers = Markers::new(xs, ys, color)
                        .map_err(|e| layout_error(e, span.clone()))?;
                    if let Some(radius) = shape.radius {
                        markers = markers
                            .with_radius(radius)
                            .map_err(|e| layout_error(e, span.clone()))?;
                    }
                    if let Some(depth) = shape.depth {
                        markers = markers.with_depth(depth);
                    }
                    image
                        .add_shape(canvas, markers)
                        .map_err(|e| layout_error(e, span.clone()))?;
                }
            }
        }

        Ok(Scene {
            image,
            layout: self.scene.layout,
            raster: self.scene.raster,
            names,
        })
    }

    fn fix(
        &self,
        raw: &TomlFix,
        span: &Span,
        resolve: &dyn Fn(&Spanned<String>) -> Result<CanvasId, SceneError>,
    ) -> Result<Fix, SceneError> {
        let kind = raw.kind.get_ref().name();
        let canvas = |field: &Option<Spanned<String>>, name: &'static str| {
            field
                .as_ref()
                .ok_or_else(|| SceneError::MissingField {
                    kind,
                    field: name,
                    span: span.clone(),
                })
                .and_then(resolve)
        };

        let fix = match raw.kind.get_ref() {
            TomlFixKind::Relation => Fix::relationship(
                canvas(&raw.first, "first")?,
                require(&raw.first_part, kind, "first_part", span)?,
                canvas(&raw.second, "second")?,
                require(&raw.second_part, kind, "second_part", span)?,
                raw.offset.unwrap_or(0.0),
            ),
            TomlFixKind::Dimension => Fix::dimensions(
                canvas(&raw.target, "target")?,
                require(&raw.dimension, kind, "dimension", span)?,
                require(&raw.extent, kind, "extent", span)?,
            ),
            TomlFixKind::Scale => Fix::scale(
                canvas(&raw.target, "target")?,
                require(&raw.part, kind, "part", span)?,
                canvas(&raw.reference, "reference")?,
                require(&raw.dimension, kind, "dimension", span)?,
                require(&raw.lambda, kind, "lambda", span)?,
            ),
            TomlFixKind::RelativeSize => {
                let dimension = require(&raw.dimension, kind, "dimension", span)?;
                Fix::relative_size(
                    canvas(&raw.target, "target")?,
                    dimension,
                    canvas(&raw.reference, "reference")?,
                    raw.reference_dimension.unwrap_or(dimension),
                    require(&raw.scale, kind, "scale", span)?,
                )
            }
        };
        Ok(match &raw.description {
            Some(description) => fix.with_description(description.clone()),
            None => fix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CanvasLocation;

    const INSET: &str = r##"
[image]
width = 200
height = 100

[[canvas]]
name = "plot"
background = "#0000ff"

[[fix]]
kind = "relation"
first = "master"
first_part = "left"
second = "plot"
second_part = "left"
offset = 10

[[fix]]
kind = "relation"
first = "master"
first_part = "right"
second = "plot"
second_part = "right"
offset = -10

[[fix]]
kind = "relation"
first = "master"
first_part = "bottom"
second = "plot"
second_part = "bottom"
offset = 10

[[fix]]
kind = "relation"
first = "master"
first_part = "top"
second = "plot"
second_part = "top"
offset = -10
"##;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("plot", "plot"), 0);
        assert_eq!(edit_distance("legend", "legnd"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("cat", "dog"), 3);
    }

    #[test]
    fn test_suggestions_are_nearest_first() {
        let known = ["master", "plot", "plots", "legend"];
        assert_eq!(suggest_names(known, "plto"), vec!["plot".to_string()]);
        assert_eq!(suggest_names(known, "plos"), vec!["plot".to_string(), "plots".to_string()]);
        assert!(suggest_names(known, "plot").iter().all(|name| name != "plot"));
    }

    #[test]
    fn test_inset_scene() {
        let mut scene = Scene::from_str(INSET).unwrap();
        let plot = scene.canvas("plot").unwrap();
        assert_eq!(scene.name_of(plot), Some("plot"));
        assert_eq!(scene.image.location(plot).unwrap(), CanvasLocation::new(10, 10, 190, 90));
    }

    #[test]
    fn test_parent_declared_later() {
        let source = r#"
[image]
width = 10
height = 10

[[canvas]]
name = "inner"
parent = "outer"

[[canvas]]
name = "outer"
"#;
        let scene = Scene::from_str(source).unwrap();
        let inner = scene.canvas("inner").unwrap();
        let outer = scene.canvas("outer").unwrap();
        assert_eq!(scene.image.canvas(inner).unwrap().parent(), Some(outer));
    }

    #[test]
    fn test_unknown_canvas_suggests() {
        let source = INSET.replace("second = \"plot\"\nsecond_part = \"top\"", "second = \"plto\"\nsecond_part = \"top\"");
        match Scene::from_str(&source) {
            Err(SceneError::UnknownCanvas {
                name, suggestions, span,
            }) => {
                assert_eq!(name, "plto");
                assert_eq!(suggestions, vec!["plot".to_string()]);
                assert_eq!(&source[span], "\"plto\"");
            }
            Err(other) => panic!("Expected UnknownCanvas, got: {}", other),
            Ok(_) => panic!("Expected UnknownCanvas, got a scene"),
        }
    }

    #[test]
    fn test_cycle_detected() {
        let source = r#"
[image]
width = 10
height = 10

[[canvas]]
name = "a"
parent = "b"

[[canvas]]
name = "b"
parent = "a"
"#;
        match Scene::from_str(source) {
            Err(SceneError::CyclicParent { cycle, .. }) => {
                assert_eq!(cycle, vec!["a", "b", "a"]);
            }
            Err(other) => panic!("Expected CyclicParent, got: {}", other),
            Ok(_) => panic!("Expected CyclicParent, got a scene"),
        }
    }

    #[test]
    fn test_missing_field() {
        let source = r#"
[image]
width = 10
height = 10

[[fix]]
kind = "dimension"
target = "master"
dimension = "x"
"#;
        match Scene::from_str(source) {
            Err(SceneError::MissingField { kind, field, .. }) => {
                assert_eq!(kind, "dimension");
                assert_eq!(field, "extent");
            }
            Err(other) => panic!("Expected MissingField, got: {}", other),
            Ok(_) => panic!("Expected MissingField, got a scene"),
        }
    }

    #[test]
    fn test_duplicate_and_reserved_names() {
        let duplicate = "[image]\nwidth = 1\nheight = 1\n[[canvas]]\nname = \"a\"\n[[canvas]]\nname = \"a\"\n";
        assert!(matches!(
            Scene::from_str(duplicate),
            Err(SceneError::DuplicateCanvas { .. })
        ));

        let reserved = "[image]\nwidth = 1\nheight = 1\n[[canvas]]\nname = \"master\"\n";
        assert!(matches!(
            Scene::from_str(reserved),
            Err(SceneError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_mismatched_markers() {
        let source = r#"
[image]
width = 10
height = 10

[[shape]]
canvas = "master"
kind = "markers"
xs = [1.0, 2.0]
ys = [1.0]
"#;
        match Scene::from_str(source) {
            Err(SceneError::Layout { source, .. }) => {
                assert_eq!(source, LayoutError::MismatchedLengths { x_len: 2, y_len: 1 });
            }
            Err(other) => panic!("Expected Layout error, got: {}", other),
            Ok(_) => panic!("Expected Layout error, got a scene"),
        }
    }

    #[test]
    fn test_toml_error_has_span() {
        let err = Scene::from_str("[image]\nwidth = \"wide\"\nheight = 1\n").err().unwrap();
        assert!(matches!(err, SceneError::Toml { span: Some(_), .. }));
    }
}
