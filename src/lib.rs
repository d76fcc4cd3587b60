//! Canvas Compose - constraint-based layout and compositing of nested canvases
//!
//! An [`Image`] owns a master canvas and a tree of child canvases. Their
//! rectangles are not set directly; they are solved from [`Fix`]es (edge
//! relationships, fixed extents, scale points and relative sizes). Once
//! solved, every canvas maps its own logical coordinates onto pixels, and
//! the tree is composited depth-first into a depth-buffered [`Raster`].
//!
//! # Example
//!
//! ```rust
//! use canvas_compose::{CanvasLocation, CanvasPart, Image, RasterConfig};
//!
//! let mut image = Image::new(200, 100).unwrap();
//! let master = image.master();
//! let plot = image.create_child(master).unwrap();
//! image.relation_fix(master, CanvasPart::Left, plot, CanvasPart::Left, 10.0).unwrap();
//! image.relation_fix(master, CanvasPart::Right, plot, CanvasPart::Right, -10.0).unwrap();
//! image.relation_fix(master, CanvasPart::Top, plot, CanvasPart::Top, -10.0).unwrap();
//! image.relation_fix(master, CanvasPart::Bottom, plot, CanvasPart::Bottom, 10.0).unwrap();
//!
//! assert_eq!(image.location(plot).unwrap(), CanvasLocation::new(10, 10, 190, 90));
//! let raster = image.to_raster(&RasterConfig::default()).unwrap();
//! assert_eq!(raster.width(), 200);
//! ```

pub mod error;
pub mod image;
pub mod layout;
pub mod renderer;
pub mod scene;
pub mod shapes;

pub use error::{SceneError, Span};
pub use image::{Canvas, Dirty, Image};
pub use layout::{
    CanvasCoordinates, CanvasDimension, CanvasId, CanvasLocation, CanvasMapping, CanvasPart,
    CoordinateBoundingBox, CoordinateDescription, Displacement, Distance, Fix, FixKind, ItemId,
    LayoutConfig, LayoutError, LayoutReport, LayoutWarning, Locatable, LocatableId, LocationType,
    PixelOrigin, Point, RowCheck, SolverError, WarningCategory,
};
pub use renderer::{DepthOverwrite, PixelColor, Raster, RasterConfig, DEFAULT_LEGEND};
pub use scene::Scene;
pub use shapes::{Block, DrawTarget, Markers, Shape};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while reading the scene description
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Layout configuration, used when the scene does not set its own
    pub layout: Option<LayoutConfig>,
    /// Raster configuration, used when the scene does not set its own
    pub raster: Option<RasterConfig>,
    /// Debug mode: print the canvas tree with solved locations
    pub debug: bool,
    /// Strict mode: any layout warning fails the render
    pub strict: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the scene's layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = Some(config);
        self
    }

    /// Override the scene's raster configuration
    pub fn with_raster(mut self, config: RasterConfig) -> Self {
        self.raster = Some(config);
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Solve and composite a TOML scene with default configuration
///
/// # Example
///
/// ```rust
/// use canvas_compose::render_scene;
///
/// let (report, raster) = render_scene(r#"
///     [image]
///     width = 4
///     height = 2
///     background = "red"
/// "#).unwrap();
///
/// assert!(report.is_clean());
/// assert_eq!(raster.to_ascii(".#"), "....\n....");
/// ```
pub fn render_scene(source: &str) -> Result<(LayoutReport, Raster), RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Solve and composite a TOML scene with custom configuration
///
/// # Example
///
/// ```rust
/// use canvas_compose::{render_with_config, LayoutConfig, LayoutError, RenderConfig, RenderError};
///
/// let source = r#"
///     [image]
///     width = 10
///     height = 10
/// "#;
///
/// // A threshold this high flags every unknown as unconstrained.
/// let layout = LayoutConfig {
///     unconstrained_threshold: 10.0,
///     ..LayoutConfig::default()
/// };
///
/// let (report, _) = render_with_config(source, RenderConfig::new().with_layout(layout.clone())).unwrap();
/// assert_eq!(report.warnings.len(), 4);
///
/// let strict = RenderConfig::new().with_layout(layout).with_strict(true);
/// assert!(matches!(
///     render_with_config(source, strict),
///     Err(RenderError::Layout(LayoutError::Diagnostics { count: 4 }))
/// ));
/// ```
pub fn render_with_config(
    source: &str,
    config: RenderConfig,
) -> Result<(LayoutReport, Raster), RenderError> {
    let mut scene = Scene::from_str(source)?;
    if let Some(layout) = config.layout {
        scene.image.set_config(layout)?;
    }
    let raster_config = config.raster.unwrap_or_else(|| scene.raster.clone());

    let report = scene.image.calculate_image()?;
    if config.strict && !report.is_clean() {
        return Err(LayoutError::Diagnostics {
            count: report.warnings.len(),
        }
        .into());
    }

    if config.debug {
        fn print_tree(scene: &Scene, id: CanvasId, depth: usize) {
            let Ok(canvas) = scene.image.canvas(id) else {
                return;
            };
            let indent = "  ".repeat(depth);
            let name = scene.name_of(id).unwrap_or("<anon>");
            let description = canvas.description();
            eprintln!(
                "{}[{}] {} x=[{}, {}] y=[{}, {}]",
                indent,
                name,
                canvas.location(),
                description.left,
                description.right,
                description.bottom,
                description.top
            );
            for &child in canvas.children() {
                print_tree(scene, child, depth + 1);
            }
        }
        eprintln!("=== Layout Debug ===");
        print_tree(&scene, scene.image.master(), 0);
        eprintln!("====================");
    }

    let raster = scene.image.to_raster(&raster_config)?;
    Ok((report, raster))
}
