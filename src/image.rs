//! Images: a master canvas, its descendants, and the fixes that place them
//!
//! Canvases live in an arena owned by the [`Image`] and refer to each other
//! by [`CanvasId`]. Any change to fixes, sizes, shapes or coordinates marks
//! the image [`Dirty::NeedsRecompute`]; the next call that needs locations
//! runs one full solve.

use std::rc::Rc;

use log::{debug, info};

use crate::layout::diagnostics::{self, LayoutReport};
use crate::layout::{
    infer_coordinates, solve, validate_coordinates, CanvasCoordinates, CanvasDimension, CanvasId,
    CanvasLocation, CanvasMapping, CanvasPart, CoordinateBoundingBox, CoordinateDescription, Fix,
    IntrinsicSize, ItemId, LayoutConfig, LayoutError, LayoutSystem, Locatable, LocatableId,
    LocatableRegistry, PixelOrigin, Point,
};
use crate::renderer::{self, PixelColor, Raster, RasterConfig};
use crate::shapes::Shape;

/// Whether cached layout results are still valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirty {
    Clean,
    NeedsRecompute,
}

/// A rectangular drawing region
#[derive(Debug)]
pub struct Canvas {
    parent: Option<CanvasId>,
    children: Vec<CanvasId>,
    label: Option<String>,
    background: PixelColor,
    paint_background: bool,
    shapes: Vec<Rc<dyn Shape>>,
    coordinates: CanvasCoordinates,
    description: CoordinateDescription,
    location: CanvasLocation,
    width: Option<f64>,
    height: Option<f64>,
}

impl Canvas {
    fn new(parent: Option<CanvasId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            label: None,
            background: PixelColor::WHITE,
            paint_background: false,
            shapes: Vec::new(),
            coordinates: CanvasCoordinates::default(),
            description: CoordinateDescription::default(),
            location: CanvasLocation::default(),
            width: None,
            height: None,
        }
    }

    pub fn parent(&self) -> Option<CanvasId> {
        self.parent
    }

    /// Child canvases in creation order
    pub fn children(&self) -> &[CanvasId] {
        &self.children
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn background(&self) -> PixelColor {
        self.background
    }

    pub fn paint_background(&self) -> bool {
        self.paint_background
    }

    /// Attached shapes in attachment order
    pub fn shapes(&self) -> &[Rc<dyn Shape>] {
        &self.shapes
    }

    /// Explicitly requested logical bounds
    pub fn coordinates(&self) -> &CanvasCoordinates {
        &self.coordinates
    }

    /// Resolved logical bounds from the last layout pass
    pub fn description(&self) -> &CoordinateDescription {
        &self.description
    }

    /// Pixel rectangle from the last layout pass
    pub fn location(&self) -> CanvasLocation {
        self.location
    }

    pub fn mapping(&self) -> CanvasMapping {
        CanvasMapping::new(self.location, self.description)
    }

    fn bounding_boxes(&self) -> Vec<CoordinateBoundingBox> {
        self.shapes.iter().map(|s| s.bounding_box()).collect()
    }
}

impl Locatable for Canvas {
    fn width(&self) -> Option<f64> {
        self.width
    }

    fn height(&self) -> Option<f64> {
        self.height
    }

    fn set_location(&mut self, location: CanvasLocation) {
        self.location = location;
    }
}

/// The root of a canvas tree together with its layout constraints
pub struct Image {
    width: i32,
    height: i32,
    canvases: Vec<Canvas>,
    items: Vec<Box<dyn Locatable>>,
    registry: LocatableRegistry,
    fixes: Vec<Fix>,
    dirty: Dirty,
    config: LayoutConfig,
    report: LayoutReport,
}

impl Image {
    /// Create an image with a master canvas covering `width x height` pixels
    pub fn new(width: i32, height: i32) -> Result<Self, LayoutError> {
        Self::with_config(width, height, LayoutConfig::default())
    }

    pub fn with_config(width: i32, height: i32, config: LayoutConfig) -> Result<Self, LayoutError> {
        if width <= 0 || height <= 0 {
            return Err(LayoutError::InvalidImageSize { width, height });
        }
        config.validate()?;
        let mut registry = LocatableRegistry::new();
        registry.add(LocatableId::Canvas(CanvasId(0)));
        Ok(Self {
            width,
            height,
            canvases: vec![Canvas::new(None)],
            items: Vec::new(),
            registry,
            fixes: Vec::new(),
            dirty: Dirty::NeedsRecompute,
            config,
            report: LayoutReport::default(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) -> Result<(), LayoutError> {
        config.validate()?;
        self.config = config;
        self.touch();
        Ok(())
    }

    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    fn touch(&mut self) {
        self.dirty = Dirty::NeedsRecompute;
    }

    /// The canvas pinned to the full image bounds
    pub fn master(&self) -> CanvasId {
        CanvasId(0)
    }

    pub fn canvas(&self, id: CanvasId) -> Result<&Canvas, LayoutError> {
        self.canvases
            .get(id.0)
            .ok_or(LayoutError::UnknownCanvas { id })
    }

    fn canvas_mut(&mut self, id: CanvasId) -> Result<&mut Canvas, LayoutError> {
        self.canvases
            .get_mut(id.0)
            .ok_or(LayoutError::UnknownCanvas { id })
    }

    /// All canvas ids in creation order
    pub fn canvas_ids(&self) -> impl Iterator<Item = CanvasId> {
        (0..self.canvases.len()).map(CanvasId)
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    // ------------------------------------------------------------------------
    // Tree construction
    // ------------------------------------------------------------------------

    /// Create a child canvas; it is registered for layout immediately
    pub fn create_child(&mut self, parent: CanvasId) -> Result<CanvasId, LayoutError> {
        self.canvas(parent)?;
        let id = CanvasId(self.canvases.len());
        self.canvases.push(Canvas::new(Some(parent)));
        self.canvas_mut(parent)?.children.push(id);
        self.registry.add(id.into());
        self.touch();
        Ok(id)
    }

    pub fn set_label(&mut self, canvas: CanvasId, label: impl Into<String>) -> Result<(), LayoutError> {
        self.canvas_mut(canvas)?.label = Some(label.into());
        Ok(())
    }

    /// Attach a shape to a canvas
    pub fn add_shape(&mut self, canvas: CanvasId, shape: impl Shape + 'static) -> Result<(), LayoutError> {
        self.add_shared_shape(canvas, Rc::new(shape))
    }

    /// Attach a shape the caller keeps a handle to
    pub fn add_shared_shape(&mut self, canvas: CanvasId, shape: Rc<dyn Shape>) -> Result<(), LayoutError> {
        self.canvas_mut(canvas)?.shapes.push(shape);
        self.touch();
        Ok(())
    }

    pub fn set_background(&mut self, canvas: CanvasId, color: PixelColor) -> Result<(), LayoutError> {
        let canvas = self.canvas_mut(canvas)?;
        canvas.background = color;
        canvas.paint_background = true;
        Ok(())
    }

    pub fn set_paint_background(&mut self, canvas: CanvasId, paint: bool) -> Result<(), LayoutError> {
        self.canvas_mut(canvas)?.paint_background = paint;
        Ok(())
    }

    /// Force explicit logical bounds; unset sides are still inferred
    pub fn set_coordinates(
        &mut self,
        canvas: CanvasId,
        coordinates: CanvasCoordinates,
    ) -> Result<(), LayoutError> {
        validate_coordinates(&coordinates)?;
        self.canvas_mut(canvas)?.coordinates = coordinates;
        self.touch();
        Ok(())
    }

    /// Give a canvas an intrinsic pixel size; each present dimension becomes an implicit row
    pub fn set_intrinsic_size(
        &mut self,
        canvas: CanvasId,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<(), LayoutError> {
        for (parameter, value) in [("width", width), ("height", height)] {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(LayoutError::NonFiniteParameter {
                        fix: "IntrinsicSize",
                        parameter,
                        value,
                    });
                }
                if value <= 0.0 {
                    return Err(LayoutError::InvalidExtent { extent: value });
                }
            }
        }
        let canvas = self.canvas_mut(canvas)?;
        canvas.width = width;
        canvas.height = height;
        self.touch();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Locatables
    // ------------------------------------------------------------------------

    /// Hand a free-standing locatable to the image; it takes part in layout once registered
    pub fn add_locatable(&mut self, locatable: Box<dyn Locatable>) -> ItemId {
        self.items.push(locatable);
        ItemId(self.items.len() - 1)
    }

    pub fn item(&self, id: ItemId) -> Option<&dyn Locatable> {
        self.items.get(id.0).map(|b| b.as_ref())
    }

    /// Register a locatable for layout.
    ///
    /// Returns its column-block index, or `None` if it was already registered.
    pub fn register_locatable(&mut self, id: impl Into<LocatableId>) -> Result<Option<usize>, LayoutError> {
        let id = id.into();
        let exists = match id {
            LocatableId::Canvas(c) => c.0 < self.canvases.len(),
            LocatableId::Item(i) => i.0 < self.items.len(),
        };
        if !exists {
            return Err(LayoutError::UnregisteredLocatable { id });
        }
        let index = self.registry.add(id);
        if index.is_some() {
            self.touch();
        }
        Ok(index)
    }

    pub fn registry(&self) -> &LocatableRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Fixes
    // ------------------------------------------------------------------------

    /// Add a fix after validating its parameters and participants
    pub fn add_fix(&mut self, fix: Fix) -> Result<usize, LayoutError> {
        fix.validate()?;
        if let Some(id) = fix.locatables().into_iter().find(|id| !self.registry.contains(*id)) {
            return Err(LayoutError::UnregisteredLocatable { id });
        }
        self.fixes.push(fix);
        self.touch();
        Ok(self.fixes.len() - 1)
    }

    /// `second.second_part - first.first_part = pixels_diff`
    pub fn relation_fix(
        &mut self,
        first: impl Into<LocatableId>,
        first_part: CanvasPart,
        second: impl Into<LocatableId>,
        second_part: CanvasPart,
        pixels_diff: f64,
    ) -> Result<usize, LayoutError> {
        self.add_fix(Fix::relationship(first, first_part, second, second_part, pixels_diff))
    }

    /// Pin the width or height of `target`
    pub fn dimensions_fix(
        &mut self,
        target: impl Into<LocatableId>,
        dimension: CanvasDimension,
        extent: f64,
    ) -> Result<usize, LayoutError> {
        self.add_fix(Fix::dimensions(target, dimension, extent))
    }

    /// Place `target_part` at fraction `lambda` along `reference`'s `dimension`
    pub fn scale_fix(
        &mut self,
        target: impl Into<LocatableId>,
        target_part: CanvasPart,
        reference: impl Into<LocatableId>,
        dimension: CanvasDimension,
        lambda: f64,
    ) -> Result<usize, LayoutError> {
        self.add_fix(Fix::scale(target, target_part, reference, dimension, lambda))
    }

    /// Make one extent of `target` a multiple of one extent of `reference`
    pub fn relative_size_fix(
        &mut self,
        target: impl Into<LocatableId>,
        target_dimension: CanvasDimension,
        reference: impl Into<LocatableId>,
        reference_dimension: CanvasDimension,
        scale: f64,
    ) -> Result<usize, LayoutError> {
        self.add_fix(Fix::relative_size(
            target,
            target_dimension,
            reference,
            reference_dimension,
            scale,
        ))
    }

    /// Remove every explicit fix
    pub fn clear_relationships(&mut self) {
        self.fixes.clear();
        self.touch();
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    fn intrinsic_size(&self, id: LocatableId) -> IntrinsicSize {
        let locatable: Option<&dyn Locatable> = match id {
            LocatableId::Canvas(c) => self.canvases.get(c.0).map(|c| c as &dyn Locatable),
            LocatableId::Item(i) => self.item(i),
        };
        locatable
            .map(|l| IntrinsicSize {
                width: l.width(),
                height: l.height(),
            })
            .unwrap_or_default()
    }

    fn assign_location(&mut self, id: LocatableId, location: CanvasLocation) {
        match id {
            LocatableId::Canvas(c) => {
                if let Some(canvas) = self.canvases.get_mut(c.0) {
                    canvas.set_location(location);
                }
            }
            LocatableId::Item(i) => {
                if let Some(item) = self.items.get_mut(i.0) {
                    item.set_location(location);
                }
            }
        }
    }

    /// Solve the layout and infer every canvas' coordinate system.
    ///
    /// Runs a full solve when the image is dirty and returns the cached report
    /// otherwise. Diagnostics never fail this call; see [`LayoutReport::warnings`].
    pub fn calculate_image(&mut self) -> Result<LayoutReport, LayoutError> {
        self.refresh()?;
        Ok(self.report.clone())
    }

    /// Run a full solve if the image is dirty; the result is kept in `self.report`
    fn refresh(&mut self) -> Result<(), LayoutError> {
        if self.dirty == Dirty::Clean {
            return Ok(());
        }

        let ids: Vec<LocatableId> = self.registry.iter().collect();
        let sizes: Vec<IntrinsicSize> = ids.iter().map(|&id| self.intrinsic_size(id)).collect();
        let layout = LayoutSystem::assemble(self.width, self.height, &sizes, &self.fixes, &self.registry)?;
        let solution = solve(&layout.system, &self.config)?;
        let (rows, warnings) = diagnostics::check(&layout, &solution, &self.config);

        let locations = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                solution
                    .location(i, self.config.integer_snap)
                    .map(|location| (id, location))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (i, &(id, location)) in locations.iter().enumerate() {
            debug!("Locatable # {:>3} location: {}", i, location);
            self.assign_location(id, location);
        }

        self.calculate_coordinates();

        info!(
            "solved layout for {} locatables ({} rows, {} warnings)",
            ids.len(),
            rows.len(),
            warnings.len()
        );
        self.report = LayoutReport {
            locations,
            rows,
            warnings,
        };
        self.dirty = Dirty::Clean;
        Ok(())
    }

    fn calculate_coordinates(&mut self) {
        let epsilon = self.config.coordinate_epsilon;
        for canvas in &mut self.canvases {
            let boxes = canvas.bounding_boxes();
            canvas.description = infer_coordinates(&boxes, &canvas.coordinates, epsilon);
        }
    }

    /// Solved rectangle of a registered locatable, solving first if needed
    pub fn location(&mut self, id: impl Into<LocatableId>) -> Result<CanvasLocation, LayoutError> {
        let id = id.into();
        self.refresh()?;
        self.report
            .location_of(id)
            .ok_or(LayoutError::UnregisteredLocatable { id })
    }

    /// Placement of a canvas, solving first if needed
    pub fn mapping(&mut self, canvas: CanvasId) -> Result<CanvasMapping, LayoutError> {
        self.refresh()?;
        Ok(self.canvas(canvas)?.mapping())
    }

    /// Convert a point on a canvas to absolute pixel coordinates
    pub fn point_to_pixels(
        &mut self,
        canvas: CanvasId,
        point: &Point,
        origin: PixelOrigin,
    ) -> Result<(f64, f64), LayoutError> {
        Ok(self.mapping(canvas)?.point_to_pixels(point, origin))
    }

    /// Solve if needed, then composite every canvas into a fresh raster
    pub fn to_raster(&mut self, config: &RasterConfig) -> Result<Raster, LayoutError> {
        self.refresh()?;
        // Both extents are positive, checked at construction.
        let mut raster = Raster::with_config(self.width as usize, self.height as usize, config);
        renderer::compose(self, &mut raster, config);
        Ok(raster)
    }
}
