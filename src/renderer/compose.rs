//! Depth-first compositing of a canvas tree
//!
//! Each canvas restricts writes to its own rectangle, then paints its
//! background, its shapes in attachment order, and finally its children in
//! creation order.

use log::trace;

use crate::image::Image;
use crate::layout::CanvasId;
use crate::shapes::DrawTarget;

use super::config::RasterConfig;
use super::raster::Raster;

/// Paint every canvas of a solved image into `raster`
pub fn compose(image: &Image, raster: &mut Raster, config: &RasterConfig) {
    paint_canvas(image, image.master(), raster, config);
    raster.reset_permitted_region();
}

fn paint_canvas(image: &Image, id: CanvasId, raster: &mut Raster, config: &RasterConfig) {
    let Ok(canvas) = image.canvas(id) else {
        return;
    };
    let location = canvas.location();
    trace!("painting canvas #{} at {}", id.index(), location);
    raster.permit_location(&location);

    if canvas.paint_background() {
        raster.fill_rect(
            location.left,
            location.bottom,
            location.right,
            location.top,
            canvas.background(),
            config.background_depth,
        );
    }

    let mut target = DrawTarget::new(raster, canvas.mapping(), config.default_shape_depth);
    for shape in canvas.shapes() {
        shape.draw(&mut target);
    }

    for &child in canvas.children() {
        paint_canvas(image, child, raster, config);
    }
}
