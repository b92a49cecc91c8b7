use crate::{
    composition::model::AspectRatio,
    foundation::core::{Canvas, Size, Viewport},
};

/// Share of the viewport width the canvas occupies.
pub const CANVAS_WIDTH_FRACTION: f64 = 0.9;

/// Logical canvas size for `ratio` inside `viewport`.
///
/// Width is 90% of the viewport; height follows the ratio (`width / 16 * 9` or `width`).
pub fn canvas_logical_size(ratio: AspectRatio, viewport: &Viewport) -> Size {
    let width = viewport.width * CANVAS_WIDTH_FRACTION;
    let height = match ratio {
        AspectRatio::Wide => width / 16.0 * 9.0,
        AspectRatio::Square => width,
    };
    Size::new(width, height)
}

/// Physical canvas size in pixels (logical size times pixel ratio, rounded, at least 1x1).
pub fn canvas_for(ratio: AspectRatio, viewport: &Viewport) -> Canvas {
    let logical = canvas_logical_size(ratio, viewport);
    fn px(v: f64) -> u32 {
        v.round().clamp(1.0, f64::from(u32::MAX)) as u32
    }
    Canvas {
        width: px(logical.width * viewport.pixel_ratio),
        height: px(logical.height * viewport.pixel_ratio),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/layout.rs"]
mod tests;
