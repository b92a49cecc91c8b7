use crate::{
    foundation::core::{Affine, Point, Size},
    render::plan::TextAnchor,
};

/// Transform mapping an image of `image` size onto `canvas` so it covers the canvas.
///
/// The image is scaled uniformly by `max(cw/iw, ch/ih)` and centered; whatever overflows the
/// canvas is cropped by the canvas bounds.
pub fn cover_transform(image: Size, canvas: Size) -> Affine {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Affine::IDENTITY;
    }
    let scale = (canvas.width / image.width).max(canvas.height / image.height);
    let dx = (canvas.width - image.width * scale) / 2.0;
    let dy = (canvas.height - image.height * scale) / 2.0;
    Affine::translate((dx, dy)) * Affine::scale(scale)
}

/// Gradient axis running from the middle of the top edge to the middle of the bottom edge.
pub fn gradient_axis(canvas: Size) -> (Point, Point) {
    let x = canvas.width / 2.0;
    (Point::new(x, 0.0), Point::new(x, canvas.height))
}

/// Horizontal offset that centers `extent` inside `container`.
///
/// Never negative: content wider than its container starts at the left edge.
pub fn center_offset(container: f64, extent: f64) -> f64 {
    ((container - extent) / 2.0).max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Measured text block awaiting vertical placement.
pub struct TextBlock {
    /// Placement rule.
    pub anchor: TextAnchor,
    /// Laid-out height in pixels.
    pub height: f64,
}

/// Top edge (y, px) of each block, in input order.
///
/// `Flow` blocks stack top to bottom, each followed by its margin, and the whole group is
/// centered vertically. `Bottom` blocks sit `inset_px` above the canvas bottom and do not
/// affect the flow group.
pub fn stack_text_blocks(canvas_height: f64, blocks: &[TextBlock]) -> Vec<f64> {
    let group: f64 = blocks
        .iter()
        .filter_map(|b| match b.anchor {
            TextAnchor::Flow { margin_bottom_px } => Some(b.height + margin_bottom_px),
            TextAnchor::Bottom { .. } => None,
        })
        .sum();

    let mut cursor = (canvas_height - group) / 2.0;
    blocks
        .iter()
        .map(|b| match b.anchor {
            TextAnchor::Flow { margin_bottom_px } => {
                let top = cursor;
                cursor += b.height + margin_bottom_px;
                top
            }
            TextAnchor::Bottom { inset_px } => canvas_height - inset_px - b.height,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
