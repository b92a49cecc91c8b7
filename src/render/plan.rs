use crate::{
    composition::{
        layout::canvas_for,
        model::{Background, CompositionState, TextLayerId},
    },
    foundation::{
        color::HexColor,
        core::{Canvas, ResourceHandle, Viewport},
    },
};

/// Gap below the title and below the subtitle, in logical pixels.
pub const FLOW_MARGIN_BOTTOM: f64 = 10.0;
/// Distance between the description's bottom edge and the canvas bottom, in logical pixels.
pub const DESCRIPTION_BOTTOM_INSET: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
/// Display list for one composition state.
///
/// A plan is a pure function of [`CompositionState`] and [`Viewport`]; it is recompiled after
/// every mutation and never cached.
pub struct ScenePlan {
    /// Output size in pixels.
    pub canvas: Canvas,
    /// Draw operations, bottom to top.
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by [`compile_scene`].
pub enum DrawOp {
    /// Fill the canvas with a flat color.
    Fill {
        /// Fill color.
        color: HexColor,
    },
    /// Fill the canvas with a two-stop linear gradient running top to bottom.
    LinearGradient {
        /// Color at the top edge.
        start: HexColor,
        /// Color at the bottom edge.
        end: HexColor,
    },
    /// Draw a decoded image scaled to cover the canvas.
    ImageCover {
        /// Handle of a decoded image in the [`crate::ImageStore`].
        handle: ResourceHandle,
    },
    /// Draw one text layer.
    Text(TextOp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Face used for a text op.
pub enum FontWeight {
    /// Regular face.
    Regular,
    /// Bold face.
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Vertical placement rule for a text op.
pub enum TextAnchor {
    /// Part of the vertically centered title/subtitle group, followed by a bottom margin (px).
    Flow {
        /// Space below the block in pixels.
        margin_bottom_px: f64,
    },
    /// Pinned above the canvas bottom edge, outside the flow group.
    Bottom {
        /// Distance from the canvas bottom in pixels.
        inset_px: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Text draw parameters, already scaled to pixels.
pub struct TextOp {
    /// Source layer.
    pub layer: TextLayerId,
    /// Text to shape.
    pub content: String,
    /// Fill color.
    pub color: HexColor,
    /// Font size in pixels.
    pub size_px: f32,
    /// Face.
    pub weight: FontWeight,
    /// Vertical placement.
    pub anchor: TextAnchor,
}

/// Compile the display list for `state` inside `viewport`.
///
/// Ops are ordered bottom to top: background, then title, subtitle and description. Empty text
/// layers emit no op.
pub fn compile_scene(state: &CompositionState, viewport: &Viewport) -> ScenePlan {
    let canvas = canvas_for(state.aspect_ratio(), viewport);
    let scale = viewport.pixel_ratio;
    let mut ops = Vec::with_capacity(4);

    ops.push(match state.background() {
        Background::Solid { color } => DrawOp::Fill { color: *color },
        Background::Gradient { start, end } => DrawOp::LinearGradient {
            start: *start,
            end: *end,
        },
        Background::Image { uri } => DrawOp::ImageCover {
            handle: uri.clone(),
        },
    });

    for (id, layer) in state.text_layers().iter() {
        if layer.content().is_empty() {
            continue;
        }
        let (weight, anchor) = match id {
            TextLayerId::Title => (
                FontWeight::Bold,
                TextAnchor::Flow {
                    margin_bottom_px: FLOW_MARGIN_BOTTOM * scale,
                },
            ),
            TextLayerId::Subtitle => (
                FontWeight::Regular,
                TextAnchor::Flow {
                    margin_bottom_px: FLOW_MARGIN_BOTTOM * scale,
                },
            ),
            TextLayerId::Description => (
                FontWeight::Regular,
                TextAnchor::Bottom {
                    inset_px: DESCRIPTION_BOTTOM_INSET * scale,
                },
            ),
        };
        ops.push(DrawOp::Text(TextOp {
            layer: id,
            content: layer.content().to_owned(),
            color: layer.color(),
            size_px: (f64::from(layer.font_size()) * scale) as f32,
            weight,
            anchor,
        }));
    }

    ScenePlan { canvas, ops }
}

impl ScenePlan {
    /// Text ops in paint order.
    pub fn text_ops(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
