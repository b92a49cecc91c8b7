use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::{color::HexColor, core::ResourceHandle};

/// Font-size change applied per increase/decrease.
pub const FONT_STEP: u32 = 2;

/// Canvas aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Wide,
    /// 1:1 square.
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Human-readable label (`"16:9"`, `"1:1"`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Wide => "16:9",
            Self::Square => "1:1",
        }
    }
}

/// Canvas background. Exactly one variant is active; switching drops the others' data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// Flat fill.
    Solid {
        /// Fill color.
        color: HexColor,
    },
    /// Two-stop linear gradient.
    Gradient {
        /// First stop.
        start: HexColor,
        /// Last stop.
        end: HexColor,
    },
    /// Photo scaled to cover the canvas.
    Image {
        /// Picked image handle.
        uri: ResourceHandle,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid {
            color: HexColor::WHITE,
        }
    }
}

impl Background {
    /// Fill color when the background is [`Background::Solid`].
    pub fn solid_color(&self) -> Option<HexColor> {
        match self {
            Self::Solid { color } => Some(*color),
            _ => None,
        }
    }

    /// Stops when the background is [`Background::Gradient`].
    pub fn gradient_stops(&self) -> Option<(HexColor, HexColor)> {
        match self {
            Self::Gradient { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    /// Image handle when the background is [`Background::Image`].
    pub fn image(&self) -> Option<&ResourceHandle> {
        match self {
            Self::Image { uri } => Some(uri),
            _ => None,
        }
    }
}

/// Identifier of one of the three fixed text layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayerId {
    /// Large bold heading.
    Title,
    /// Line below the title.
    Subtitle,
    /// Small caption pinned to the bottom edge.
    Description,
}

impl TextLayerId {
    /// All layers, in paint order.
    pub const ALL: [Self; 3] = [Self::Title, Self::Subtitle, Self::Description];

    /// Allowed font-size range for this layer.
    pub fn font_range(self) -> FontSizeRange {
        match self {
            Self::Title => FontSizeRange { min: 10, max: 50 },
            Self::Subtitle => FontSizeRange { min: 8, max: 40 },
            Self::Description => FontSizeRange { min: 6, max: 30 },
        }
    }

    /// Font size at session start and after reset.
    pub fn default_font_size(self) -> u32 {
        match self {
            Self::Title => 30,
            Self::Subtitle => 18,
            Self::Description => 12,
        }
    }
}

/// Inclusive font-size bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSizeRange {
    /// Smallest allowed size.
    pub min: u32,
    /// Largest allowed size.
    pub max: u32,
}

impl FontSizeRange {
    /// Saturate `size` into the range.
    pub fn clamp(self, size: u32) -> u32 {
        size.clamp(self.min, self.max)
    }

    /// Return `true` when `size` lies inside the range.
    pub fn contains(self, size: u32) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

/// Direction of a font-size adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStep {
    /// Grow by [`FONT_STEP`].
    Increase,
    /// Shrink by [`FONT_STEP`].
    Decrease,
}

/// Content and style of one text layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextLayer {
    pub(crate) content: String,
    pub(crate) color: HexColor,
    pub(crate) font_size: u32,
}

impl TextLayer {
    fn initial(id: TextLayerId) -> Self {
        Self {
            content: String::new(),
            color: HexColor::BLACK,
            font_size: id.default_font_size(),
        }
    }

    /// Text shown on the canvas.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Fill color.
    pub fn color(&self) -> HexColor {
        self.color
    }

    /// Font size in logical pixels.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }
}

/// The fixed title/subtitle/description mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextLayers {
    title: TextLayer,
    subtitle: TextLayer,
    description: TextLayer,
}

impl Default for TextLayers {
    fn default() -> Self {
        Self {
            title: TextLayer::initial(TextLayerId::Title),
            subtitle: TextLayer::initial(TextLayerId::Subtitle),
            description: TextLayer::initial(TextLayerId::Description),
        }
    }
}

impl TextLayers {
    /// Borrow a layer.
    pub fn get(&self, id: TextLayerId) -> &TextLayer {
        match id {
            TextLayerId::Title => &self.title,
            TextLayerId::Subtitle => &self.subtitle,
            TextLayerId::Description => &self.description,
        }
    }

    fn get_mut(&mut self, id: TextLayerId) -> &mut TextLayer {
        match id {
            TextLayerId::Title => &mut self.title,
            TextLayerId::Subtitle => &mut self.subtitle,
            TextLayerId::Description => &mut self.description,
        }
    }

    /// Iterate layers in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (TextLayerId, &TextLayer)> {
        TextLayerId::ALL.into_iter().map(|id| (id, self.get(id)))
    }
}

/// What the open color picker writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTarget {
    /// Solid background color.
    Background,
    /// A text layer's color.
    Text(TextLayerId),
}

/// Every editable property of the thumbnail.
///
/// Created with fixed defaults, mutated only through the methods below (or
/// [`CompositionState::apply`](crate::Action)), restored by [`CompositionState::reset`].
/// None of the mutations can fail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompositionState {
    aspect_ratio: AspectRatio,
    background: Background,
    text_layers: TextLayers,
    #[serde(skip)]
    active_color_target: Option<ColorTarget>,
}

impl CompositionState {
    /// Session-start defaults: 16:9, white solid background, empty black text at 30/18/12.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Active background.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// All text layers.
    pub fn text_layers(&self) -> &TextLayers {
        &self.text_layers
    }

    /// Shorthand for `text_layers().get(id)`.
    pub fn text_layer(&self, id: TextLayerId) -> &TextLayer {
        self.text_layers.get(id)
    }

    /// Target of the open color picker, if any.
    pub fn active_color_target(&self) -> Option<ColorTarget> {
        self.active_color_target
    }

    /// Replace the aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Switch to a solid background with a uniformly random color.
    pub fn randomize_solid_background<R: Rng + ?Sized>(&mut self, rng: &mut R) -> HexColor {
        let color = HexColor::random(rng);
        self.background = Background::Solid { color };
        color
    }

    /// Switch to a gradient with two independently random stops (they may coincide).
    pub fn randomize_gradient_background<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> (HexColor, HexColor) {
        let start = HexColor::random(rng);
        let end = HexColor::random(rng);
        self.background = Background::Gradient { start, end };
        (start, end)
    }

    /// Switch to a photo background.
    pub fn set_background_image(&mut self, uri: ResourceHandle) {
        self.background = Background::Image { uri };
    }

    /// Switch to a solid background with an explicit color.
    pub fn set_background_color(&mut self, color: HexColor) {
        self.background = Background::Solid { color };
    }

    /// Switch to a gradient with explicit stops.
    pub fn set_background_gradient(&mut self, start: HexColor, end: HexColor) {
        self.background = Background::Gradient { start, end };
    }

    /// Replace one layer's text. No length limit.
    pub fn set_text_content(&mut self, layer: TextLayerId, text: impl Into<String>) {
        self.text_layers.get_mut(layer).content = text.into();
    }

    /// Replace one layer's color.
    pub fn set_text_color(&mut self, layer: TextLayerId, color: HexColor) {
        self.text_layers.get_mut(layer).color = color;
    }

    /// Step one layer's font size, saturating at the layer's bounds. Returns the new size.
    pub fn adjust_font_size(&mut self, layer: TextLayerId, step: FontStep) -> u32 {
        let range = layer.font_range();
        let t = self.text_layers.get_mut(layer);
        let next = match step {
            FontStep::Increase => t.font_size.saturating_add(FONT_STEP),
            FontStep::Decrease => t.font_size.saturating_sub(FONT_STEP),
        };
        t.font_size = range.clamp(next);
        t.font_size
    }

    /// Open the color picker for `target`.
    pub fn open_color_picker(&mut self, target: ColorTarget) {
        self.active_color_target = Some(target);
    }

    /// Write `color` to the picker's target and close it. No-op when no picker is open.
    pub fn apply_picked_color(&mut self, color: HexColor) {
        match self.active_color_target.take() {
            Some(ColorTarget::Background) => self.set_background_color(color),
            Some(ColorTarget::Text(layer)) => self.set_text_color(layer, color),
            None => {}
        }
    }

    /// Close the color picker without writing.
    pub fn close_color_picker(&mut self) {
        self.active_color_target = None;
    }

    /// Restore every field to its session-start default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
