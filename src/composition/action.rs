use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    composition::model::{AspectRatio, ColorTarget, CompositionState, FontStep, TextLayerId},
    foundation::{color::HexColor, core::ResourceHandle},
};

/// One user interaction, expressed as data.
///
/// Actions are what the CLI reads from a script and what [`crate::Editor::dispatch`] routes;
/// each variant maps onto one [`CompositionState`] mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// See [`CompositionState::set_aspect_ratio`].
    SetAspectRatio {
        /// New ratio.
        ratio: AspectRatio,
    },
    /// See [`CompositionState::randomize_solid_background`].
    RandomSolidBackground,
    /// See [`CompositionState::randomize_gradient_background`].
    RandomGradientBackground,
    /// See [`CompositionState::set_background_image`].
    SetBackgroundImage {
        /// Image handle.
        uri: ResourceHandle,
    },
    /// See [`CompositionState::set_background_color`].
    SetBackgroundColor {
        /// Fill color.
        color: HexColor,
    },
    /// See [`CompositionState::set_background_gradient`].
    SetBackgroundGradient {
        /// First stop.
        start: HexColor,
        /// Last stop.
        end: HexColor,
    },
    /// See [`CompositionState::set_text_content`].
    SetText {
        /// Target layer.
        layer: TextLayerId,
        /// New content.
        text: String,
    },
    /// See [`CompositionState::set_text_color`].
    SetTextColor {
        /// Target layer.
        layer: TextLayerId,
        /// New color.
        color: HexColor,
    },
    /// See [`CompositionState::adjust_font_size`].
    AdjustFontSize {
        /// Target layer.
        layer: TextLayerId,
        /// Direction.
        step: FontStep,
    },
    /// See [`CompositionState::open_color_picker`].
    OpenColorPicker {
        /// Picker target.
        target: ColorTarget,
    },
    /// See [`CompositionState::apply_picked_color`].
    PickColor {
        /// Selected color.
        color: HexColor,
    },
    /// See [`CompositionState::close_color_picker`].
    CloseColorPicker,
    /// See [`CompositionState::reset`].
    Reset,
}

impl CompositionState {
    /// Reducer entry point: apply one [`Action`].
    ///
    /// `rng` is only drawn from by the randomizing actions.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) {
        tracing::debug!(?action, "apply");
        match action {
            Action::SetAspectRatio { ratio } => self.set_aspect_ratio(ratio),
            Action::RandomSolidBackground => {
                self.randomize_solid_background(rng);
            }
            Action::RandomGradientBackground => {
                self.randomize_gradient_background(rng);
            }
            Action::SetBackgroundImage { uri } => self.set_background_image(uri),
            Action::SetBackgroundColor { color } => self.set_background_color(color),
            Action::SetBackgroundGradient { start, end } => {
                self.set_background_gradient(start, end)
            }
            Action::SetText { layer, text } => self.set_text_content(layer, text),
            Action::SetTextColor { layer, color } => self.set_text_color(layer, color),
            Action::AdjustFontSize { layer, step } => {
                self.adjust_font_size(layer, step);
            }
            Action::OpenColorPicker { target } => self.open_color_picker(target),
            Action::PickColor { color } => self.apply_picked_color(color),
            Action::CloseColorPicker => self.close_color_picker(),
            Action::Reset => self.reset(),
        }
    }
}

/// Parse a JSON array of actions.
pub fn parse_script(json: &str) -> crate::ThumbResult<Vec<Action>> {
    serde_json::from_str(json)
        .map_err(|e| crate::ThumbError::serde(format!("parse action script: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/composition/action.rs"]
mod tests;
