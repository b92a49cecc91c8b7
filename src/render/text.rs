use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use sha2::Digest as _;
use usvg::fontdb;

use crate::{
    foundation::{
        color::HexColor,
        error::{ThumbError, ThumbResult},
    },
    render::plan::FontWeight,
};

/// Families tried, in order, before falling back to the generic sans-serif family.
const PREFERRED_FAMILIES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "Arial",
];

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Explicit font files; unset entries are resolved from the system font database.
pub struct FontSources {
    /// Regular face used by the subtitle and description.
    pub regular: Option<PathBuf>,
    /// Bold face used by the title.
    pub bold: Option<PathBuf>,
}

#[derive(Clone, Debug)]
/// Raw font face bytes plus the collection index of the face.
pub struct FontFace {
    /// Human-readable origin: a family name or a file path.
    pub label: String,
    /// Font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

impl FontFace {
    /// Read a face from a font file (index 0).
    pub fn from_file(path: &Path) -> ThumbResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Ok(Self {
            label: path.display().to_string(),
            bytes: Arc::new(bytes),
            index: 0,
        })
    }

    /// Lowercase hex SHA-256 of the font bytes.
    pub fn sha256_hex(&self) -> String {
        let digest = sha2::Sha256::digest(self.bytes.as_slice());
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}

#[derive(Clone, Debug)]
/// Regular and bold faces used for text layers.
pub struct FontSet {
    /// Regular face.
    pub regular: FontFace,
    /// Bold face.
    pub bold: FontFace,
}

impl FontSet {
    /// Resolve faces: explicit files first, then the system font database.
    ///
    /// When no bold face exists the regular face is reused.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(sources: &FontSources) -> ThumbResult<Self> {
        let mut db: Option<fontdb::Database> = None;
        let mut system = |weight: fontdb::Weight| -> Option<FontFace> {
            let db = db.get_or_insert_with(|| {
                let mut db = fontdb::Database::new();
                db.load_system_fonts();
                tracing::debug!(faces = db.len(), "loaded system fonts");
                db
            });
            system_face(db, weight)
        };

        let regular = match &sources.regular {
            Some(path) => FontFace::from_file(path)?,
            None => system(fontdb::Weight::NORMAL)
                .ok_or_else(|| ThumbError::render("no usable font face found"))?,
        };
        let bold = match &sources.bold {
            Some(path) => FontFace::from_file(path)?,
            None => system(fontdb::Weight::BOLD).unwrap_or_else(|| regular.clone()),
        };

        tracing::debug!(regular = %regular.label, bold = %bold.label, "resolved fonts");
        Ok(Self { regular, bold })
    }
}

fn system_face(db: &fontdb::Database, weight: fontdb::Weight) -> Option<FontFace> {
    let mut families: Vec<fontdb::Family<'_>> = PREFERRED_FAMILIES
        .iter()
        .map(|name| fontdb::Family::Name(name))
        .collect();
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        weight,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))?;
    let label = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "unnamed".to_owned());

    db.with_face_data(id, |data, index| FontFace {
        label,
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<HexColor> for TextBrushRgba8 {
    fn from(c: HexColor) -> Self {
        let [r, g, b, a] = c.to_rgba8();
        Self { r, g, b, a }
    }
}

/// Parley contexts with the regular and bold faces registered once.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular_family: String,
    bold_family: String,
}

impl TextLayoutEngine {
    pub(crate) fn new(fonts: &FontSet) -> ThumbResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let regular_family = register_face(&mut font_ctx, &fonts.regular)?;
        let bold_family = register_face(&mut font_ctx, &fonts.bold)?;
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular_family,
            bold_family,
        })
    }

    /// Shape and wrap plain text at `max_width_px`.
    ///
    /// Lines are left-aligned inside the layout; callers center each line using its advance.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        weight: FontWeight,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
    ) -> ThumbResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ThumbError::render("text size_px must be finite and > 0"));
        }

        let (family, parley_weight) = match weight {
            FontWeight::Regular => (&self.regular_family, parley::style::FontWeight::NORMAL),
            FontWeight::Bold => (&self.bold_family, parley::style::FontWeight::BOLD),
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(parley_weight));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        layout.align(
            Some(max_width_px),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

fn register_face(font_ctx: &mut parley::FontContext, face: &FontFace) -> ThumbResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(face.bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ThumbError::render(format!("font '{}' has no families", face.label)))?;
    Ok(font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ThumbError::render("registered font family has no name"))?
        .to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
