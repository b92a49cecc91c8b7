use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::store::ImageStore,
    foundation::{
        color::HexColor,
        core::{Affine, Canvas, Point, ResourceHandle, Size},
        error::{ThumbError, ThumbResult},
    },
    render::{
        backend::{FrameRGBA, RenderBackend, RenderSettings},
        layout::{TextBlock, center_offset, cover_transform, gradient_axis, stack_text_blocks},
        plan::{DrawOp, FontWeight, ScenePlan, TextOp},
        text::{FontFace, FontSet, TextBrushRgba8, TextLayoutEngine},
    },
};

/// CPU raster backend.
///
/// Fonts are resolved on the first frame that contains text and kept for the backend's
/// lifetime. Image paints are cached per handle while the handle stays in the [`ImageStore`].
pub struct CpuBackend {
    settings: RenderSettings,
    text: Option<CpuText>,
    image_cache: HashMap<ResourceHandle, ImagePaint>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
}

struct CpuText {
    fonts: FontSet,
    engine: TextLayoutEngine,
    regular: vello_cpu::peniko::FontData,
    bold: vello_cpu::peniko::FontData,
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    start: HexColor,
    end: HexColor,
    w: u32,
    h: u32,
}

impl CpuBackend {
    /// Create a backend; nothing is loaded until the first render.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            text: None,
            image_cache: HashMap::new(),
            gradient_cache: HashMap::new(),
        }
    }

    /// Fonts in use, once the first text op has been drawn.
    pub fn fonts(&self) -> Option<&FontSet> {
        self.text.as_ref().map(|t| &t.fonts)
    }

    fn text(&mut self) -> ThumbResult<&mut CpuText> {
        if self.text.is_none() {
            let fonts = FontSet::resolve(&self.settings.fonts)?;
            let engine = TextLayoutEngine::new(&fonts)?;
            self.text = Some(CpuText {
                regular: font_data(&fonts.regular),
                bold: font_data(&fonts.bold),
                fonts,
                engine,
            });
        }
        self.text
            .as_mut()
            .ok_or_else(|| ThumbError::render("text engine missing"))
    }

    fn image_paint_for(
        &mut self,
        handle: &ResourceHandle,
        images: &ImageStore,
    ) -> ThumbResult<ImagePaint> {
        if let Some(paint) = self.image_cache.get(handle) {
            return Ok(paint.clone());
        }

        let img = images.get(handle)?;
        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: img.width,
            h: img.height,
        };
        self.image_cache.insert(handle.clone(), paint.clone());
        Ok(paint)
    }

    fn gradient_paint(
        &mut self,
        start: HexColor,
        end: HexColor,
        canvas: Canvas,
    ) -> ThumbResult<vello_cpu::Image> {
        let (w, h) = (canvas.width, canvas.height);
        let key = GradientKey { start, end, w, h };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }

        let (p0, p1) = gradient_axis(canvas.size());
        let axis = p1 - p0;
        let len2 = axis.hypot2();
        let start = start.to_rgba8();
        let end = end.to_rgba8();

        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        for y in 0..h {
            for x in 0..w {
                // Sample so the first and last pixel rows land exactly on the stops.
                let p = Point::new(edge_sample(x, w), edge_sample(y, h));
                let t = if len2 <= 0.0 {
                    0.0
                } else {
                    ((p - p0).dot(axis) / len2).clamp(0.0, 1.0)
                };
                let lerp = |a: u8, b: u8| -> u8 {
                    let af = f64::from(a);
                    let bf = f64::from(b);
                    (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
                };
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&[
                    lerp(start[0], end[0]),
                    lerp(start[1], end[1]),
                    lerp(start[2], end[2]),
                    255,
                ]);
            }
        }

        let pixmap = image_premul_bytes_to_pixmap(&bytes, w, h)?;
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.gradient_cache.clear();
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        ops: &[&TextOp],
        canvas: Canvas,
    ) -> ThumbResult<()> {
        let text = self.text()?;
        let max_width = canvas.width as f32;

        let mut layouts = Vec::with_capacity(ops.len());
        for op in ops {
            let layout = text.engine.layout_plain(
                &op.content,
                op.weight,
                op.size_px,
                TextBrushRgba8::from(op.color),
                max_width,
            )?;
            layouts.push(layout);
        }

        let blocks: Vec<TextBlock> = ops
            .iter()
            .zip(&layouts)
            .map(|(op, layout)| TextBlock {
                anchor: op.anchor,
                height: f64::from(layout.height()),
            })
            .collect();
        let tops = stack_text_blocks(f64::from(canvas.height), &blocks);

        for ((op, layout), top) in ops.iter().zip(&layouts).zip(tops) {
            let font = match op.weight {
                FontWeight::Regular => &text.regular,
                FontWeight::Bold => &text.bold,
            };
            for line in layout.lines() {
                // Trailing spaces take no room in the centered line.
                let metrics = line.metrics();
                let visible = (metrics.advance - metrics.trailing_whitespace).max(0.0);
                let dx = center_offset(f64::from(max_width), f64::from(visible));
                ctx.set_transform(affine_to_cpu(Affine::translate((dx, top))));
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            tracing::trace!(layer = ?op.layer, top, lines = layout.lines().count(), "drew text");
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(w = plan.canvas.width, h = plan.canvas.height)
    )]
    fn render_scene(&mut self, plan: &ScenePlan, images: &ImageStore) -> ThumbResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| ThumbError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| ThumbError::render("canvas height exceeds u16"))?;
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height));

        self.image_cache.retain(|h, _| images.contains(h));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut text_ops = Vec::new();
        for op in &plan.ops {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            match op {
                DrawOp::Fill { color } => {
                    let [r, g, b, a] = color.to_rgba8();
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                    ctx.fill_rect(&full);
                }
                DrawOp::LinearGradient { start, end } => {
                    let paint = self.gradient_paint(*start, *end, plan.canvas)?;
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(paint);
                    ctx.fill_rect(&full);
                }
                DrawOp::ImageCover { handle } => {
                    let img = self.image_paint_for(handle, images)?;
                    let t = cover_transform(
                        Size::new(f64::from(img.w), f64::from(img.h)),
                        plan.canvas.size(),
                    );
                    ctx.set_transform(affine_to_cpu(t));
                    ctx.set_paint(img.paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(img.w),
                        f64::from(img.h),
                    ));
                }
                DrawOp::Text(t) => text_ops.push(t),
            }
        }

        if !text_ops.is_empty() {
            self.draw_text(&mut ctx, &text_ops, plan.canvas)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn font_data(face: &FontFace) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
        face.index,
    )
}

fn edge_sample(i: u32, n: u32) -> f64 {
    if n <= 1 {
        0.0
    } else {
        f64::from(i) * f64::from(n) / f64::from(n - 1)
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ThumbResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ThumbError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ThumbError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ThumbError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
