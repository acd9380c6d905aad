use crate::foundation::core::Canvas;
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::layout::solver::LayoutResult;
use crate::render::mask::AlphaMask;
use crate::text::engine::TextEngine;

/// Rasterize the laid-out glyphs as a white silhouette and keep its coverage.
///
/// Every effect layer derives from this one anti-aliased mask.
#[tracing::instrument(level = "debug", skip_all, fields(w = canvas.width, h = canvas.height))]
pub fn rasterize_silhouette(
    engine: &mut TextEngine,
    layout: &LayoutResult,
    canvas: Canvas,
) -> WordArtResult<AlphaMask> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(WordArtError::render("cannot rasterize onto a zero-size canvas"));
    }
    let width = u16::try_from(canvas.width)
        .map_err(|_| WordArtError::render("canvas width exceeds rasterizer limit"))?;
    let height = u16::try_from(canvas.height)
        .map_err(|_| WordArtError::render("canvas height exceeds rasterizer limit"))?;
    if layout.is_empty() {
        return Err(WordArtError::render("layout contains no glyphs to rasterize"));
    }

    let font = engine
        .font_data()
        .cloned()
        .ok_or_else(|| WordArtError::render("text engine has no active font face"))?;

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    ctx.reset();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    for run in layout.runs() {
        if run.text.trim().is_empty() {
            continue;
        }
        let shaped = engine.shape_line(&run.text, run.font_size)?;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            run.anchor.x,
            run.anchor.y,
        )));
        let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        ctx.glyph_run(&font)
            .font_size(run.font_size)
            .fill_glyphs(glyphs);
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    let mask = AlphaMask::from_rgba_alpha(canvas.width, canvas.height, pixmap.data_as_u8_slice())?;

    if mask.is_empty() {
        return Err(WordArtError::render(
            "text produced an empty silhouette (glyphs outside the canvas or missing)",
        ));
    }
    Ok(mask)
}

#[cfg(test)]
#[path = "../../tests/unit/render/silhouette.rs"]
mod tests;
