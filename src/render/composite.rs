use crate::foundation::core::{Canvas, Frame};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::layers::RenderLayer;
use crate::render::mask::AlphaMask;

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over of premultiplied pixels, source scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = if opacity.is_nan() {
        0.0
    } else {
        opacity.clamp(0.0, 1.0)
    };
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> WordArtResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(WordArtError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn check_layer(canvas: Canvas, layer: &RenderLayer) -> WordArtResult<()> {
    if layer.width != canvas.width || layer.height != canvas.height {
        return Err(WordArtError::validation(format!(
            "{} layer is {}x{}, canvas is {}x{}",
            layer.role.as_str(),
            layer.width,
            layer.height,
            canvas.width,
            canvas.height
        )));
    }
    if layer.data.len() != canvas.rgba_len() {
        return Err(WordArtError::validation(format!(
            "{} layer buffer does not match its dimensions",
            layer.role.as_str()
        )));
    }
    Ok(())
}

/// Flatten layers in paint order onto a transparent canvas.
fn flatten(canvas: Canvas, layers: &[RenderLayer]) -> WordArtResult<Frame> {
    let mut ordered: Vec<&RenderLayer> = layers.iter().collect();
    ordered.sort_by_key(|l| l.paint_index);

    let mut frame = Frame::transparent(canvas);
    for layer in ordered {
        check_layer(canvas, layer)?;
        over_in_place(&mut frame.data, &layer.data, 1.0)?;
    }
    Ok(frame)
}

/// Composite layers onto a transparent canvas and report the glyph-body coverage.
///
/// The mask is the per-pixel max of the fill, stroke and inner-shadow alphas; shadow and glow are
/// excluded so the mask traces the letters.
#[tracing::instrument(level = "debug", skip(layers), fields(layers = layers.len()))]
pub fn composite_preview(
    canvas: Canvas,
    layers: &[RenderLayer],
) -> WordArtResult<(Frame, AlphaMask)> {
    let frame = flatten(canvas, layers)?;
    let mut mask = AlphaMask::new(canvas);
    for layer in layers.iter().filter(|l| l.role.is_glyph_body()) {
        mask = mask.union(&layer.alpha()?)?;
    }
    Ok((frame, mask))
}

/// Composite layers over `background` as one group faded by `opacity` (clamped to `[0, 1]`).
#[tracing::instrument(level = "debug", skip(background, layers), fields(layers = layers.len()))]
pub fn composite_over(
    background: &Frame,
    layers: &[RenderLayer],
    opacity: f32,
) -> WordArtResult<Frame> {
    let canvas = background.canvas();
    if background.data.len() != canvas.rgba_len() {
        return Err(WordArtError::validation(
            "background buffer does not match its dimensions",
        ));
    }
    let group = flatten(canvas, layers)?;
    let mut out = background.clone();
    over_in_place(&mut out.data, &group.data, opacity)?;
    Ok(out)
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
