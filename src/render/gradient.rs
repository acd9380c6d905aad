use crate::foundation::core::{Point, Rect, Rgba8};
use crate::render::mask::AlphaMask;
use crate::style::model::Gradient;

/// Paint covered pixels with `gradient` laid over `bbox`; output is premultiplied RGBA8.
pub fn paint_gradient(mask: &AlphaMask, gradient: &Gradient, bbox: Rect) -> Vec<u8> {
    if gradient.is_solid() {
        return paint_solid(mask, gradient.first_color(), 1.0);
    }
    let w = mask.width as usize;
    let mut out = vec![0u8; mask.data.len() * 4];
    for (i, &cov) in mask.data.iter().enumerate() {
        if cov == 0 {
            continue;
        }
        let p = Point::new((i % w) as f64 + 0.5, (i / w) as f64 + 0.5);
        let color = gradient.sample(gradient.axis_param(bbox, p));
        let px = color.premultiply().scale(cov);
        out[i * 4..i * 4 + 4].copy_from_slice(&px.to_array());
    }
    out
}

/// Tint coverage with one color, alpha additionally scaled by `alpha_scale` (saturating).
pub fn paint_solid(mask: &AlphaMask, color: Rgba8, alpha_scale: f32) -> Vec<u8> {
    let scale = if alpha_scale.is_finite() {
        alpha_scale.max(0.0)
    } else {
        0.0
    };
    let base = color.premultiply();
    let mut out = vec![0u8; mask.data.len() * 4];
    for (i, &cov) in mask.data.iter().enumerate() {
        if cov == 0 {
            continue;
        }
        let cov = (f32::from(cov) * scale).round().clamp(0.0, 255.0) as u8;
        out[i * 4..i * 4 + 4].copy_from_slice(&base.scale(cov).to_array());
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
