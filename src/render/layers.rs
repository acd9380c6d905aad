use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::layout::solver::LayoutResult;
use crate::render::blur::blur_mask;
use crate::render::gradient::{paint_gradient, paint_solid};
use crate::render::mask::AlphaMask;
use crate::render::silhouette::rasterize_silhouette;
use crate::style::model::{
    Glow, InnerShadow, LayerRole, LayerUse, Shadow, Stroke, StyleTemplate,
};
use crate::text::engine::TextEngine;

/// Which effect layers to produce.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum EffectSet {
    /// Every effect the template declares.
    #[default]
    Full,
    /// Shadow, fill and stroke only.
    Reduced,
}

impl EffectSet {
    pub fn includes(self, role: LayerRole) -> bool {
        match self {
            EffectSet::Full => true,
            EffectSet::Reduced => matches!(
                role,
                LayerRole::Shadow | LayerRole::Fill | LayerRole::Stroke
            ),
        }
    }
}

/// One canvas-sized premultiplied RGBA8 image tagged with its blend role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderLayer {
    pub role: LayerRole,
    pub paint_index: usize,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderLayer {
    fn new(role: LayerRole, mask: &AlphaMask, data: Vec<u8>) -> Self {
        Self {
            role,
            paint_index: role.paint_index(),
            width: mask.width,
            height: mask.height,
            data,
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Alpha channel as a coverage mask.
    pub fn alpha(&self) -> WordArtResult<AlphaMask> {
        AlphaMask::from_rgba_alpha(self.width, self.height, &self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Rasterize the layout and derive every effect layer of `template`, in paint order.
#[tracing::instrument(level = "debug", skip_all, fields(style = %template.name, effects = ?effects))]
pub fn render_layers(
    engine: &mut TextEngine,
    layout: &LayoutResult,
    template: &StyleTemplate,
    canvas: Canvas,
    effects: EffectSet,
) -> WordArtResult<Vec<RenderLayer>> {
    let silhouette = rasterize_silhouette(engine, layout, canvas)?;
    build_layers(&silhouette, template, effects)
}

/// Derive effect layers from an already rasterized silhouette.
pub fn build_layers(
    silhouette: &AlphaMask,
    template: &StyleTemplate,
    effects: EffectSet,
) -> WordArtResult<Vec<RenderLayer>> {
    let bbox = silhouette
        .bbox()
        .ok_or_else(|| WordArtError::render("cannot derive layers from an empty silhouette"))?;
    if template.has_custom_order() {
        tracing::debug!(
            style = %template.name,
            "descriptor order differs from paint order; painting canonically"
        );
    }

    let mut layers = Vec::with_capacity(5);
    for layer_use in template.uses() {
        if !effects.includes(layer_use.role()) {
            continue;
        }
        let layer = match &layer_use {
            LayerUse::Shadow(s) => shadow_layer(silhouette, s)?,
            LayerUse::Glow(g) => glow_layer(silhouette, g)?,
            LayerUse::Fill(g) => RenderLayer::new(
                LayerRole::Fill,
                silhouette,
                paint_gradient(silhouette, g, bbox),
            ),
            LayerUse::Stroke(s) => match stroke_layer(silhouette, s, template.stroke_fallback_color())? {
                Some(layer) => layer,
                None => continue,
            },
            LayerUse::InnerShadow(s) => inner_shadow_layer(silhouette, s)?,
        };
        layers.push(layer);
    }
    layers.sort_by_key(|l| l.paint_index);
    Ok(layers)
}

fn shadow_layer(sil: &AlphaMask, shadow: &Shadow) -> WordArtResult<RenderLayer> {
    let moved = sil.translate(shadow.offset.x, shadow.offset.y);
    let blurred = blur_mask(&moved, shadow.blur)?;
    Ok(RenderLayer::new(
        LayerRole::Shadow,
        sil,
        paint_solid(&blurred, shadow.color, 1.0),
    ))
}

fn glow_layer(sil: &AlphaMask, glow: &Glow) -> WordArtResult<RenderLayer> {
    let blurred = blur_mask(sil, glow.blur)?;
    Ok(RenderLayer::new(
        LayerRole::Glow,
        sil,
        paint_solid(&blurred, glow.color, glow.intensity),
    ))
}

fn stroke_layer(
    sil: &AlphaMask,
    stroke: &Stroke,
    fallback: Rgba8,
) -> WordArtResult<Option<RenderLayer>> {
    if !stroke.width.is_finite() || stroke.width <= 0.0 {
        return Ok(None);
    }
    let radius = stroke.width.round().max(1.0) as u32;
    let dilated = sil.dilate(radius);
    let band = dilated.subtract(sil)?;
    let Some(bbox) = dilated.bbox() else {
        return Ok(None);
    };
    let data = match &stroke.gradient {
        Some(g) => paint_gradient(&band, g, bbox),
        None => paint_solid(&band, fallback, 1.0),
    };
    Ok(Some(RenderLayer::new(LayerRole::Stroke, sil, data)))
}

fn inner_shadow_layer(sil: &AlphaMask, inner: &InnerShadow) -> WordArtResult<RenderLayer> {
    let shifted = sil.translate(inner.offset.x, inner.offset.y);
    let edge = sil.subtract(&shifted)?;
    let blurred = blur_mask(&edge, inner.blur)?;
    let inside = blurred.multiply(sil)?;
    Ok(RenderLayer::new(
        LayerRole::InnerShadow,
        sil,
        paint_solid(&inside, inner.color, 1.0),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
