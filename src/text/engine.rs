use std::collections::HashMap;

use crate::foundation::error::{WordArtError, WordArtResult};
use crate::text::fonts::FontFace;

/// Horizontal advance and vertical extent of one shaped line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl LineMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Line measurement seam used by the layout solver.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, font_size: f32) -> WordArtResult<LineMetrics>;
}

/// A glyph positioned relative to the line's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub metrics: LineMetrics,
}

/// Brush type for silhouette layouts; color is applied by the rasterizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SilhouetteBrush;

struct LoadedFace {
    family: String,
    /// Engine-private family name the face is registered under.
    alias: String,
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    width: parley::style::FontWidth,
    font: vello_cpu::peniko::FontData,
}

/// Stateful parley shaper bound to one active face at a time.
///
/// Holds mutable shaping contexts and a measurement cache, so one engine is owned per thread.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<SilhouetteBrush>,
    faces: HashMap<String, LoadedFace>,
    active: Option<String>,
    measured: HashMap<(String, String, u32), LineMetrics>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
            active: None,
            measured: HashMap::new(),
        }
    }

    /// Make `face` the face used by subsequent shaping calls, registering it on first use.
    ///
    /// Each face gets its own family alias, so faces sharing a family name (regular and bold of
    /// one family) never resolve to each other during shaping.
    pub fn set_face(&mut self, face: &FontFace) -> WordArtResult<()> {
        let key = face.cache_key();
        if !self.faces.contains_key(&key) {
            let alias = format!("wordart-face-{}", self.faces.len());
            let registered = self.font_ctx.collection.register_fonts(
                parley::fontique::Blob::from(face.data.as_ref().clone()),
                Some(parley::fontique::FontInfoOverride {
                    family_name: Some(alias.as_str()),
                    ..Default::default()
                }),
            );
            let info = registered
                .iter()
                .flat_map(|(_, infos)| infos.iter())
                .find(|info| info.index() == face.index)
                .ok_or_else(|| {
                    WordArtError::render(format!(
                        "face {} of '{}' did not register",
                        face.index, face.family
                    ))
                })?;
            let loaded = LoadedFace {
                family: face.family.clone(),
                alias,
                weight: info.weight(),
                style: info.style(),
                width: info.width(),
                font: vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
                    face.index,
                ),
            };
            tracing::debug!(
                family = %loaded.family,
                alias = %loaded.alias,
                weight = loaded.weight.value(),
                "registered font face"
            );
            self.faces.insert(key.clone(), loaded);
        }
        self.active = Some(key);
        Ok(())
    }

    /// Family name of the active face.
    pub fn family(&self) -> Option<&str> {
        self.active_face().map(|f| f.family.as_str())
    }

    /// Font data of the active face for glyph rasterization.
    pub fn font_data(&self) -> Option<&vello_cpu::peniko::FontData> {
        self.active_face().map(|f| &f.font)
    }

    fn active_face(&self) -> Option<&LoadedFace> {
        self.active.as_ref().and_then(|k| self.faces.get(k))
    }

    fn build(&mut self, text: &str, font_size: f32) -> WordArtResult<parley::Layout<SilhouetteBrush>> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(WordArtError::layout("font size must be finite and > 0"));
        }
        let (alias, weight, style, width) = self
            .active_face()
            .map(|f| (f.alias.clone(), f.weight, f.style, f.width))
            .ok_or_else(|| WordArtError::render("text engine has no active font face"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(alias)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(style));
        builder.push_default(parley::style::StyleProperty::FontWidth(width));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size));
        builder.push_default(parley::style::StyleProperty::Brush(SilhouetteBrush));

        let mut layout: parley::Layout<SilhouetteBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Shape one line (no wrapping) at `font_size`.
    pub fn shape_line(&mut self, text: &str, font_size: f32) -> WordArtResult<ShapedLine> {
        // Blank lines still need vertical metrics.
        let probe = if text.trim().is_empty() { " " } else { text };
        let layout = self.build(probe, font_size)?;

        let mut glyphs = Vec::new();
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        if let Some(line) = layout.lines().next() {
            let m = line.metrics();
            ascent = m.ascent;
            descent = m.descent;
            let top = m.baseline - m.ascent;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| ShapedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - top,
                }));
            }
        }
        let width = if text.trim().is_empty() {
            0.0
        } else {
            layout.width()
        };
        Ok(ShapedLine {
            glyphs,
            metrics: LineMetrics {
                width,
                ascent,
                descent,
            },
        })
    }
}

impl TextMeasure for TextEngine {
    fn measure(&mut self, text: &str, font_size: f32) -> WordArtResult<LineMetrics> {
        let face = self.active.clone().unwrap_or_default();
        let key = (face, text.to_string(), font_size.to_bits());
        if let Some(m) = self.measured.get(&key) {
            return Ok(*m);
        }
        let m = self.shape_line(text, font_size)?.metrics;
        self.measured.insert(key, m);
        Ok(m)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
