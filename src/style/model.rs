use crate::foundation::core::{Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{WordArtError, WordArtResult};

/// One color stop of a linear gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the gradient axis, in `[0, 1]`.
    pub offset: f32,
    /// Straight-alpha stop color (`stop-opacity` already folded into alpha).
    pub color: Rgba8,
}

/// A linear gradient whose axis is expressed in bounding-box fractions.
///
/// `(x1, y1) -> (x2, y2)` are relative to whatever box the gradient is applied to, so orientation
/// follows the text geometry rather than the canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gradient {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a gradient, normalizing stops so offsets are clamped, non-decreasing, and span
    /// exactly `0..=1` with at least two entries.
    pub fn new(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stops: Vec<GradientStop>,
    ) -> WordArtResult<Self> {
        for v in [x1, y1, x2, y2] {
            if !v.is_finite() {
                return Err(WordArtError::parse("gradient coordinates must be finite"));
            }
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            stops: normalize_stops(stops)?,
        })
    }

    /// Left-to-right horizontal gradient (the SVG default axis).
    pub fn horizontal(stops: Vec<GradientStop>) -> WordArtResult<Self> {
        Self::new(0.0, 0.0, 1.0, 0.0, stops)
    }

    /// A uniform two-stop gradient.
    pub fn solid(color: Rgba8) -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 0.0,
            stops: vec![
                GradientStop { offset: 0.0, color },
                GradientStop { offset: 1.0, color },
            ],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn first_color(&self) -> Rgba8 {
        self.stops[0].color
    }

    pub fn is_solid(&self) -> bool {
        self.stops.windows(2).all(|w| w[0].color == w[1].color)
    }

    /// Color at axis parameter `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f32) -> Rgba8 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mut prev = self.stops[0];
        for &stop in &self.stops[1..] {
            if t <= stop.offset {
                let span = stop.offset - prev.offset;
                if span <= f32::EPSILON {
                    return stop.color;
                }
                return prev.color.lerp(stop.color, (t - prev.offset) / span);
            }
            prev = stop;
        }
        prev.color
    }

    /// Project a point onto the gradient axis laid over `bbox`, returning the axis parameter.
    pub fn axis_param(&self, bbox: Rect, p: Point) -> f32 {
        let start = Point::new(
            bbox.x0 + f64::from(self.x1) * bbox.width(),
            bbox.y0 + f64::from(self.y1) * bbox.height(),
        );
        let end = Point::new(
            bbox.x0 + f64::from(self.x2) * bbox.width(),
            bbox.y0 + f64::from(self.y2) * bbox.height(),
        );
        let axis = end - start;
        let len2 = axis.hypot2();
        if len2 <= f64::EPSILON {
            return 0.0;
        }
        ((p - start).dot(axis) / len2) as f32
    }
}

fn normalize_stops(mut stops: Vec<GradientStop>) -> WordArtResult<Vec<GradientStop>> {
    if stops.is_empty() {
        return Err(WordArtError::parse("gradient has no stops"));
    }

    let mut floor = 0.0f32;
    for s in &mut stops {
        let o = if s.offset.is_finite() { s.offset } else { 0.0 };
        s.offset = o.clamp(0.0, 1.0).max(floor);
        floor = s.offset;
    }

    if stops[0].offset > 0.0 {
        let first = stops[0];
        stops.insert(
            0,
            GradientStop {
                offset: 0.0,
                color: first.color,
            },
        );
    }
    let last = stops[stops.len() - 1];
    if last.offset < 1.0 || stops.len() == 1 {
        stops.push(GradientStop {
            offset: 1.0,
            color: last.color,
        });
    }
    Ok(stops)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Band width in pixels outside the glyph edge.
    pub width: f32,
    /// `None` paints the band with the first fill stop.
    pub gradient: Option<Gradient>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shadow {
    pub offset: Vec2,
    /// Gaussian standard deviation in pixels.
    pub blur: f32,
    pub color: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InnerShadow {
    pub offset: Vec2,
    pub blur: f32,
    pub color: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Glow {
    pub blur: f32,
    pub color: Rgba8,
    /// Alpha multiplier applied after blurring.
    pub intensity: f32,
}

/// Sample text and font metadata carried by a descriptor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampleText {
    pub text: String,
    pub font_family: Option<String>,
    pub font_size: f32,
    pub font_weight: u16,
}

impl Default for SampleText {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: None,
            font_size: 72.0,
            font_weight: 400,
        }
    }
}

/// Blend role of a rendered layer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum LayerRole {
    Shadow,
    Glow,
    Fill,
    Stroke,
    InnerShadow,
}

impl LayerRole {
    /// Canonical paint order.
    pub const PAINT_ORDER: [LayerRole; 5] = [
        LayerRole::Shadow,
        LayerRole::Glow,
        LayerRole::Fill,
        LayerRole::Stroke,
        LayerRole::InnerShadow,
    ];

    pub fn paint_index(self) -> usize {
        match self {
            LayerRole::Shadow => 0,
            LayerRole::Glow => 1,
            LayerRole::Fill => 2,
            LayerRole::Stroke => 3,
            LayerRole::InnerShadow => 4,
        }
    }

    /// Roles whose coverage belongs to the glyph itself (used for preview masks).
    pub fn is_glyph_body(self) -> bool {
        matches!(
            self,
            LayerRole::Fill | LayerRole::Stroke | LayerRole::InnerShadow
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerRole::Shadow => "shadow",
            LayerRole::Glow => "glow",
            LayerRole::Fill => "fill",
            LayerRole::Stroke => "stroke",
            LayerRole::InnerShadow => "inner-shadow",
        }
    }
}

/// One resolved `<use>` of the text geometry, carrying only what its role needs.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerUse {
    Shadow(Shadow),
    Glow(Glow),
    Fill(Gradient),
    Stroke(Stroke),
    InnerShadow(InnerShadow),
}

impl LayerUse {
    pub fn role(&self) -> LayerRole {
        match self {
            LayerUse::Shadow(_) => LayerRole::Shadow,
            LayerUse::Glow(_) => LayerRole::Glow,
            LayerUse::Fill(_) => LayerRole::Fill,
            LayerUse::Stroke(_) => LayerRole::Stroke,
            LayerUse::InnerShadow(_) => LayerRole::InnerShadow,
        }
    }
}

/// Immutable bundle of gradients and effect parameters defining one look.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyleTemplate {
    pub name: String,
    pub fill: Gradient,
    pub stroke: Option<Stroke>,
    pub shadow: Option<Shadow>,
    pub inner_shadow: Option<InnerShadow>,
    pub glow: Option<Glow>,
    pub sample: SampleText,
    /// Roles in the order the descriptor declared them.
    pub layer_order: Vec<LayerRole>,
}

impl StyleTemplate {
    /// Fold a sequence of layer uses into a template.
    ///
    /// Two different fill gradients or two different strokes are ambiguous and rejected. Repeated
    /// effects keep the first declaration.
    pub fn from_uses(
        name: impl Into<String>,
        sample: SampleText,
        default_fill: Gradient,
        uses: Vec<LayerUse>,
    ) -> WordArtResult<Self> {
        let name = name.into();
        let mut fill: Option<Gradient> = None;
        let mut stroke: Option<Stroke> = None;
        let mut shadow = None;
        let mut inner_shadow = None;
        let mut glow = None;
        let mut layer_order = Vec::<LayerRole>::new();

        for u in uses {
            let role = u.role();
            if !layer_order.contains(&role) {
                layer_order.push(role);
            }
            match u {
                LayerUse::Fill(g) => match &fill {
                    Some(prev) if *prev != g => {
                        return Err(WordArtError::parse(format!(
                            "style '{name}' uses more than one fill gradient"
                        )));
                    }
                    _ => fill = Some(g),
                },
                LayerUse::Stroke(s) => match &stroke {
                    Some(prev) if *prev != s => {
                        return Err(WordArtError::parse(format!(
                            "style '{name}' uses more than one stroke"
                        )));
                    }
                    _ => stroke = Some(s),
                },
                LayerUse::Shadow(s) => {
                    shadow.get_or_insert(s);
                }
                LayerUse::InnerShadow(s) => {
                    inner_shadow.get_or_insert(s);
                }
                LayerUse::Glow(g) => {
                    glow.get_or_insert(g);
                }
            }
        }

        Ok(Self {
            name,
            fill: fill.unwrap_or(default_fill),
            stroke: stroke.filter(|s| s.width > 0.0),
            shadow,
            inner_shadow,
            glow,
            sample,
            layer_order,
        })
    }

    /// Resolved uses in canonical paint order.
    pub fn uses(&self) -> Vec<LayerUse> {
        let mut out = Vec::with_capacity(5);
        if let Some(s) = self.shadow {
            out.push(LayerUse::Shadow(s));
        }
        if let Some(g) = self.glow {
            out.push(LayerUse::Glow(g));
        }
        out.push(LayerUse::Fill(self.fill.clone()));
        if let Some(s) = &self.stroke {
            out.push(LayerUse::Stroke(s.clone()));
        }
        if let Some(s) = self.inner_shadow {
            out.push(LayerUse::InnerShadow(s));
        }
        out
    }

    /// Whether the declared order differs from the canonical paint order.
    pub fn has_custom_order(&self) -> bool {
        self.layer_order
            .windows(2)
            .any(|w| w[0].paint_index() > w[1].paint_index())
    }

    /// Color used for strokes without their own gradient.
    pub fn stroke_fallback_color(&self) -> Rgba8 {
        self.fill.first_color()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/model.rs"]
mod tests;
