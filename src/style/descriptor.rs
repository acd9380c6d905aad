//! SVG style descriptors.
//!
//! A descriptor is a small SVG document: one `<text>` element holding the sample text, a set of
//! `<linearGradient>` and `<filter>` definitions, and an ordered list of `<use>` elements that
//! reference the text and attach a fill, a stroke, or a filter to it. Parsing maps every `<use>`
//! into a closed [`LayerUse`] variant and folds them into a [`StyleTemplate`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr as _;

use crate::foundation::core::{Rgba8, Vec2};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::style::model::{
    Glow, Gradient, GradientStop, InnerShadow, LayerUse, SampleText, Shadow, Stroke,
    StyleTemplate,
};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Offsets below this magnitude classify a blurred filter as a glow.
const GLOW_OFFSET_EPS: f64 = 0.5;

/// Largest accepted `stdDeviation`, in pixels.
pub(crate) const MAX_BLUR_STD_DEVIATION: f32 = 128.0;

/// Largest accepted `stroke-width`, in pixels.
pub(crate) const MAX_STROKE_WIDTH: f32 = 128.0;

/// Parse one descriptor document into a template named `name`.
#[tracing::instrument(level = "debug", skip(svg))]
pub fn parse_descriptor(name: &str, svg: &str) -> WordArtResult<StyleTemplate> {
    let doc = roxmltree::Document::parse(svg)
        .map_err(|e| WordArtError::parse(format!("style '{name}': malformed svg: {e}")))?;

    let text_node = doc
        .descendants()
        .find(|n| n.has_tag_name("text"))
        .ok_or_else(|| WordArtError::parse(format!("style '{name}': no <text> element")))?;
    let sample = sample_text(text_node);

    let mut by_id = HashMap::<&str, roxmltree::Node<'_, '_>>::new();
    for n in doc.descendants().filter(|n| n.is_element()) {
        if let Some(id) = n.attribute("id") {
            by_id.insert(id, n);
        }
    }
    let defs = Defs { name, by_id };

    let default_fill = match paint_attr(text_node, "fill") {
        Some(p) => defs.paint(p)?.unwrap_or_else(|| Gradient::solid(Rgba8::BLACK)),
        None => Gradient::solid(Rgba8::BLACK),
    };

    let text_id = text_node.attribute("id");
    let mut uses = Vec::<LayerUse>::new();
    let mut saw_use = false;
    for u in doc.descendants().filter(|n| n.has_tag_name("use")) {
        let target = href(u).and_then(|h| h.strip_prefix('#'));
        if let (Some(target), Some(text_id)) = (target, text_id) {
            if target != text_id {
                tracing::debug!(style = name, target, "skipping <use> of non-text element");
                continue;
            }
        }
        saw_use = true;
        if !defs.collect_use(u, &mut uses)? {
            uses.push(LayerUse::Fill(default_fill.clone()));
        }
    }
    if !saw_use {
        uses.push(LayerUse::Fill(default_fill.clone()));
    }

    let template = StyleTemplate::from_uses(name, sample, default_fill, uses)?;
    if template.has_custom_order() {
        tracing::debug!(
            style = name,
            order = ?template.layer_order,
            "descriptor declares a non-canonical layer order; painting canonically"
        );
    }
    Ok(template)
}

struct Defs<'a, 'input> {
    name: &'a str,
    by_id: HashMap<&'a str, roxmltree::Node<'a, 'input>>,
}

impl<'a, 'input> Defs<'a, 'input> {
    fn lookup(&self, id: &str, what: &str) -> WordArtResult<roxmltree::Node<'a, 'input>> {
        self.by_id.get(id).copied().ok_or_else(|| {
            WordArtError::parse(format!(
                "style '{}': {what} '#{id}' is not defined",
                self.name
            ))
        })
    }

    fn collect_use(
        &self,
        u: roxmltree::Node<'_, '_>,
        out: &mut Vec<LayerUse>,
    ) -> WordArtResult<bool> {
        let mut any = false;

        if let Some(filter) = u.attribute("filter") {
            let id = url_id(filter).ok_or_else(|| {
                WordArtError::parse(format!(
                    "style '{}': bad filter reference '{filter}'",
                    self.name
                ))
            })?;
            out.push(self.filter(id)?);
            any = true;
        }

        let stroke_width = paint_attr(u, "stroke-width")
            .map(|s| parse_length(s, 0.0))
            .unwrap_or(1.0);
        if !stroke_width.is_finite() || stroke_width > MAX_STROKE_WIDTH {
            return Err(WordArtError::parse(format!(
                "style '{}': stroke-width {stroke_width} exceeds {MAX_STROKE_WIDTH}",
                self.name
            )));
        }
        if let Some(stroke) = paint_attr(u, "stroke") {
            if let Some(gradient) = self.paint(stroke)? {
                out.push(LayerUse::Stroke(Stroke {
                    width: stroke_width,
                    gradient: Some(gradient),
                }));
                any = true;
            }
        }

        if let Some(fill) = paint_attr(u, "fill") {
            if let Some(gradient) = self.paint(fill)? {
                // Filtered uses carry a fill only to feed the filter's SourceAlpha.
                if !u.has_attribute("filter") {
                    out.push(LayerUse::Fill(gradient));
                }
            }
            any = true;
        }

        if !any {
            tracing::debug!(style = self.name, "bare <use> treated as default fill");
        }
        Ok(any)
    }

    /// Resolve a paint value. `None` means the paint is `none`.
    fn paint(&self, value: &str) -> WordArtResult<Option<Gradient>> {
        let value = value.trim();
        if value == "none" {
            return Ok(None);
        }
        if let Some(id) = url_id(value) {
            return self.linear_gradient(id).map(Some);
        }
        let color = parse_color(value).ok_or_else(|| {
            WordArtError::parse(format!("style '{}': bad paint '{value}'", self.name))
        })?;
        Ok(Some(Gradient::solid(color)))
    }

    fn linear_gradient(&self, id: &str) -> WordArtResult<Gradient> {
        let node = self.lookup(id, "gradient")?;
        if !node.has_tag_name("linearGradient") {
            return Err(WordArtError::parse(format!(
                "style '{}': '#{id}' is not a linearGradient",
                self.name
            )));
        }

        let coord = |attr: &str, default: f32| -> f32 {
            node.attribute(attr)
                .map(|s| parse_fraction(s, default))
                .unwrap_or(default)
        };
        let (x1, y1, x2, y2) = (
            coord("x1", 0.0),
            coord("y1", 0.0),
            coord("x2", 1.0),
            coord("y2", 0.0),
        );

        // Stops may be inherited through href chains.
        let mut src = node;
        let mut hops = 0;
        while !src.children().any(|c| c.has_tag_name("stop")) {
            let Some(next) = href(src).and_then(|h| h.strip_prefix('#')) else {
                break;
            };
            hops += 1;
            if hops > 8 {
                return Err(WordArtError::parse(format!(
                    "style '{}': gradient href chain too deep at '#{id}'",
                    self.name
                )));
            }
            src = self.lookup(next, "gradient")?;
        }

        let stops = src
            .children()
            .filter(|c| c.has_tag_name("stop"))
            .map(|s| {
                let offset = paint_attr(s, "offset")
                    .map(|v| parse_fraction(v, 0.0))
                    .unwrap_or(0.0);
                let color = paint_attr(s, "stop-color")
                    .and_then(parse_color)
                    .unwrap_or(Rgba8::BLACK);
                let opacity = paint_attr(s, "stop-opacity")
                    .map(|v| parse_fraction(v, 1.0))
                    .unwrap_or(1.0);
                GradientStop {
                    offset,
                    color: color.with_opacity(opacity),
                }
            })
            .collect::<Vec<_>>();

        Gradient::new(x1, y1, x2, y2, stops)
            .map_err(|e| WordArtError::parse(format!("style '{}': '#{id}': {e}", self.name)))
    }

    fn filter(&self, id: &str) -> WordArtResult<LayerUse> {
        let node = self.lookup(id, "filter")?;
        let missing = |what: &str| {
            WordArtError::parse(format!(
                "style '{}': filter '#{id}' has no {what}",
                self.name
            ))
        };

        let mut offset: Option<Vec2> = None;
        let mut blur: Option<f32> = None;
        let mut color: Option<Rgba8> = None;
        let mut carves = false;

        for p in node.children().filter(|c| c.is_element()) {
            match p.tag_name().name() {
                "feOffset" => {
                    let dx = p.attribute("dx").map(|s| parse_length(s, 0.0)).unwrap_or(0.0);
                    let dy = p.attribute("dy").map(|s| parse_length(s, 0.0)).unwrap_or(0.0);
                    offset = Some(Vec2::new(f64::from(dx), f64::from(dy)));
                }
                "feGaussianBlur" => {
                    blur = p
                        .attribute("stdDeviation")
                        .and_then(|s| numbers(s).into_iter().reduce(f32::max));
                }
                "feColorMatrix" => {
                    if let Some(c) = p.attribute("values").and_then(matrix_color) {
                        color = Some(c);
                    }
                }
                "feFlood" => {
                    let c = paint_attr(p, "flood-color")
                        .and_then(parse_color)
                        .unwrap_or(Rgba8::BLACK);
                    let o = paint_attr(p, "flood-opacity")
                        .map(|v| parse_fraction(v, 1.0))
                        .unwrap_or(1.0);
                    color = Some(c.with_opacity(o));
                }
                "feComposite" => carves |= is_carving_composite(p),
                _ => {}
            }
        }

        let color = color.ok_or_else(|| missing("color"))?;
        if let Some(b) = blur
            && (!b.is_finite() || b > MAX_BLUR_STD_DEVIATION)
        {
            return Err(WordArtError::parse(format!(
                "style '{}': filter '{id}' stdDeviation {b} exceeds {MAX_BLUR_STD_DEVIATION}",
                self.name
            )));
        }

        if carves {
            let offset = offset.ok_or_else(|| missing("offset"))?;
            let blur = blur.ok_or_else(|| missing("blur"))?;
            return Ok(LayerUse::InnerShadow(InnerShadow {
                offset,
                blur,
                color,
            }));
        }

        match offset {
            Some(o) if o.x.abs() >= GLOW_OFFSET_EPS || o.y.abs() >= GLOW_OFFSET_EPS => {
                let blur = blur.ok_or_else(|| missing("blur"))?;
                Ok(LayerUse::Shadow(Shadow {
                    offset: o,
                    blur,
                    color,
                }))
            }
            _ => {
                let blur = blur.ok_or_else(|| missing("blur or offset"))?;
                let intensity = node
                    .attribute("data-intensity")
                    .and_then(|s| s.trim().parse::<f32>().ok())
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .unwrap_or(1.0);
                Ok(LayerUse::Glow(Glow {
                    blur,
                    color,
                    intensity,
                }))
            }
        }
    }
}

/// `arithmetic` with `k2 = -1, k3 = 1` (or the mirrored pair), or an `out` composite with the
/// source alpha on either side.
fn is_carving_composite(p: roxmltree::Node<'_, '_>) -> bool {
    let k = |name: &str| {
        p.attribute(name)
            .and_then(|s| s.trim().parse::<f32>().ok())
            .unwrap_or(0.0)
    };
    match p.attribute("operator") {
        Some("arithmetic") => {
            ((k("k2") + 1.0).abs() < 1e-3 && (k("k3") - 1.0).abs() < 1e-3)
                || ((k("k2") - 1.0).abs() < 1e-3 && (k("k3") + 1.0).abs() < 1e-3)
        }
        Some("out") => {
            p.attribute("in") == Some("SourceAlpha") || p.attribute("in2") == Some("SourceAlpha")
        }
        _ => false,
    }
}

fn sample_text(node: roxmltree::Node<'_, '_>) -> SampleText {
    let spans = node
        .children()
        .filter(|c| c.has_tag_name("tspan"))
        .map(|c| collect_text(c).trim().to_string())
        .collect::<Vec<_>>();
    let text = if spans.is_empty() {
        collect_text(node).trim().to_string()
    } else {
        spans.join("\n")
    };

    let defaults = SampleText::default();
    SampleText {
        text,
        font_family: paint_attr(node, "font-family").and_then(clean_font_family),
        font_size: paint_attr(node, "font-size")
            .map(|s| parse_length(s, defaults.font_size))
            .filter(|v| *v > 0.0)
            .unwrap_or(defaults.font_size),
        font_weight: paint_attr(node, "font-weight")
            .map(parse_font_weight)
            .unwrap_or(defaults.font_weight),
    }
}

fn collect_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// First family of a font-family list, unquoted, with a trailing style suffix removed.
/// Generic families yield `None`.
pub(crate) fn clean_font_family(raw: &str) -> Option<String> {
    let first = raw.split(',').next()?.trim().trim_matches(|c| c == '"' || c == '\'');
    if first.is_empty() {
        return None;
    }
    let generic = [
        "serif",
        "sans-serif",
        "monospace",
        "cursive",
        "fantasy",
        "system-ui",
    ];
    if generic.contains(&first.to_ascii_lowercase().as_str()) {
        return None;
    }
    let mut family = first;
    for suffix in ["-Regular", "-Bold", "-Italic", "-Light", "-Medium"] {
        if let Some(stripped) = family.strip_suffix(suffix) {
            family = stripped;
            break;
        }
    }
    Some(family.to_string())
}

fn parse_font_weight(s: &str) -> u16 {
    match s.trim() {
        "bold" | "bolder" => 700,
        "lighter" => 300,
        "normal" => 400,
        other => other
            .parse::<u16>()
            .ok()
            .filter(|w| (1..=1000).contains(w))
            .unwrap_or(400),
    }
}

/// Attribute lookup that also consults the inline `style` declarations, which win.
fn paint_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    if let Some(style) = node.attribute("style") {
        for decl in style.split(';') {
            let Some((k, v)) = decl.split_once(':') else {
                continue;
            };
            if k.trim() == name {
                return Some(v.trim());
            }
        }
    }
    node.attribute(name)
}

fn href<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XLINK_NS, "href"))
        .or_else(|| node.attribute("href"))
}

fn url_id(value: &str) -> Option<&str> {
    svgtypes::FuncIRI::from_str(value.trim())
        .ok()
        .map(|iri| iri.0)
}

fn parse_color(value: &str) -> Option<Rgba8> {
    svgtypes::Color::from_str(value.trim())
        .ok()
        .map(|c| Rgba8::new(c.red, c.green, c.blue, c.alpha))
}

/// Number or percentage mapped onto a unit fraction (`"50%"` and `"0.5"` both give `0.5`).
fn parse_fraction(value: &str, default: f32) -> f32 {
    match svgtypes::Length::from_str(value.trim()) {
        Ok(len) if len.unit == svgtypes::LengthUnit::Percent => (len.number / 100.0) as f32,
        Ok(len) => len.number as f32,
        Err(_) => default,
    }
}

/// Plain length in user units; absolute units other than px are taken at face value.
fn parse_length(value: &str, default: f32) -> f32 {
    svgtypes::Length::from_str(value.trim())
        .map(|len| len.number as f32)
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn numbers(value: &str) -> Vec<f32> {
    svgtypes::NumberListParser::from(value)
        .filter_map(Result::ok)
        .map(|v| v as f32)
        .collect()
}

/// Color carried by the constant column of a 5x4 color matrix.
fn matrix_color(values: &str) -> Option<Rgba8> {
    let v = numbers(values);
    if v.len() != 20 {
        return None;
    }
    let channel = |x: f32| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    let alpha = if v[18] != 0.0 { v[18] } else { v[19] };
    Some(Rgba8::new(
        channel(v[4]),
        channel(v[9]),
        channel(v[14]),
        channel(alpha),
    ))
}

/// Serialize a template back into a descriptor the parser accepts.
pub fn write_descriptor(t: &StyleTemplate) -> String {
    let mut svg = String::new();
    let sample = &t.sample;
    let text = if sample.text.is_empty() {
        t.name.as_str()
    } else {
        sample.text.as_str()
    };

    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg width="800px" height="450px" viewBox="0 0 800 450" version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#
    );
    let _ = writeln!(svg, "    <title>{}</title>", xml_escape(&t.name));
    let _ = writeln!(svg, "    <defs>");

    let family = sample.font_family.as_deref().unwrap_or("sans-serif");
    let _ = writeln!(
        svg,
        r#"        <text id="text-main" font-family="{}" font-size="{}" font-weight="{}">"#,
        xml_escape(family),
        sample.font_size,
        sample.font_weight
    );
    for line in text.split('\n') {
        let _ = writeln!(
            svg,
            r#"            <tspan x="400" y="225" text-anchor="middle">{}</tspan>"#,
            xml_escape(line)
        );
    }
    let _ = writeln!(svg, "        </text>");

    write_gradient(&mut svg, "fillGradient", &t.fill);
    if let Some(g) = t.stroke.as_ref().and_then(|s| s.gradient.as_ref()) {
        write_gradient(&mut svg, "strokeGradient", g);
    }
    if let Some(s) = t.shadow {
        let _ = writeln!(svg, r#"        <filter id="shadow-filter">"#);
        write_offset(&mut svg, s.offset);
        write_blur(&mut svg, s.blur);
        write_matrix(&mut svg, s.color);
        let _ = writeln!(svg, "        </filter>");
    }
    if let Some(g) = t.glow {
        let _ = writeln!(
            svg,
            r#"        <filter id="glow-filter" data-intensity="{}">"#,
            g.intensity
        );
        write_blur(&mut svg, g.blur);
        write_matrix(&mut svg, g.color);
        let _ = writeln!(svg, "        </filter>");
    }
    if let Some(s) = t.inner_shadow {
        let _ = writeln!(svg, r#"        <filter id="inner-shadow-filter">"#);
        write_offset(&mut svg, s.offset);
        let _ = writeln!(
            svg,
            r#"            <feComposite in="offset" in2="SourceAlpha" operator="arithmetic" k2="-1" k3="1" result="difference"/>"#
        );
        write_blur(&mut svg, s.blur);
        write_matrix(&mut svg, s.color);
        let _ = writeln!(svg, "        </filter>");
    }
    let _ = writeln!(svg, "    </defs>");

    let _ = writeln!(svg, "    <g>");
    if t.shadow.is_some() {
        let _ = writeln!(
            svg,
            r##"        <use filter="url(#shadow-filter)" xlink:href="#text-main"/>"##
        );
    }
    if t.glow.is_some() {
        let _ = writeln!(
            svg,
            r##"        <use filter="url(#glow-filter)" xlink:href="#text-main"/>"##
        );
    }
    let _ = writeln!(
        svg,
        r##"        <use fill="url(#fillGradient)" xlink:href="#text-main"/>"##
    );
    if let Some(s) = &t.stroke {
        let paint = match &s.gradient {
            Some(_) => "url(#strokeGradient)".to_string(),
            None => t.stroke_fallback_color().to_hex(),
        };
        let _ = writeln!(
            svg,
            r##"        <use fill="none" stroke="{paint}" stroke-width="{}" xlink:href="#text-main"/>"##,
            s.width
        );
    }
    if t.inner_shadow.is_some() {
        let _ = writeln!(
            svg,
            r##"        <use filter="url(#inner-shadow-filter)" xlink:href="#text-main"/>"##
        );
    }
    let _ = writeln!(svg, "    </g>");
    let _ = writeln!(svg, "</svg>");
    svg
}

fn write_gradient(svg: &mut String, id: &str, g: &Gradient) {
    let _ = writeln!(
        svg,
        r#"        <linearGradient id="{id}" x1="{}%" y1="{}%" x2="{}%" y2="{}%">"#,
        g.x1 * 100.0,
        g.y1 * 100.0,
        g.x2 * 100.0,
        g.y2 * 100.0
    );
    for s in g.stops() {
        let _ = writeln!(
            svg,
            r#"            <stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
            s.offset,
            s.color.to_hex(),
            f32::from(s.color.a) / 255.0
        );
    }
    let _ = writeln!(svg, "        </linearGradient>");
}

fn write_offset(svg: &mut String, o: Vec2) {
    let _ = writeln!(
        svg,
        r#"            <feOffset dx="{}" dy="{}" in="SourceAlpha" result="offset"/>"#,
        o.x, o.y
    );
}

fn write_blur(svg: &mut String, sigma: f32) {
    let _ = writeln!(
        svg,
        r#"            <feGaussianBlur stdDeviation="{sigma}" result="blur"/>"#
    );
}

fn write_matrix(svg: &mut String, c: Rgba8) {
    let n = |v: u8| f32::from(v) / 255.0;
    let _ = writeln!(
        svg,
        r#"            <feColorMatrix type="matrix" values="0 0 0 0 {}  0 0 0 0 {}  0 0 0 0 {}  0 0 0 {} 0"/>"#,
        n(c.r),
        n(c.g),
        n(c.b),
        n(c.a)
    );
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "../../tests/unit/style/descriptor.rs"]
mod tests;
