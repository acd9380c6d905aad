use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Frame, Seed};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::foundation::math::Rng64;
use crate::layout::solver::{FitOptions, LayoutRequest, LayoutResult, Margins, solve_layout};
use crate::render::composite::{composite_over, composite_preview};
use crate::render::layers::{EffectSet, render_layers};
use crate::render::mask::AlphaMask;
use crate::select::color::dominant_color;
use crate::select::mapping::{ColorStyleMapping, select_style};
use crate::style::model::StyleTemplate;
use crate::style::registry::{LoadReport, StyleRegistry};
use crate::text::engine::TextEngine;
use crate::text::fonts::{FontFace, FontLibrary};

/// Shared read-only state for render calls: styles, fonts and the color mapping.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    pub registry: StyleRegistry,
    pub fonts: FontLibrary,
    pub mapping: ColorStyleMapping,
}

/// Where [`RenderContext::load`] looks for its inputs.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContextPaths {
    pub styles_dir: PathBuf,
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    /// Color mapping JSON; absent files leave color matching unfiltered.
    pub mapping: Option<PathBuf>,
}

impl RenderContext {
    pub fn new(registry: StyleRegistry, fonts: FontLibrary, mapping: ColorStyleMapping) -> Self {
        Self {
            registry,
            fonts,
            mapping,
        }
    }

    /// Build a context from disk. Descriptors that fail to parse are reported, not fatal.
    #[tracing::instrument(level = "info", skip_all, fields(styles = %paths.styles_dir.display()))]
    pub fn load(paths: &ContextPaths) -> WordArtResult<(Self, LoadReport)> {
        let (registry, report) = StyleRegistry::load_dir(&paths.styles_dir)?;
        let fonts = FontLibrary::load(&paths.font_dirs);
        let mapping = paths
            .mapping
            .as_deref()
            .map(ColorStyleMapping::load_or_default)
            .unwrap_or_default();
        Ok((Self::new(registry, fonts, mapping), report))
    }
}

/// How the style of a request is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StyleSelector {
    /// A registry name; unknown names fall back to a seeded random pick.
    Named(String),
    #[default]
    Random,
    /// Pick by the background's dominant color (previews have none and pick at random).
    ColorMatch,
}

impl StyleSelector {
    /// `"random"` and `"auto"`/`"color"` are keywords; anything else names a style.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "random" => StyleSelector::Random,
            "auto" | "color" | "color-match" => StyleSelector::ColorMatch,
            name => StyleSelector::Named(name.to_owned()),
        }
    }
}

/// How the face is chosen for a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontChoice {
    /// The style's own family when installed, otherwise a common sans face.
    #[default]
    Auto,
    /// A seeded pick among installed families.
    Random,
    /// This family when installed, otherwise the same fallback as `Auto`.
    Family(String),
}

/// How a preview's seed evolves between consecutive runs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum SeedMode {
    Fixed,
    #[default]
    Random,
    Increment,
    Decrement,
}

impl SeedMode {
    /// Seed to use for the next run given the previous one. Zero always means "draw fresh".
    pub fn next(self, previous: u64) -> Seed {
        let seed = match self {
            SeedMode::Random => 0,
            SeedMode::Fixed => previous,
            SeedMode::Increment if previous == 0 => 0,
            SeedMode::Increment => previous.wrapping_add(1).max(1),
            SeedMode::Decrement if previous == 0 => 0,
            SeedMode::Decrement => previous.saturating_sub(1).max(1),
        };
        Seed(seed)
    }
}

#[derive(Clone, Debug)]
pub struct RenderRequest<'a> {
    pub background: &'a image::RgbaImage,
    pub text: &'a str,
    pub style: StyleSelector,
    pub margins: Margins,
    /// Group opacity of the whole text block.
    pub opacity: f32,
    pub seed: Seed,
    pub font_size: Option<f32>,
    pub effects: EffectSet,
    pub fit: FitOptions,
    pub font: FontChoice,
}

impl<'a> RenderRequest<'a> {
    pub fn new(background: &'a image::RgbaImage, text: &'a str) -> Self {
        Self {
            background,
            text,
            style: StyleSelector::Random,
            margins: Margins::default(),
            opacity: 1.0,
            seed: Seed(0),
            font_size: None,
            effects: EffectSet::Full,
            fit: FitOptions::default(),
            font: FontChoice::Auto,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Premultiplied composite, same size as the background.
    pub frame: Frame,
    pub style_name: String,
    pub font_size: f32,
    pub layout: LayoutResult,
    /// The resolved seed; replaying it reproduces this output.
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct PreviewRequest<'a> {
    pub text: &'a str,
    pub style: StyleSelector,
    pub width: u32,
    pub height: u32,
    pub seed: Seed,
    pub margins: Margins,
    pub effects: EffectSet,
    pub font_size: Option<f32>,
    pub fit: FitOptions,
    pub font: FontChoice,
}

impl<'a> PreviewRequest<'a> {
    pub fn new(text: &'a str, width: u32, height: u32) -> Self {
        Self {
            text,
            style: StyleSelector::Random,
            width,
            height,
            seed: Seed(0),
            margins: Margins::default(),
            effects: EffectSet::Full,
            font_size: None,
            fit: FitOptions::default(),
            font: FontChoice::Auto,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PreviewOutput {
    /// Premultiplied text on a transparent canvas.
    pub frame: Frame,
    /// Glyph-body coverage (fill, stroke, inner shadow).
    pub mask: AlphaMask,
    pub style_name: String,
    pub font_size: f32,
    pub seed: u64,
}

/// Lay out and composite `req.text` over the background.
#[tracing::instrument(level = "info", skip_all, fields(w = req.background.width(), h = req.background.height()))]
pub fn render_full(
    ctx: &RenderContext,
    engine: &mut TextEngine,
    req: &RenderRequest<'_>,
) -> WordArtResult<RenderOutput> {
    let canvas = Canvas::new(req.background.width(), req.background.height())?;
    let seed = req.seed.resolve();
    let mut rng = Rng64::new(seed);

    let template = match &req.style {
        StyleSelector::ColorMatch => {
            let dominant = dominant_color(req.background)?;
            select_style(&ctx.registry, &ctx.mapping, dominant.bucket, &mut rng)
                .ok_or_else(|| WordArtError::style_not_found("registry is empty"))?
        }
        other => resolve_style(&ctx.registry, other, &mut rng)?,
    };
    let face = choose_font(&ctx.fonts, &template, &req.font, &mut rng)?;
    engine.set_face(&face)?;

    let layout = solve_layout(
        engine,
        &LayoutRequest {
            text: req.text,
            canvas,
            margins: req.margins,
            font_size: req.font_size,
            options: req.fit,
        },
    )?;
    let layers = render_layers(engine, &layout, &template, canvas, req.effects)?;
    let background = Frame::from_straight_image(req.background);
    let frame = composite_over(&background, &layers, req.opacity)?;

    tracing::info!(
        style = %template.name,
        font = %face.family,
        font_size = layout.font_size,
        lines = layout.lines.len(),
        fits = layout.fits,
        seed,
        "rendered text"
    );
    Ok(RenderOutput {
        frame,
        style_name: template.name.clone(),
        font_size: layout.font_size,
        layout,
        seed,
    })
}

/// Render `req.text` onto a transparent canvas and return its glyph mask.
#[tracing::instrument(level = "info", skip_all, fields(w = req.width, h = req.height))]
pub fn render_preview(
    ctx: &RenderContext,
    engine: &mut TextEngine,
    req: &PreviewRequest<'_>,
) -> WordArtResult<PreviewOutput> {
    let canvas = Canvas::new(req.width, req.height)?;
    let seed = req.seed.resolve();
    let mut rng = Rng64::new(seed);

    let template = resolve_style(&ctx.registry, &req.style, &mut rng)?;
    let face = choose_font(&ctx.fonts, &template, &req.font, &mut rng)?;
    engine.set_face(&face)?;

    let layout = solve_layout(
        engine,
        &LayoutRequest {
            text: req.text,
            canvas,
            margins: req.margins,
            font_size: req.font_size,
            options: req.fit,
        },
    )?;
    let layers = render_layers(engine, &layout, &template, canvas, req.effects)?;
    let (frame, mask) = composite_preview(canvas, &layers)?;

    tracing::info!(
        style = %template.name,
        font = %face.family,
        font_size = layout.font_size,
        seed,
        "rendered preview"
    );
    Ok(PreviewOutput {
        frame,
        mask,
        style_name: template.name.clone(),
        font_size: layout.font_size,
        seed,
    })
}

fn resolve_style(
    registry: &StyleRegistry,
    selector: &StyleSelector,
    rng: &mut Rng64,
) -> WordArtResult<Arc<StyleTemplate>> {
    if let StyleSelector::Named(name) = selector {
        match registry.get(name) {
            Ok(t) => return Ok(t),
            Err(e) => tracing::warn!(error = %e, "falling back to a random style"),
        }
    }
    if *selector == StyleSelector::ColorMatch {
        tracing::debug!("no background to color-match; picking a random style");
    }
    registry
        .pick(rng)
        .ok_or_else(|| WordArtError::style_not_found("registry is empty"))
}

fn choose_font(
    fonts: &FontLibrary,
    template: &StyleTemplate,
    choice: &FontChoice,
    rng: &mut Rng64,
) -> WordArtResult<FontFace> {
    let weight = template.sample.font_weight;
    let face = match choice {
        FontChoice::Auto => template
            .sample
            .font_family
            .as_deref()
            .and_then(|family| fonts.resolve(family, weight))
            .or_else(|| fonts.fallback()),
        FontChoice::Random => fonts.pick(rng),
        FontChoice::Family(family) => fonts
            .resolve(family, weight)
            .or_else(|| fonts.fallback()),
    };
    face.ok_or_else(|| WordArtError::render("no usable font faces are installed"))
}

/// Outcome of rendering one style through the preview pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StyleCheck {
    pub name: String,
    pub covered_pixels: usize,
    pub error: Option<String>,
}

impl StyleCheck {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.covered_pixels > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidateOptions {
    pub width: u32,
    pub height: u32,
    /// Text to render; `None` uses each style's sample text.
    pub text: Option<String>,
    pub threads: Option<usize>,
    pub effects: EffectSet,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
            text: None,
            threads: None,
            effects: EffectSet::Full,
        }
    }
}

/// Preview every registered style in parallel, one text engine per worker.
#[tracing::instrument(level = "info", skip_all, fields(styles = ctx.registry.len()))]
pub fn validate_registry(
    ctx: &RenderContext,
    opts: &ValidateOptions,
) -> WordArtResult<Vec<StyleCheck>> {
    let pool = build_thread_pool(opts.threads)?;
    let names: Vec<&str> = ctx.registry.names().collect();

    let checks = pool.install(|| {
        names
            .par_iter()
            .map_init(TextEngine::new, |engine, name| {
                let covered = check_style(ctx, engine, name, opts);
                match covered {
                    Ok(covered_pixels) => StyleCheck {
                        name: (*name).to_owned(),
                        covered_pixels,
                        error: None,
                    },
                    Err(e) => StyleCheck {
                        name: (*name).to_owned(),
                        covered_pixels: 0,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect::<Vec<_>>()
    });

    let failed = checks.iter().filter(|c| !c.passed()).count();
    tracing::info!(checked = checks.len(), failed, "registry validated");
    Ok(checks)
}

fn check_style(
    ctx: &RenderContext,
    engine: &mut TextEngine,
    name: &str,
    opts: &ValidateOptions,
) -> WordArtResult<usize> {
    let template = ctx.registry.get(name)?;
    let text = [opts.text.as_deref(), Some(template.sample.text.as_str())]
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
        .unwrap_or("Sample");
    let req = PreviewRequest {
        style: StyleSelector::Named(template.name.clone()),
        seed: Seed(1),
        effects: opts.effects,
        ..PreviewRequest::new(text, opts.width, opts.height)
    };
    let out = render_preview(ctx, engine, &req)?;
    Ok(out.mask.covered_pixels())
}

fn build_thread_pool(threads: Option<usize>) -> WordArtResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WordArtError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WordArtError::render(format!("failed to build rayon thread pool: {e}")))
}

/// Write a style back out as a descriptor file named after the style.
pub fn record_style(template: &StyleTemplate, dir: &Path) -> WordArtResult<PathBuf> {
    use anyhow::Context as _;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create style directory '{}'", dir.display()))?;
    let path = dir.join(format!("{}.svg", template.name));
    std::fs::write(&path, crate::style::descriptor::write_descriptor(template))
        .with_context(|| format!("write descriptor '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "recorded style");
    Ok(path)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
