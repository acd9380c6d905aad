//! Wordart renders stylized text ("artistic words") and composites it onto raster images.
//!
//! Styles are SVG descriptors interpreted into a fixed set of effect layers: gradient fill,
//! stroke, drop shadow, outer glow and inner shadow. A request flows through:
//!
//! - [`StyleRegistry`] built once from a directory of descriptors
//! - [`solve_layout`] wrapping and sizing text into the canvas safe area
//! - [`render_layers`] rasterizing each effect from one glyph silhouette
//! - [`composite_over`] / [`composite_preview`] blending layers in paint order
//!
//! [`render_full`] and [`render_preview`] tie these together; [`dominant_color`] and
//! [`select_style`] pick a style from a background's color.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod layout;
/// Full and preview render entry points.
pub mod pipeline;
pub(crate) mod render;
pub(crate) mod select;
pub(crate) mod style;
pub(crate) mod text;

pub use crate::foundation::core::{
    Canvas, Frame, Point, Rect, Rgba8, Rgba8Premul, Seed, Size, Vec2,
};
pub use crate::foundation::error::{WordArtError, WordArtResult};
pub use crate::foundation::math::Rng64;

pub use crate::layout::solver::{
    FitOptions, GlyphRunPlacement, LayoutLine, LayoutRequest, LayoutResult, Margins, WrapMode,
    safe_area, solve_layout,
};
pub use crate::pipeline::{
    ContextPaths, FontChoice, PreviewOutput, PreviewRequest, RenderContext, RenderOutput,
    RenderRequest, SeedMode, StyleCheck, StyleSelector, ValidateOptions, record_style,
    render_full, render_preview, validate_registry,
};
pub use crate::render::blur::blur_mask;
pub use crate::render::composite::{composite_over, composite_preview, over};
pub use crate::render::layers::{EffectSet, RenderLayer, build_layers, render_layers};
pub use crate::render::mask::AlphaMask;
pub use crate::render::silhouette::rasterize_silhouette;
pub use crate::select::color::{ColorBucket, DominantColor, dominant_color};
pub use crate::select::mapping::{ColorStyleMapping, select_style};
pub use crate::style::descriptor::{parse_descriptor, write_descriptor};
pub use crate::style::model::{
    Glow, Gradient, GradientStop, InnerShadow, LayerRole, LayerUse, SampleText, Shadow, Stroke,
    StyleTemplate,
};
pub use crate::style::registry::{LoadFailure, LoadReport, StyleRegistry};
pub use crate::text::engine::{LineMetrics, ShapedGlyph, ShapedLine, TextEngine, TextMeasure};
pub use crate::text::fonts::{FontFace, FontLibrary};
