use crate::foundation::core::{Canvas, Point, Rect, Size};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::text::engine::{LineMetrics, TextMeasure};

/// Margin fractions of the canvas, each in `[0, 1)` of its own dimension.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            bottom: v,
            left: v,
            right: v,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.25,
            bottom: 0.15,
            left: 0.1,
            right: 0.1,
        }
    }
}

/// How words are grouped into lines.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum WrapMode {
    /// Fill each line while it fits the safe width.
    #[default]
    Greedy,
    /// Spread words evenly over a line count chosen from the word count.
    Balanced,
}

/// Font-size search bounds and spacing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitOptions {
    pub min_size: u32,
    pub max_size: u32,
    /// Gap between lines as a fraction of the font size.
    pub line_spacing: f32,
    pub wrap: WrapMode,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 300,
            line_spacing: 0.2,
            wrap: WrapMode::Greedy,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest<'a> {
    pub text: &'a str,
    pub canvas: Canvas,
    pub margins: Margins,
    /// Skip the size search and use this size.
    pub font_size: Option<f32>,
    pub options: FitOptions,
}

/// One shaped run placed on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRunPlacement {
    pub text: String,
    /// Top-left corner of the run's line box.
    pub anchor: Point,
    pub font_size: f32,
    pub baseline_y: f64,
    pub width: f64,
    pub height: f64,
}

impl GlyphRunPlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.anchor, Size::new(self.width, self.height))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLine {
    pub runs: Vec<GlyphRunPlacement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub font_size: f32,
    pub lines: Vec<LayoutLine>,
    /// Union of all line boxes.
    pub bounds: Rect,
    pub safe_area: Rect,
    /// False when even the minimum size overflows and the block was centered anyway.
    pub fits: bool,
}

impl LayoutResult {
    pub fn runs(&self) -> impl Iterator<Item = &GlyphRunPlacement> {
        self.lines.iter().flat_map(|l| l.runs.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.runs().all(|r| r.text.trim().is_empty())
    }
}

/// Canvas rect shrunk by margins, in whole pixels.
pub fn safe_area(canvas: Canvas, margins: Margins) -> WordArtResult<Rect> {
    for (name, v) in [
        ("top", margins.top),
        ("bottom", margins.bottom),
        ("left", margins.left),
        ("right", margins.right),
    ] {
        if !v.is_finite() || !(0.0..1.0).contains(&v) {
            return Err(WordArtError::layout(format!(
                "{name} margin must be in [0, 1), got {v}"
            )));
        }
    }

    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let left = (w * f64::from(margins.left)).floor();
    let right = w - (w * f64::from(margins.right)).floor();
    let top = (h * f64::from(margins.top)).floor();
    let bottom = h - (h * f64::from(margins.bottom)).floor();
    if right - left <= 0.0 || bottom - top <= 0.0 {
        return Err(WordArtError::layout(format!(
            "safe area is empty ({}x{} after margins)",
            right - left,
            bottom - top
        )));
    }
    Ok(Rect::new(left, top, right, bottom))
}

struct Wrapped {
    lines: Vec<(String, LineMetrics)>,
    line_height: f64,
    gap: f64,
}

impl Wrapped {
    fn block_height(&self) -> f64 {
        let n = self.lines.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        n * self.line_height + (n - 1.0) * self.gap
    }

    fn max_width(&self) -> f64 {
        self.lines
            .iter()
            .map(|(_, m)| f64::from(m.width))
            .fold(0.0, f64::max)
    }

    fn fits(&self, area: Rect) -> bool {
        self.block_height() <= area.height() && self.max_width() <= area.width()
    }
}

/// Break, size, and center `req.text` inside the safe area.
#[tracing::instrument(level = "debug", skip(measure), fields(text_len = req.text.len()))]
pub fn solve_layout<M: TextMeasure + ?Sized>(
    measure: &mut M,
    req: &LayoutRequest<'_>,
) -> WordArtResult<LayoutResult> {
    let area = safe_area(req.canvas, req.margins)?;
    let opts = req.options;
    if opts.min_size == 0 || opts.min_size > opts.max_size {
        return Err(WordArtError::layout(format!(
            "invalid font size range {}..={}",
            opts.min_size, opts.max_size
        )));
    }

    let (font_size, wrapped) = match req.font_size {
        Some(size) => {
            if !size.is_finite() || size <= 0.0 {
                return Err(WordArtError::layout("explicit font size must be > 0"));
            }
            (size, wrap(measure, req.text, size, area, opts)?)
        }
        None => search_size(measure, req.text, area, opts)?,
    };
    let fits = wrapped.fits(area);
    if !fits {
        tracing::debug!(font_size, "text overflows the safe area; centering at chosen size");
    }

    Ok(place(font_size, wrapped, area, fits))
}

/// Largest integer size in `[min, max]` whose wrapped block fits, else the minimum.
fn search_size<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    area: Rect,
    opts: FitOptions,
) -> WordArtResult<(f32, Wrapped)> {
    let mut lo = opts.min_size;
    let mut hi = opts.max_size;
    let mut best: Option<(f32, Wrapped)> = None;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let size = mid as f32;
        let w = wrap(measure, text, size, area, opts)?;
        if w.fits(area) {
            best = Some((size, w));
            lo = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            hi = mid - 1;
        }
    }
    match best {
        Some(b) => Ok(b),
        None => {
            let size = opts.min_size as f32;
            Ok((size, wrap(measure, text, size, area, opts)?))
        }
    }
}

fn wrap<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    size: f32,
    area: Rect,
    opts: FitOptions,
) -> WordArtResult<Wrapped> {
    let probe = measure.measure("", size)?;
    let mut lines = Vec::<(String, LineMetrics)>::new();

    if !text.trim().is_empty() {
        for paragraph in text.split('\n') {
            let words = paragraph.split_whitespace().collect::<Vec<_>>();
            if words.is_empty() {
                lines.push((String::new(), probe));
                continue;
            }
            let groups = match opts.wrap {
                WrapMode::Greedy => greedy(measure, &words, size, area.width())?,
                WrapMode::Balanced => balanced(&words),
            };
            for g in groups {
                let m = measure.measure(&g, size)?;
                lines.push((g, m));
            }
        }
    }

    let line_height = lines
        .iter()
        .map(|(_, m)| f64::from(m.height()))
        .fold(f64::from(probe.height()), f64::max);
    Ok(Wrapped {
        lines,
        line_height,
        gap: f64::from(opts.line_spacing * size),
    })
}

fn greedy<M: TextMeasure + ?Sized>(
    measure: &mut M,
    words: &[&str],
    size: f32,
    max_width: f64,
) -> WordArtResult<Vec<String>> {
    let mut out = Vec::new();
    let mut current = String::new();
    for &word in words {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if f64::from(measure.measure(&candidate, size)?.width) <= max_width {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    Ok(out)
}

/// Word-count rule: up to 2 words on one line, 4 on two, 6 on three, otherwise four lines.
fn balanced(words: &[&str]) -> Vec<String> {
    let target = match words.len() {
        0..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    };
    let per_line = words.len().div_ceil(target);
    words.chunks(per_line.max(1)).map(|c| c.join(" ")).collect()
}

fn place(font_size: f32, wrapped: Wrapped, area: Rect, fits: bool) -> LayoutResult {
    let block_h = wrapped.block_height();
    let mut y = area.y0 + (area.height() - block_h) / 2.0;
    let mut lines = Vec::with_capacity(wrapped.lines.len());
    let mut bounds: Option<Rect> = None;

    for (text, m) in wrapped.lines {
        let width = f64::from(m.width);
        let x = area.x0 + (area.width() - width) / 2.0;
        let run = GlyphRunPlacement {
            text,
            anchor: Point::new(x, y),
            font_size,
            baseline_y: y + f64::from(m.ascent),
            width,
            height: wrapped.line_height,
        };
        let r = run.rect();
        bounds = Some(bounds.map_or(r, |b| b.union(r)));
        lines.push(LayoutLine { runs: vec![run] });
        y += wrapped.line_height + wrapped.gap;
    }

    LayoutResult {
        font_size,
        lines,
        bounds: bounds.unwrap_or_else(|| Rect::from_center_size(area.center(), Size::ZERO)),
        safe_area: area,
        fits,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
