use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{WordArtError, WordArtResult};
use crate::foundation::math::mul_div255_u8;

/// Single-channel 8-bit coverage buffer, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.pixel_count()],
        }
    }

    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> WordArtResult<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(WordArtError::validation(format!(
                "mask data length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Alpha channel of a tightly packed RGBA8 buffer.
    pub fn from_rgba_alpha(width: u32, height: u32, rgba: &[u8]) -> WordArtResult<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(WordArtError::validation(
                "rgba buffer does not match mask dimensions",
            ));
        }
        Ok(Self {
            width,
            height,
            data: rgba.chunks_exact(4).map(|px| px[3]).collect(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&a| a == 0)
    }

    pub fn covered_pixels(&self) -> usize {
        self.data.iter().filter(|&&a| a != 0).count()
    }

    /// Pixel bounds of non-zero coverage.
    pub fn bbox(&self) -> Option<Rect> {
        let w = self.width as usize;
        let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
        for (i, &a) in self.data.iter().enumerate() {
            if a == 0 {
                continue;
            }
            let (x, y) = (i % w, i / w);
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
        (x0 != usize::MAX).then(|| Rect::new(x0 as f64, y0 as f64, x1 as f64, y1 as f64))
    }

    fn check_same(&self, other: &Self, op: &str) -> WordArtResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(WordArtError::validation(format!(
                "{op} expects equal mask sizes ({}x{} vs {}x{})",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(())
    }

    /// Saturating `self - other`.
    pub fn subtract(&self, other: &Self) -> WordArtResult<Self> {
        self.check_same(other, "subtract")?;
        Ok(self.zip_with(other, |a, b| a.saturating_sub(b)))
    }

    /// Coverage product (`a * b / 255`).
    pub fn multiply(&self, other: &Self) -> WordArtResult<Self> {
        self.check_same(other, "multiply")?;
        Ok(self.zip_with(other, |a, b| mul_div255_u8(u16::from(a), u16::from(b))))
    }

    /// Union by per-pixel max.
    pub fn union(&self, other: &Self) -> WordArtResult<Self> {
        self.check_same(other, "union")?;
        Ok(self.zip_with(other, u8::max))
    }

    fn zip_with(&self, other: &Self, f: impl Fn(u8, u8) -> u8) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Hard 0/255 mask: coverage strictly above `threshold` (a unit fraction) becomes opaque.
    pub fn binarize(&self, threshold: f32) -> Self {
        let cut = (threshold.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|&a| if a > cut { 255 } else { 0 })
                .collect(),
        }
    }

    /// Shift content by `(dx, dy)` pixels with bilinear sampling; uncovered area is empty.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        let (w, h) = (self.width as i64, self.height as i64);
        let fx = dx.floor();
        let fy = dy.floor();
        let (ix, iy) = (fx as i64, fy as i64);
        let (tx, ty) = ((dx - fx) as f32, (dy - fy) as f32);

        // Integer shifts copy exactly so identical masks difference cleanly.
        let exact = tx == 0.0 && ty == 0.0;
        let mut data = vec![0u8; self.data.len()];
        for y in 0..h {
            for x in 0..w {
                let sx = x - ix;
                let sy = y - iy;
                let v = if exact {
                    self.sample(sx, sy)
                } else {
                    // Source point is (x - dx, y - dy); corners around it weighted by fraction.
                    let a = f32::from(self.sample(sx, sy));
                    let b = f32::from(self.sample(sx - 1, sy));
                    let c = f32::from(self.sample(sx, sy - 1));
                    let d = f32::from(self.sample(sx - 1, sy - 1));
                    let top = a * (1.0 - tx) + b * tx;
                    let bottom = c * (1.0 - tx) + d * tx;
                    (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8
                };
                data[(y * w + x) as usize] = v;
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    fn sample(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Square morphological dilation by `radius` pixels (separable sliding-window max).
    ///
    /// Linear in the pixel count for any radius; radii past the canvas saturate.
    pub fn dilate(&self, radius: u32) -> Self {
        if radius == 0 || self.data.is_empty() {
            return self.clone();
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let r = (radius as usize).min(w.max(h));

        let mut tmp = vec![0u8; self.data.len()];
        let mut line = Vec::with_capacity(w.max(h));
        let mut window = std::collections::VecDeque::new();
        for y in 0..h {
            sliding_max(&self.data[y * w..(y + 1) * w], r, &mut line, &mut window);
            tmp[y * w..(y + 1) * w].copy_from_slice(&line);
        }

        let mut out = vec![0u8; self.data.len()];
        let mut column = Vec::with_capacity(h);
        for x in 0..w {
            column.clear();
            column.extend((0..h).map(|y| tmp[y * w + x]));
            sliding_max(&column, r, &mut line, &mut window);
            for (y, &v) in line.iter().enumerate() {
                out[y * w + x] = v;
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data: out,
        }
    }
}

/// `out[i] = max(src[i - r..=i + r])` clamped to the slice, via a monotonic index queue.
fn sliding_max(
    src: &[u8],
    r: usize,
    out: &mut Vec<u8>,
    window: &mut std::collections::VecDeque<usize>,
) {
    out.clear();
    window.clear();
    let n = src.len();
    let mut next = 0usize;
    for i in 0..n {
        let hi = (i + r).min(n - 1);
        while next <= hi {
            while window.back().is_some_and(|&j| src[j] <= src[next]) {
                window.pop_back();
            }
            window.push_back(next);
            next += 1;
        }
        let lo = i.saturating_sub(r);
        while window.front().is_some_and(|&j| j < lo) {
            window.pop_front();
        }
        out.push(window.front().map_or(0, |&j| src[j]));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
