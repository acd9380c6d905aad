use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{WordArtError, WordArtResult};

const MAX_SAMPLES: f64 = 1000.0;
const CLUSTERS: usize = 5;
const ITERATIONS: usize = 10;

/// Coarse color names used to key the style mapping.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorBucket {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    Brown,
    White,
    Black,
    Gray,
}

/// Inclusive HSV box; hue in degrees, saturation and value in `[0, 1]`.
struct HsvRange {
    bucket: ColorBucket,
    lower: (f32, f32, f32),
    upper: (f32, f32, f32),
}

const RANGES: [HsvRange; 12] = [
    HsvRange {
        bucket: ColorBucket::Red,
        lower: (340.0, 0.50, 0.50),
        upper: (10.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Orange,
        lower: (10.0, 0.50, 0.50),
        upper: (30.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Yellow,
        lower: (30.0, 0.50, 0.50),
        upper: (60.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Green,
        lower: (60.0, 0.25, 0.25),
        upper: (170.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Cyan,
        lower: (170.0, 0.25, 0.25),
        upper: (200.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Blue,
        lower: (200.0, 0.25, 0.25),
        upper: (260.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Purple,
        lower: (260.0, 0.25, 0.25),
        upper: (290.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Pink,
        lower: (290.0, 0.25, 0.25),
        upper: (340.0, 1.0, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Brown,
        lower: (10.0, 0.20, 0.15),
        upper: (40.0, 0.60, 0.58),
    },
    HsvRange {
        bucket: ColorBucket::White,
        lower: (0.0, 0.0, 0.85),
        upper: (360.0, 0.10, 1.0),
    },
    HsvRange {
        bucket: ColorBucket::Black,
        lower: (0.0, 0.0, 0.0),
        upper: (360.0, 0.05, 0.15),
    },
    HsvRange {
        bucket: ColorBucket::Gray,
        lower: (0.0, 0.0, 0.15),
        upper: (360.0, 0.10, 0.85),
    },
];

impl HsvRange {
    fn contains(&self, h: f32, s: f32, v: f32) -> bool {
        let (h0, s0, v0) = self.lower;
        let (h1, s1, v1) = self.upper;
        // Red wraps through 0 degrees.
        let hue_ok = if h0 > h1 {
            h >= h0 || h <= h1
        } else {
            (h0..=h1).contains(&h)
        };
        hue_ok && (s0..=s1).contains(&s) && (v0..=v1).contains(&v)
    }

    fn midpoint(&self) -> (f32, f32, f32) {
        let (h0, s0, v0) = self.lower;
        let (h1, s1, v1) = self.upper;
        let h = if h0 > h1 {
            ((h0 + h1 + 360.0) / 2.0) % 360.0
        } else {
            (h0 + h1) / 2.0
        };
        (h, (s0 + s1) / 2.0, (v0 + v1) / 2.0)
    }
}

impl ColorBucket {
    pub const ALL: [ColorBucket; 12] = [
        ColorBucket::Red,
        ColorBucket::Orange,
        ColorBucket::Yellow,
        ColorBucket::Green,
        ColorBucket::Cyan,
        ColorBucket::Blue,
        ColorBucket::Purple,
        ColorBucket::Pink,
        ColorBucket::Brown,
        ColorBucket::White,
        ColorBucket::Black,
        ColorBucket::Gray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorBucket::Red => "red",
            ColorBucket::Orange => "orange",
            ColorBucket::Yellow => "yellow",
            ColorBucket::Green => "green",
            ColorBucket::Cyan => "cyan",
            ColorBucket::Blue => "blue",
            ColorBucket::Purple => "purple",
            ColorBucket::Pink => "pink",
            ColorBucket::Brown => "brown",
            ColorBucket::White => "white",
            ColorBucket::Black => "black",
            ColorBucket::Gray => "gray",
        }
    }

    /// Name an sRGB color.
    ///
    /// Achromatic colors are decided by value alone, then brown, then the hue boxes in table
    /// order. Colors outside every box take the nearest box center in weighted HSV distance.
    pub fn classify(rgb: [u8; 3]) -> Self {
        let (h, s, v) = rgb_to_hsv(rgb);
        if s < 0.1 {
            return if v < 0.15 {
                ColorBucket::Black
            } else if v > 0.85 {
                ColorBucket::White
            } else {
                ColorBucket::Gray
            };
        }
        if (10.0..=40.0).contains(&h) && (0.2..=0.6).contains(&s) && (0.15..=0.58).contains(&v) {
            return ColorBucket::Brown;
        }
        if let Some(r) = RANGES.iter().find(|r| r.contains(h, s, v)) {
            return r.bucket;
        }
        nearest_bucket(h, s, v)
    }
}

fn nearest_bucket(h: f32, s: f32, v: f32) -> ColorBucket {
    let mut best = ColorBucket::Gray;
    let mut best_d = f32::INFINITY;
    for r in &RANGES {
        let (hm, sm, vm) = r.midpoint();
        let dh = (h - hm).abs();
        let dh = dh.min(360.0 - dh) / 180.0;
        let ds = s - sm;
        let dv = v - vm;
        let d = (dh * dh * 0.8 + ds * ds * 1.2 + dv * dv * 1.5).sqrt();
        if d < best_d {
            best_d = d;
            best = r.bucket;
        }
    }
    best
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorBucket {
    type Err = WordArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let lower = if lower == "grey" { "gray".to_owned() } else { lower };
        ColorBucket::ALL
            .into_iter()
            .find(|b| b.as_str() == lower)
            .ok_or_else(|| WordArtError::parse(format!("unknown color bucket '{s}'")))
    }
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> (f32, f32, f32) {
    let [r, g, b] = rgb.map(|c| f32::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta <= 0.0 {
        return (0.0, s, v);
    }
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    ((h * 60.0).rem_euclid(360.0), s, v)
}

/// Most representative color of an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DominantColor {
    pub rgb: [u8; 3],
    /// Fraction of sampled pixels in the winning cluster.
    pub share: f32,
    pub bucket: ColorBucket,
}

/// Cluster a downsampled copy of `img` and pick the dominant color.
///
/// Low-saturation mid-value clusters are skipped unless they cover at least half the samples,
/// so a colorful subject on a gray backdrop wins over the backdrop.
#[tracing::instrument(level = "debug", skip(img), fields(w = img.width(), h = img.height()))]
pub fn dominant_color(img: &image::RgbaImage) -> WordArtResult<DominantColor> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(WordArtError::validation("cannot analyze an empty image"));
    }
    let samples = sample_pixels(img);
    let clusters = kmeans(&samples, CLUSTERS.min(samples.len()));
    let total = samples.len() as f32;

    let mut candidates: Vec<(&[f32; 3], f32)> = clusters
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| (&c.center, c.count as f32 / total))
        .collect();
    let colorful: Vec<(&[f32; 3], f32)> = candidates
        .iter()
        .copied()
        .filter(|(center, share)| {
            let (_, s, v) = rgb_to_hsv(to_rgb(center));
            !(s < 0.15 && v > 0.15 && v < 0.85 && *share < 0.5)
        })
        .collect();
    if !colorful.is_empty() {
        candidates = colorful;
    }

    let (center, share) = candidates
        .into_iter()
        .fold(None::<(&[f32; 3], f32)>, |best, c| match best {
            Some(b) if b.1 >= c.1 => Some(b),
            _ => Some(c),
        })
        .ok_or_else(|| WordArtError::validation("image produced no color clusters"))?;
    let rgb = to_rgb(center);
    let bucket = ColorBucket::classify(rgb);
    tracing::debug!(color = ?rgb, share, bucket = %bucket, "dominant color");
    Ok(DominantColor { rgb, share, bucket })
}

fn to_rgb(c: &[f32; 3]) -> [u8; 3] {
    c.map(|v| v.round().clamp(0.0, 255.0) as u8)
}

fn sample_pixels(img: &image::RgbaImage) -> Vec<[f32; 3]> {
    let (w, h) = img.dimensions();
    let ratio = (MAX_SAMPLES / (f64::from(w) * f64::from(h))).sqrt().min(1.0);
    let nw = ((f64::from(w) * ratio) as u32).max(1);
    let nh = ((f64::from(h) * ratio) as u32).max(1);
    let small = if (nw, nh) == (w, h) {
        img.clone()
    } else {
        image::imageops::resize(img, nw, nh, image::imageops::FilterType::Lanczos3)
    };
    small
        .pixels()
        .map(|p| [f32::from(p[0]), f32::from(p[1]), f32::from(p[2])])
        .collect()
}

struct Cluster {
    center: [f32; 3],
    count: usize,
}

fn luminance(c: &[f32; 3]) -> f32 {
    0.299 * c[0] + 0.587 * c[1] + 0.114 * c[2]
}

fn dist2(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (0..3).map(|i| (a[i] - b[i]) * (a[i] - b[i])).sum()
}

/// Lloyd's k-means seeded at evenly spaced luminance quantiles, so results are reproducible.
fn kmeans(samples: &[[f32; 3]], k: usize) -> Vec<Cluster> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| luminance(&samples[a]).total_cmp(&luminance(&samples[b])));
    let mut centers: Vec<[f32; 3]> = (0..k)
        .map(|i| {
            let q = if k == 1 {
                0
            } else {
                i * (samples.len() - 1) / (k - 1)
            };
            samples[order[q]]
        })
        .collect();

    let mut labels = vec![0usize; samples.len()];
    for _ in 0..ITERATIONS {
        for (label, s) in labels.iter_mut().zip(samples) {
            *label = nearest_center(&centers, s);
        }
        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&label, s) in labels.iter().zip(samples) {
            counts[label] += 1;
            for c in 0..3 {
                sums[label][c] += f64::from(s[c]);
            }
        }
        for (i, center) in centers.iter_mut().enumerate() {
            if counts[i] > 0 {
                let n = counts[i] as f64;
                *center = sums[i].map(|v| (v / n) as f32);
            }
        }
    }

    for (label, s) in labels.iter_mut().zip(samples) {
        *label = nearest_center(&centers, s);
    }
    let mut counts = vec![0usize; k];
    for &label in &labels {
        counts[label] += 1;
    }
    centers
        .into_iter()
        .zip(counts)
        .map(|(center, count)| Cluster { center, count })
        .collect()
}

fn nearest_center(centers: &[[f32; 3]], s: &[f32; 3]) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = dist2(c, s);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/select/color.rs"]
mod tests;
