use crate::foundation::error::{WordArtError, WordArtResult};
use crate::render::mask::AlphaMask;

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (3.0 * sigma).ceil() as u32
}

/// Gaussian blur of a coverage mask with standard deviation `sigma` pixels.
///
/// Outside the canvas counts as empty, so coverage near the edges fades instead of smearing.
pub fn blur_mask(mask: &AlphaMask, sigma: f32) -> WordArtResult<AlphaMask> {
    let radius = radius_for_sigma(sigma);
    if radius == 0 {
        return Ok(mask.clone());
    }
    // Taps past the far edge never land on the canvas.
    let radius = radius.min(mask.width.max(mask.height));
    let data = blur_channels(&mask.data, mask.width, mask.height, 1, radius, sigma)?;
    AlphaMask::from_vec(mask.width, mask.height, data)
}

/// Separable Gaussian over `channels` interleaved 8-bit channels.
pub fn blur_channels(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    radius: u32,
    sigma: f32,
) -> WordArtResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| WordArtError::validation("blur buffer size overflow"))?;
    if channels == 0 || src.len() != expected_len {
        return Err(WordArtError::validation(
            "blur_channels expects src matching width*height*channels",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }
    let radius = radius.min(width.max(height));

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, channels, &kernel);
    vertical_pass(&tmp, &mut out, width, height, channels, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> WordArtResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(WordArtError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(WordArtError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let target: i64 = 65536;
    let delta = target - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        let new_mid = (mid_val + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, ch: usize, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let mut acc = vec![0u64; ch];
    for y in 0..i64::from(height) {
        for x in 0..w {
            acc.fill(0);
            let (lo, hi) = tap_range(x, w, radius);
            for (ki, &kw) in k.iter().enumerate().take(hi).skip(lo) {
                let sx = x + ki as i64 - radius;
                let idx = ((y * w + sx) as usize) * ch;
                for c in 0..ch {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * ch;
            for c in 0..ch {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, ch: usize, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    let mut acc = vec![0u64; ch];
    for y in 0..h {
        for x in 0..w {
            acc.fill(0);
            let (lo, hi) = tap_range(y, h, radius);
            for (ki, &kw) in k.iter().enumerate().take(hi).skip(lo) {
                let sy = y + ki as i64 - radius;
                let idx = ((sy * w + x) as usize) * ch;
                for c in 0..ch {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * ch;
            for c in 0..ch {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

/// Kernel indices `lo..hi` whose taps from `pos` fall inside `0..len`.
fn tap_range(pos: i64, len: i64, radius: i64) -> (usize, usize) {
    let lo = (radius - pos).max(0);
    let hi = (radius + len - pos).min(2 * radius + 1);
    (lo as usize, hi.max(lo) as usize)
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
