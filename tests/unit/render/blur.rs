use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_channels(&src, 1, 2, 4, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn zero_sigma_mask_blur_is_identity() {
    let m = AlphaMask::from_vec(2, 2, vec![0, 255, 10, 20]).unwrap();
    assert_eq!(blur_mask(&m, 0.0).unwrap(), m);
    assert_eq!(radius_for_sigma(-1.0), 0);
    assert_eq!(radius_for_sigma(2.0), 6);
    assert_eq!(radius_for_sigma(1.1), 4);
}

#[test]
fn interior_of_constant_field_is_preserved() {
    let (w, h) = (15u32, 15u32);
    let src = vec![200u8; (w * h) as usize];
    let out = blur_channels(&src, w, h, 1, 3, 1.0).unwrap();
    assert_eq!(out[(7 * w + 7) as usize], 200);
    assert!(out[0] < 200);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h) as usize];
    src[(4 * w + 4) as usize] = 255;
    let m = AlphaMask::from_vec(w, h, src).unwrap();

    let out = blur_mask(&m, 0.8).unwrap();
    assert!(out.covered_pixels() > 1);
    let sum: u32 = out.data.iter().map(|&a| u32::from(a)).sum();
    assert!((sum as i32 - 255).abs() <= 6);
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(blur_channels(&[0u8; 5], 2, 2, 1, 1, 1.0).is_err());
    assert!(blur_channels(&[0u8; 4], 2, 2, 0, 1, 1.0).is_err());
}

#[test]
fn huge_sigma_is_bounded_by_the_canvas() {
    let (w, h) = (64u32, 32u32);
    let mut src = vec![0u8; (w * h) as usize];
    for y in 12..20 {
        for x in 24..40 {
            src[(y * w + x) as usize] = 255;
        }
    }
    let m = AlphaMask::from_vec(w, h, src).unwrap();
    let started = std::time::Instant::now();
    let out = blur_mask(&m, 1.0e5).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    assert_eq!(out.data.len(), m.data.len());
    // A near-flat kernel spreads 128 covered pixels thinly.
    assert!(out.data.iter().all(|&a| a < 64));
}

#[test]
fn tap_range_keeps_only_in_bounds_taps() {
    assert_eq!(tap_range(0, 10, 3), (3, 7));
    assert_eq!(tap_range(9, 10, 3), (0, 4));
    assert_eq!(tap_range(5, 10, 3), (0, 7));
    assert_eq!(tap_range(0, 1, 3), (3, 4));
}
