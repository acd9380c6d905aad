use super::*;

#[test]
fn canvas_rejects_zero_extent() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(3, 2).unwrap().rgba_len(), 24);
}

#[test]
fn premultiply_roundtrip_is_close() {
    let img = image::RgbaImage::from_raw(2, 1, vec![200, 100, 50, 128, 10, 20, 30, 0]).unwrap();
    let frame = Frame::from_straight_image(&img);
    assert_eq!(&frame.data[4..], &[0, 0, 0, 0]);
    let back = frame.to_straight_image().unwrap();
    for (a, b) in back.as_raw()[..4].iter().zip(&img.as_raw()[..4]) {
        assert!((i16::from(*a) - i16::from(*b)).abs() <= 2);
    }
}

#[test]
fn nonzero_seed_is_kept_and_zero_is_replaced() {
    assert_eq!(Seed(42).resolve(), 42);
    assert_ne!(Seed(0).resolve(), 0);
}

#[test]
fn rgba_lerp_endpoints() {
    let a = Rgba8::opaque(0, 0, 0);
    let b = Rgba8::new(255, 128, 0, 0);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(Rgba8::opaque(255, 16, 1).to_hex(), "#ff1001");
}
