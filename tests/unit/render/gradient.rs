use super::*;
use crate::foundation::core::Canvas;
use crate::style::model::GradientStop;

fn full(w: u32, h: u32) -> AlphaMask {
    let mut m = AlphaMask::new(Canvas {
        width: w,
        height: h,
    });
    m.data.fill(255);
    m
}

fn px(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * w + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn two_stop_gradient_hits_endpoints_of_bbox() {
    let g = Gradient::horizontal(vec![
        GradientStop {
            offset: 0.0,
            color: Rgba8::opaque(255, 0, 0),
        },
        GradientStop {
            offset: 1.0,
            color: Rgba8::opaque(0, 0, 255),
        },
    ])
    .unwrap();
    let m = full(100, 4);
    let out = paint_gradient(&m, &g, Rect::new(0.0, 0.0, 100.0, 4.0));
    let left = px(&out, 100, 0, 1);
    let right = px(&out, 100, 99, 1);
    assert!(left[0] >= 250 && left[2] <= 5);
    assert!(right[2] >= 250 && right[0] <= 5);
    assert_eq!(left[3], 255);
}

#[test]
fn uncovered_pixels_stay_transparent() {
    let m = AlphaMask::from_vec(2, 1, vec![0, 128]).unwrap();
    let out = paint_solid(&m, Rgba8::opaque(200, 100, 0), 1.0);
    assert_eq!(&out[..4], &[0, 0, 0, 0]);
    assert_eq!(&out[4..], &[100, 50, 0, 128]);
}

#[test]
fn alpha_scale_saturates() {
    let m = AlphaMask::from_vec(1, 1, vec![200]).unwrap();
    let out = paint_solid(&m, Rgba8::new(255, 255, 255, 255), 2.0);
    assert_eq!(out, vec![255, 255, 255, 255]);
    let out = paint_solid(&m, Rgba8::new(255, 255, 255, 255), f32::NAN);
    assert_eq!(out, vec![0, 0, 0, 0]);
}
