use super::*;
use crate::style::model::LayerRole;

fn layer(role: LayerRole, w: u32, h: u32, px: [u8; 4], covered: &[usize]) -> RenderLayer {
    let mut data = vec![0u8; (w * h * 4) as usize];
    for &i in covered {
        data[i * 4..i * 4 + 4].copy_from_slice(&px);
    }
    RenderLayer {
        role,
        paint_index: role.paint_index(),
        width: w,
        height: h,
        data,
    }
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
    assert_eq!(over(dst, src, f32::NAN), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn later_paint_index_lands_on_top_regardless_of_slice_order() {
    let canvas = Canvas::new(1, 1).unwrap();
    let fill = layer(LayerRole::Fill, 1, 1, [255, 0, 0, 255], &[0]);
    let shadow = layer(LayerRole::Shadow, 1, 1, [0, 0, 0, 255], &[0]);
    let (frame, _) = composite_preview(canvas, &[fill, shadow]).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn preview_mask_excludes_shadow_and_glow() {
    let canvas = Canvas::new(3, 1).unwrap();
    let layers = vec![
        layer(LayerRole::Shadow, 3, 1, [0, 0, 0, 200], &[0]),
        layer(LayerRole::Glow, 3, 1, [0, 100, 0, 100], &[0, 1]),
        layer(LayerRole::Fill, 3, 1, [0, 0, 255, 255], &[1]),
        layer(LayerRole::Stroke, 3, 1, [0, 0, 90, 90], &[2]),
    ];
    let (frame, mask) = composite_preview(canvas, &layers).unwrap();
    assert_eq!(mask.data, vec![0, 255, 90]);
    assert_eq!(frame.pixel(0, 0).map(|p| p[3]), Some(222));
}

#[test]
fn group_opacity_fades_over_background() {
    let mut bg = Frame::transparent(Canvas::new(2, 1).unwrap());
    bg.data.fill(255);
    let fill = layer(LayerRole::Fill, 2, 1, [255, 0, 0, 255], &[0]);

    let out = composite_over(&bg, std::slice::from_ref(&fill), 0.5).unwrap();
    assert_eq!(out.pixel(0, 0), Some([255, 127, 127, 255]));
    assert_eq!(out.pixel(1, 0), Some([255, 255, 255, 255]));

    let hidden = composite_over(&bg, &[fill], 0.0).unwrap();
    assert_eq!(hidden, bg);
}

#[test]
fn mismatched_layer_is_a_validation_error() {
    let bg = Frame::transparent(Canvas::new(2, 2).unwrap());
    let fill = layer(LayerRole::Fill, 1, 1, [1, 1, 1, 1], &[]);
    let err = composite_over(&bg, &[fill], 1.0).unwrap_err();
    assert!(matches!(err, WordArtError::Validation(_)));
}
