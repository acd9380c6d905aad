use super::*;

fn stop(offset: f32, color: Rgba8) -> GradientStop {
    GradientStop { offset, color }
}

const RED: Rgba8 = Rgba8::opaque(255, 0, 0);
const BLUE: Rgba8 = Rgba8::opaque(0, 0, 255);

#[test]
fn stops_are_padded_to_unit_span() {
    let g = Gradient::horizontal(vec![stop(0.2, RED), stop(0.8, BLUE)]).unwrap();
    let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.2, 0.8, 1.0]);
    assert_eq!(g.sample(0.0), RED);
    assert_eq!(g.sample(1.0), BLUE);
}

#[test]
fn decreasing_offsets_are_made_monotonic() {
    let g = Gradient::horizontal(vec![stop(0.0, RED), stop(0.7, BLUE), stop(0.3, RED)]).unwrap();
    let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.7, 0.7, 1.0]);
}

#[test]
fn single_stop_becomes_solid() {
    let g = Gradient::horizontal(vec![stop(0.5, RED)]).unwrap();
    assert!(g.stops().len() >= 2);
    assert!(g.is_solid());
    assert_eq!(g.sample(0.9), RED);
}

#[test]
fn empty_stops_are_rejected() {
    let err = Gradient::horizontal(vec![]).unwrap_err();
    assert!(matches!(err, WordArtError::Parse(_)));
}

#[test]
fn sample_interpolates_midpoint() {
    let g = Gradient::horizontal(vec![stop(0.0, Rgba8::BLACK), stop(1.0, Rgba8::WHITE)]).unwrap();
    let mid = g.sample(0.5);
    assert!((i16::from(mid.r) - 128).abs() <= 1);
}

#[test]
fn axis_param_follows_bbox_direction() {
    let vertical = Gradient::new(0.0, 0.0, 0.0, 1.0, vec![stop(0.0, RED), stop(1.0, BLUE)]).unwrap();
    let bbox = Rect::new(100.0, 50.0, 300.0, 150.0);
    assert_eq!(vertical.axis_param(bbox, Point::new(250.0, 50.0)), 0.0);
    assert_eq!(vertical.axis_param(bbox, Point::new(120.0, 150.0)), 1.0);
    assert!((vertical.axis_param(bbox, Point::new(0.0, 100.0)) - 0.5).abs() < 1e-6);
}

#[test]
fn from_uses_rejects_two_fill_gradients() {
    let a = Gradient::solid(RED);
    let b = Gradient::solid(BLUE);
    let err = StyleTemplate::from_uses(
        "x",
        SampleText::default(),
        Gradient::solid(Rgba8::BLACK),
        vec![LayerUse::Fill(a), LayerUse::Fill(b)],
    )
    .unwrap_err();
    assert!(err.to_string().contains("more than one fill gradient"));
}

#[test]
fn from_uses_tolerates_repeated_identical_fill_and_records_order() {
    let shadow = Shadow {
        offset: Vec2::new(3.0, 3.0),
        blur: 2.0,
        color: Rgba8::BLACK,
    };
    let t = StyleTemplate::from_uses(
        "x",
        SampleText::default(),
        Gradient::solid(Rgba8::BLACK),
        vec![
            LayerUse::Fill(Gradient::solid(RED)),
            LayerUse::Shadow(shadow),
            LayerUse::Fill(Gradient::solid(RED)),
        ],
    )
    .unwrap();
    assert_eq!(t.layer_order, vec![LayerRole::Fill, LayerRole::Shadow]);
    assert!(t.has_custom_order());
    let roles: Vec<LayerRole> = t.uses().iter().map(LayerUse::role).collect();
    assert_eq!(roles, vec![LayerRole::Shadow, LayerRole::Fill]);
}

#[test]
fn missing_fill_uses_default_and_zero_stroke_is_dropped() {
    let t = StyleTemplate::from_uses(
        "x",
        SampleText::default(),
        Gradient::solid(Rgba8::BLACK),
        vec![LayerUse::Stroke(Stroke {
            width: 0.0,
            gradient: None,
        })],
    )
    .unwrap();
    assert_eq!(t.fill.first_color(), Rgba8::BLACK);
    assert!(t.stroke.is_none());
}

#[test]
fn paint_order_is_canonical() {
    let idx: Vec<usize> = LayerRole::PAINT_ORDER
        .iter()
        .map(|r| r.paint_index())
        .collect();
    assert_eq!(idx, vec![0, 1, 2, 3, 4]);
    assert!(LayerRole::InnerShadow.is_glyph_body());
    assert!(!LayerRole::Glow.is_glyph_body());
}
