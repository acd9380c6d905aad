use super::*;
use crate::text::fonts::{FontFace, FontLibrary};

fn engine() -> Option<TextEngine> {
    let face = FontLibrary::load(&[]).fallback()?;
    let mut e = TextEngine::new();
    e.set_face(&face).unwrap();
    Some(e)
}

#[test]
fn shaping_without_face_is_a_render_error() {
    let mut e = TextEngine::new();
    let err = e.shape_line("hi", 20.0).unwrap_err();
    assert!(matches!(err, WordArtError::Render(_)));
}

#[test]
fn invalid_size_is_rejected() {
    let Some(mut e) = engine() else { return };
    assert!(e.shape_line("hi", 0.0).is_err());
    assert!(e.shape_line("hi", f32::NAN).is_err());
}

#[test]
fn width_grows_with_size_and_text() {
    let Some(mut e) = engine() else { return };
    let small = e.measure("Hello", 20.0).unwrap();
    let big = e.measure("Hello", 40.0).unwrap();
    let longer = e.measure("Hello World", 20.0).unwrap();
    assert!(small.width > 0.0);
    assert!(big.width > small.width * 1.8);
    assert!(longer.width > small.width);
    assert!(big.height() > small.height());
}

#[test]
fn blank_line_has_metrics_but_no_width() {
    let Some(mut e) = engine() else { return };
    let m = e.measure("", 30.0).unwrap();
    assert_eq!(m.width, 0.0);
    assert!(m.height() > 0.0);
}

#[test]
fn shaped_glyphs_sit_inside_the_line_box() {
    let Some(mut e) = engine() else { return };
    let line = e.shape_line("Ag", 50.0).unwrap();
    assert_eq!(line.glyphs.len(), 2);
    for g in &line.glyphs {
        assert!((g.y - line.metrics.ascent).abs() < 0.5);
        assert!(g.x >= 0.0 && g.x <= line.metrics.width);
    }
    assert!(e.font_data().is_some());
    assert!(e.family().is_some());
}

/// Regular and bold faces of one installed family, when both exist.
fn regular_and_bold() -> Option<(FontFace, FontFace)> {
    let lib = FontLibrary::load(&[]);
    ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"]
        .into_iter()
        .find_map(|family| {
            let regular = lib.resolve(family, 400)?;
            let bold = lib.resolve(family, 700)?;
            (regular.cache_key() != bold.cache_key()).then_some((regular, bold))
        })
}

#[test]
fn switching_faces_of_one_family_shapes_with_the_active_face() {
    let Some((regular, bold)) = regular_and_bold() else {
        return;
    };
    let mut reused = TextEngine::new();
    reused.set_face(&regular).unwrap();
    let regular_width = reused.shape_line("Hello World", 40.0).unwrap().metrics.width;
    reused.set_face(&bold).unwrap();
    let reused_bold = reused.shape_line("Hello World", 40.0).unwrap();

    let mut fresh = TextEngine::new();
    fresh.set_face(&bold).unwrap();
    let fresh_bold = fresh.shape_line("Hello World", 40.0).unwrap();

    assert!((reused_bold.metrics.width - fresh_bold.metrics.width).abs() < 0.01);
    assert_ne!(regular_width, reused_bold.metrics.width);
    let ids = |l: &ShapedLine| l.glyphs.iter().map(|g| g.id).collect::<Vec<_>>();
    assert_eq!(ids(&reused_bold), ids(&fresh_bold));

    reused.set_face(&regular).unwrap();
    let back = reused.shape_line("Hello World", 40.0).unwrap().metrics.width;
    assert!((back - regular_width).abs() < 0.01);
}
