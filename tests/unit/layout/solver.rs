use super::*;

/// Monospace stand-in: every char advances `per_char * size`.
struct FixedAdvance {
    per_char: f32,
}

impl TextMeasure for FixedAdvance {
    fn measure(&mut self, text: &str, font_size: f32) -> WordArtResult<LineMetrics> {
        Ok(LineMetrics {
            width: text.chars().count() as f32 * self.per_char * font_size,
            ascent: 0.8 * font_size,
            descent: 0.2 * font_size,
        })
    }
}

fn mono() -> FixedAdvance {
    FixedAdvance { per_char: 0.6 }
}

fn request(text: &str, w: u32, h: u32, margins: Margins) -> LayoutRequest<'_> {
    LayoutRequest {
        text,
        canvas: Canvas {
            width: w,
            height: h,
        },
        margins,
        font_size: None,
        options: FitOptions::default(),
    }
}

fn contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 - 1e-6
        && inner.y0 >= outer.y0 - 1e-6
        && inner.x1 <= outer.x1 + 1e-6
        && inner.y1 <= outer.y1 + 1e-6
}

#[test]
fn safe_area_floors_margins() {
    let area = safe_area(
        Canvas {
            width: 800,
            height: 450,
        },
        Margins::default(),
    )
    .unwrap();
    assert_eq!(area, Rect::new(80.0, 112.0, 720.0, 383.0));
}

#[test]
fn degenerate_safe_area_is_a_layout_error() {
    let margins = Margins {
        left: 0.5,
        right: 0.5,
        ..Margins::uniform(0.1)
    };
    let err = solve_layout(&mut mono(), &request("Hi", 100, 100, margins)).unwrap_err();
    assert!(matches!(err, WordArtError::Layout(_)));

    let margins = Margins {
        top: 0.5,
        bottom: 0.5,
        ..Margins::uniform(0.1)
    };
    let err = solve_layout(&mut mono(), &request("Hi", 100, 100, margins)).unwrap_err();
    assert!(matches!(err, WordArtError::Layout(_)));
}

#[test]
fn out_of_range_margin_is_rejected() {
    let margins = Margins {
        top: 1.0,
        ..Margins::uniform(0.0)
    };
    let err = solve_layout(&mut mono(), &request("Hi", 100, 100, margins)).unwrap_err();
    assert!(err.to_string().contains("top margin"));
}

#[test]
fn picks_largest_fitting_size_and_wraps() {
    let out = solve_layout(
        &mut mono(),
        &request("Hello World", 800, 450, Margins::default()),
    )
    .unwrap();
    assert_eq!(out.font_size, 123.0);
    let texts: Vec<&str> = out.runs().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", "World"]);
    assert!(out.fits);
    assert!(contains(out.safe_area, out.bounds));
}

#[test]
fn lines_and_block_are_centered() {
    let out = solve_layout(
        &mut mono(),
        &request("one two three four", 600, 400, Margins::uniform(0.1)),
    )
    .unwrap();
    let cx = out.safe_area.center().x;
    for run in out.runs() {
        assert!((run.rect().center().x - cx).abs() < 1e-6);
    }
    assert!((out.bounds.center().y - out.safe_area.center().y).abs() < 1e-6);
}

#[test]
fn block_stays_inside_safe_area_across_margins() {
    let texts = ["Hi", "Hello World", "The quick brown fox jumps", "a\nb c\nd"];
    let steps = [0.0f32, 0.1, 0.2, 0.3, 0.45];
    for text in texts {
        for &t in &steps {
            for &s in &steps {
                let margins = Margins {
                    top: t,
                    bottom: s,
                    left: s,
                    right: t,
                };
                let out = solve_layout(&mut mono(), &request(text, 640, 480, margins)).unwrap();
                assert!(out.fits, "{text:?} {margins:?}");
                assert!(contains(out.safe_area, out.bounds), "{text:?} {margins:?}");
                let sizes: Vec<f32> = out.runs().map(|r| r.font_size).collect();
                assert!(sizes.iter().all(|s| *s == out.font_size));
            }
        }
    }
}

#[test]
fn long_word_is_placed_unsplit_without_error() {
    let word = "Supercalifragilisticexpialidocious";
    let margins = Margins {
        left: 0.125,
        right: 0.125,
        ..Margins::uniform(0.1)
    };
    let mut req = request(word, 400, 200, margins);
    req.options.min_size = 20;
    let out = solve_layout(&mut mono(), &req).unwrap();
    assert_eq!(out.safe_area.width(), 300.0);
    assert_eq!(out.font_size, 20.0);
    assert!(!out.fits);
    assert_eq!(out.lines.len(), 1);
    let run = &out.lines[0].runs[0];
    assert_eq!(run.text, word);
    assert!((run.rect().center().x - out.safe_area.center().x).abs() < 1e-6);
}

#[test]
fn explicit_newlines_always_break() {
    let out = solve_layout(
        &mut mono(),
        &request("top\n\nbottom", 800, 800, Margins::uniform(0.1)),
    )
    .unwrap();
    let texts: Vec<&str> = out.runs().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["top", "", "bottom"]);
}

#[test]
fn explicit_size_skips_search() {
    let mut req = request("Hello World", 800, 450, Margins::default());
    req.font_size = Some(40.0);
    let out = solve_layout(&mut mono(), &req).unwrap();
    assert_eq!(out.font_size, 40.0);
    assert_eq!(out.lines.len(), 1);

    req.font_size = Some(0.0);
    assert!(solve_layout(&mut mono(), &req).is_err());
}

#[test]
fn balanced_wrap_uses_word_count_rule() {
    let mut req = request("a b c d e", 2000, 2000, Margins::uniform(0.1));
    req.options.wrap = WrapMode::Balanced;
    let out = solve_layout(&mut mono(), &req).unwrap();
    let texts: Vec<&str> = out.runs().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["a b", "c d", "e"]);

    assert_eq!(balanced(&["x", "y"]), vec!["x y".to_string()]);
    assert_eq!(balanced(&["1", "2", "3", "4", "5", "6", "7", "8"]).len(), 4);
}

#[test]
fn blank_text_lays_out_to_nothing() {
    let out = solve_layout(&mut mono(), &request("  \n ", 200, 200, Margins::uniform(0.1)))
        .unwrap();
    assert!(out.lines.is_empty());
    assert!(out.is_empty());
}

#[test]
fn baseline_sits_at_ascent_below_anchor() {
    let out = solve_layout(&mut mono(), &request("Hi", 300, 300, Margins::uniform(0.1))).unwrap();
    let run = &out.lines[0].runs[0];
    assert!((run.baseline_y - run.anchor.y - 0.8 * f64::from(out.font_size)).abs() < 1e-3);
}
