use std::path::PathBuf;

use super::*;
use crate::style::descriptor::parse_descriptor;

const GOOD: &str =
    r##"<svg xmlns="http://www.w3.org/2000/svg"><text id="t" fill="#336699">Hi</text></svg>"##;

const MAPPING: &str = r#"{
  "color_style_mapping": {
    "red": ["fire", "missing-style"],
    "blue": ["ice"],
    "ultraviolet": ["fire"]
  },
  "style_descriptions": { "fire": "Hot gradient with a dark outline" }
}"#;

fn registry() -> StyleRegistry {
    StyleRegistry::from_templates(
        ["fire", "ice", "plain"].map(|n| parse_descriptor(n, GOOD).unwrap()),
    )
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_mapping").join(tag);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn parses_buckets_and_descriptions() {
    let m = ColorStyleMapping::from_json(MAPPING).unwrap();
    assert_eq!(m.candidates(ColorBucket::Red), ["fire", "missing-style"]);
    assert!(m.candidates(ColorBucket::Green).is_empty());
    assert_eq!(
        m.description("fire"),
        Some("Hot gradient with a dark outline")
    );
    assert_eq!(m.description("ice"), None);
}

#[test]
fn missing_file_is_config_missing_and_defaults_to_empty() {
    let path = PathBuf::from("target/unit_mapping/none/style_color_mapping.json");
    let err = ColorStyleMapping::load(&path).unwrap_err();
    assert!(matches!(err, WordArtError::ConfigMissing(_)));
    assert_eq!(
        ColorStyleMapping::load_or_default(&path),
        ColorStyleMapping::default()
    );
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = temp_dir("bad");
    let path = dir.join("map.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = ColorStyleMapping::load(&path).unwrap_err();
    assert!(matches!(err, WordArtError::Serde(_)));
    assert!(ColorStyleMapping::load_or_default(&path)
        .color_style_mapping
        .is_empty());
}

#[test]
fn selection_only_returns_registered_candidates() {
    let reg = registry();
    let m = ColorStyleMapping::from_json(MAPPING).unwrap();
    for seed in 1..50 {
        let mut rng = Rng64::new(seed);
        let style = select_style(&reg, &m, ColorBucket::Red, &mut rng).unwrap();
        assert_eq!(style.name, "fire");
    }
}

#[test]
fn unmapped_bucket_falls_back_to_whole_registry() {
    let reg = registry();
    let m = ColorStyleMapping::from_json(MAPPING).unwrap();
    let mut seen = std::collections::BTreeSet::new();
    for seed in 1..200 {
        let mut rng = Rng64::new(seed);
        let style = select_style(&reg, &m, ColorBucket::Green, &mut rng).unwrap();
        seen.insert(style.name.clone());
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn selection_is_seeded() {
    let reg = registry();
    let m = ColorStyleMapping::default();
    let a = select_style(&reg, &m, ColorBucket::Blue, &mut Rng64::new(9)).unwrap();
    let b = select_style(&reg, &m, ColorBucket::Blue, &mut Rng64::new(9)).unwrap();
    assert_eq!(a.name, b.name);
    assert!(select_style(&StyleRegistry::default(), &m, ColorBucket::Blue, &mut Rng64::new(9)).is_none());
}
