use super::*;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_registry").join(tag);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const GOOD: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"><text id="t" fill="#336699">Hi</text></svg>"##;

#[test]
fn bad_descriptor_is_skipped_and_reported() {
    let dir = temp_dir("skip");
    std::fs::write(dir.join("b-good.svg"), GOOD).unwrap();
    std::fs::write(dir.join("a-broken.svg"), "<svg><rect/></svg>").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let (registry, report) = StyleRegistry::load_dir(&dir).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("b-good"));
    assert_eq!(report.loaded, vec!["b-good".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].path.ends_with("a-broken.svg"));
    assert!(report.failed[0].message.contains("parse error"));
}

#[test]
fn missing_directory_is_an_error() {
    let err = StyleRegistry::load_dir(Path::new("target/definitely/not/here")).unwrap_err();
    assert!(err.to_string().contains("read style directory"));
}

#[test]
fn get_is_strict_and_pick_is_seeded() {
    let a = parse_descriptor("a", GOOD).unwrap();
    let b = parse_descriptor("b", GOOD).unwrap();
    let c = parse_descriptor("c", GOOD).unwrap();
    let registry = StyleRegistry::from_templates([c, a, b]);

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert!(matches!(
        registry.get("zzz").unwrap_err(),
        WordArtError::StyleNotFound(_)
    ));

    let first = registry.pick(&mut Rng64::new(9)).unwrap();
    let again = registry.pick(&mut Rng64::new(9)).unwrap();
    assert_eq!(first.name, again.name);

    assert!(StyleRegistry::default().pick(&mut Rng64::new(1)).is_none());
}
