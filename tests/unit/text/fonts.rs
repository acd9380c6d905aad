use super::*;

#[test]
fn system_library_resolves_a_fallback_face() {
    let lib = FontLibrary::load(&[]);
    if lib.is_empty() {
        eprintln!("no system fonts; skipping");
        return;
    }
    let face = lib.fallback().expect("fallback face");
    assert!(!face.data.is_empty());
    assert!(!face.family.is_empty());
    assert!(lib.families().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unknown_family_does_not_resolve() {
    let lib = FontLibrary::load(&[]);
    assert!(lib.resolve("Definitely Not An Installed Family 0xBEEF", 400).is_none());
}

#[test]
fn seeded_pick_is_reproducible() {
    let lib = FontLibrary::load(&[]);
    if lib.is_empty() {
        return;
    }
    let a = lib.pick(&mut Rng64::new(5)).unwrap();
    let b = lib.pick(&mut Rng64::new(5)).unwrap();
    assert_eq!(a.cache_key(), b.cache_key());
}

#[test]
fn empty_database_has_no_faces() {
    let lib = FontLibrary::from_database(usvg::fontdb::Database::new());
    assert!(lib.is_empty());
    assert!(lib.fallback().is_none());
    assert!(lib.pick(&mut Rng64::new(1)).is_none());
}
