use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(WordArtError::parse("x").to_string().contains("parse error:"));
    assert!(WordArtError::layout("x").to_string().contains("layout error:"));
    assert!(WordArtError::render("x").to_string().contains("render error:"));
    assert!(
        WordArtError::style_not_found("neon")
            .to_string()
            .contains("style not found: neon")
    );
    assert!(
        WordArtError::config_missing("x")
            .to_string()
            .contains("configuration missing:")
    );
    assert!(
        WordArtError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WordArtError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WordArtError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
