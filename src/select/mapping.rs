use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{WordArtError, WordArtResult};
use crate::foundation::math::Rng64;
use crate::select::color::ColorBucket;
use crate::style::model::StyleTemplate;
use crate::style::registry::StyleRegistry;

/// Bucket -> candidate style names, plus optional human-readable style descriptions.
///
/// Bucket keys stay as strings so unknown colors in a hand-edited file do not reject the whole
/// mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColorStyleMapping {
    #[serde(default)]
    pub color_style_mapping: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub style_descriptions: BTreeMap<String, String>,
}

impl ColorStyleMapping {
    /// Read a mapping file.
    ///
    /// A missing file is `ConfigMissing`; malformed JSON is `Serde`.
    pub fn load(path: &Path) -> WordArtResult<Self> {
        if !path.exists() {
            return Err(WordArtError::config_missing(format!(
                "color mapping '{}' does not exist",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read color mapping '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> WordArtResult<Self> {
        let mapping: Self = serde_json::from_str(text)
            .map_err(|e| WordArtError::serde(format!("color mapping: {e}")))?;
        for key in mapping.color_style_mapping.keys() {
            if key.parse::<ColorBucket>().is_err() {
                tracing::warn!(bucket = %key, "color mapping names an unknown color bucket");
            }
        }
        Ok(mapping)
    }

    /// Like [`ColorStyleMapping::load`], but an absent or unreadable file becomes an empty
    /// mapping, which leaves style selection unfiltered.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(m) => {
                tracing::info!(
                    path = %path.display(),
                    buckets = m.color_style_mapping.len(),
                    "loaded color mapping"
                );
                m
            }
            Err(WordArtError::ConfigMissing(msg)) => {
                tracing::warn!("{msg}; color matching will pick from all styles");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring color mapping");
                Self::default()
            }
        }
    }

    /// Configured style names for `bucket`, in file order.
    pub fn candidates(&self, bucket: ColorBucket) -> &[String] {
        self.color_style_mapping
            .iter()
            .find(|(k, _)| k.parse::<ColorBucket>().is_ok_and(|b| b == bucket))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn description(&self, style: &str) -> Option<&str> {
        self.style_descriptions.get(style).map(String::as_str)
    }
}

/// Seeded pick among the styles mapped to `bucket` that the registry actually holds.
///
/// When none are configured or none are registered, picks from the whole registry.
pub fn select_style(
    registry: &StyleRegistry,
    mapping: &ColorStyleMapping,
    bucket: ColorBucket,
    rng: &mut Rng64,
) -> Option<Arc<StyleTemplate>> {
    let present: Vec<&str> = mapping
        .candidates(bucket)
        .iter()
        .map(String::as_str)
        .filter(|name| registry.contains(name))
        .collect();
    match rng.pick(&present) {
        Some(name) => {
            tracing::debug!(bucket = %bucket, style = name, "color-matched style");
            registry.get(name).ok()
        }
        None => {
            tracing::debug!(bucket = %bucket, "no mapped style registered; picking from all");
            registry.pick(rng)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/select/mapping.rs"]
mod tests;
