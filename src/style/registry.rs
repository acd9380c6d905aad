use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{WordArtError, WordArtResult};
use crate::foundation::math::Rng64;
use crate::style::descriptor::parse_descriptor;
use crate::style::model::StyleTemplate;

/// A descriptor that failed to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Diagnostics gathered while building a registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<LoadFailure>,
}

/// Immutable name -> template map, built once and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    styles: BTreeMap<String, Arc<StyleTemplate>>,
}

impl StyleRegistry {
    /// Build from already-parsed templates. Later duplicates replace earlier ones.
    pub fn from_templates(templates: impl IntoIterator<Item = StyleTemplate>) -> Self {
        let styles = templates
            .into_iter()
            .map(|t| (t.name.clone(), Arc::new(t)))
            .collect();
        Self { styles }
    }

    /// Parse every `*.svg` in `dir`, naming each style after its file stem.
    ///
    /// A descriptor that fails to parse is logged and recorded in the report; the rest still load.
    /// Only failure to read the directory itself is an error.
    #[tracing::instrument(level = "info", skip_all, fields(dir = %dir.display()))]
    pub fn load_dir(dir: &Path) -> WordArtResult<(Self, LoadReport)> {
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("read style directory '{}'", dir.display()))?;

        let mut paths = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut styles = BTreeMap::new();
        let mut report = LoadReport::default();
        for path in paths {
            match load_file(&path) {
                Ok(t) => {
                    report.loaded.push(t.name.clone());
                    styles.insert(t.name.clone(), Arc::new(t));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping style descriptor");
                    report.failed.push(LoadFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "style registry built"
        );
        Ok((Self { styles }, report))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Strict lookup.
    pub fn get(&self, name: &str) -> WordArtResult<Arc<StyleTemplate>> {
        self.styles
            .get(name)
            .cloned()
            .ok_or_else(|| WordArtError::style_not_found(name))
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StyleTemplate>> {
        self.styles.values()
    }

    /// Seeded uniform pick over the whole registry.
    pub fn pick(&self, rng: &mut Rng64) -> Option<Arc<StyleTemplate>> {
        let idx = rng.next_index(self.styles.len())?;
        self.styles.values().nth(idx).cloned()
    }
}

fn load_file(path: &Path) -> WordArtResult<StyleTemplate> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| WordArtError::parse("descriptor file name is not valid UTF-8"))?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read style descriptor '{}'", path.display()))?;
    parse_descriptor(name, &text)
}

#[cfg(test)]
#[path = "../../tests/unit/style/registry.rs"]
mod tests;
