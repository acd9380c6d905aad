use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::math::Rng64;

/// Families tried, in order, when a style names a font that is not installed.
const FALLBACK_FAMILIES: [&str; 4] = ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

/// Raw bytes of one font face plus the family it was resolved under.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub family: String,
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

impl FontFace {
    /// Identity used by shaping caches.
    pub(crate) fn cache_key(&self) -> String {
        format!("{}#{}#{}", self.family, self.index, self.data.len())
    }
}

/// Read-only font discovery over a fontdb database (system fonts plus extra directories).
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<usvg::fontdb::Database>,
    families: Vec<String>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.db.len())
            .field("families", &self.families.len())
            .finish()
    }
}

impl Default for FontLibrary {
    /// An empty library with no faces.
    fn default() -> Self {
        Self::from_database(usvg::fontdb::Database::new())
    }
}

impl FontLibrary {
    /// System fonts plus every `*.ttf`/`*.otf`/`*.ttc` found directly in `dirs`.
    #[tracing::instrument(level = "debug", skip_all, fields(extra_dirs = dirs.len()))]
    pub fn load(dirs: &[PathBuf]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
            load_fonts_from_dir(&mut db, &dir.join("fonts"));
        }
        let lib = Self::from_database(db);
        tracing::debug!(faces = lib.db.len(), "font library ready");
        lib
    }

    pub fn from_database(db: usvg::fontdb::Database) -> Self {
        let mut families = db
            .faces()
            .filter_map(|f| f.families.first().map(|(name, _)| name.clone()))
            .collect::<Vec<_>>();
        families.sort();
        families.dedup();
        Self {
            db: Arc::new(db),
            families,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Distinct family names, sorted.
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Exact family lookup with weight matching; `None` when the family is not installed.
    pub fn resolve(&self, family: &str, weight: u16) -> Option<FontFace> {
        let families = [usvg::fontdb::Family::Name(family)];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(weight),
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.face(id)
    }

    /// A common sans face, then the generic sans-serif family, then any face at all.
    pub fn fallback(&self) -> Option<FontFace> {
        for family in FALLBACK_FAMILIES {
            if let Some(face) = self.resolve(family, 400) {
                return Some(face);
            }
        }
        let families = [usvg::fontdb::Family::SansSerif];
        let query = usvg::fontdb::Query {
            families: &families,
            ..usvg::fontdb::Query::default()
        };
        if let Some(face) = self.db.query(&query).and_then(|id| self.face(id)) {
            return Some(face);
        }
        let id = self.db.faces().next()?.id;
        self.face(id)
    }

    /// Seeded pick among installed families.
    pub fn pick(&self, rng: &mut Rng64) -> Option<FontFace> {
        let family = rng.pick(&self.families)?;
        self.resolve(family, 400).or_else(|| self.fallback())
    }

    fn face(&self, id: usvg::fontdb::ID) -> Option<FontFace> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))?;
        self.db.with_face_data(id, |data, index| FontFace {
            family,
            data: Arc::new(data.to_vec()),
            index,
        })
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
