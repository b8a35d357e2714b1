use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelKarma {
    pub base: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One `levels/*.yaml` file.
///
/// Only `level` is required: the loader sorts on it. The remaining fields are
/// optional so that the level-config checks can name the file that lacks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub karma: Option<LevelKarma>,
    #[serde(default)]
    pub rules: Option<serde_yaml::Value>,
    #[serde(default)]
    pub validation: Option<Vec<serde_yaml::Value>>,
}

impl LevelDefinition {
    /// Parse a single level document held in memory.
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error for malformed YAML or a missing
    /// `level` number.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Base karma reward, if the level declares one.
    #[must_use]
    pub fn base_karma(&self) -> Option<f64> {
        self.karma.as_ref().map(|karma| karma.base)
    }
}

fn is_level_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Load every level definition in `dir`, sorted by level number.
///
/// Files without a `.yaml`/`.yml` extension are skipped.
///
/// # Errors
///
/// [`LoadError::Io`] if the directory or one of its level files cannot be
/// read, [`LoadError::Yaml`] naming the first file that fails to parse.
pub fn load_levels(dir: &Path) -> Result<Vec<LevelDefinition>, LoadError> {
    log::debug!("scanning level directory {}", dir.display());
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::io(dir, source))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::io(dir, source))?;
        let path = entry.path();
        if is_level_file(&path) {
            paths.push(path);
        } else {
            log::debug!("ignoring non-level file {}", path.display());
        }
    }
    // Directory order is platform dependent; parse in a stable order so the
    // first reported error is reproducible.
    paths.sort();

    let mut levels = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = std::fs::read_to_string(&path).map_err(|source| LoadError::io(&path, source))?;
        let level =
            LevelDefinition::from_yaml(&raw).map_err(|source| LoadError::Yaml { path, source })?;
        levels.push(level);
    }
    levels.sort_by_key(|level| level.level);

    log::info!(
        "loaded {} level definitions from {}",
        levels.len(),
        dir.display()
    );
    Ok(levels)
}
