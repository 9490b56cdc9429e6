//! Ordered level catalog
//!
//! Levels are played in file-name order (`level00`, `level01`, ...). The
//! built-in set is compiled into the binary so the game and the tests run
//! without touching the filesystem; a directory of level files can replace
//! it on native targets.

use std::path::{Path, PathBuf};
use super::descriptor::LevelDescriptor;
use super::level::{load_descriptor, load_descriptor_from_str, ConfigError};

/// Level files shipped with the game, in play order.
const BUILTIN_LEVELS: [(&str, &str); 3] = [
    ("level00", include_str!("../../assets/levels/level00.ron")),
    ("level01", include_str!("../../assets/levels/level01.ron")),
    ("level02", include_str!("../../assets/levels/level02.ron")),
];

/// Metadata about a level file (without loading it)
#[derive(Debug, Clone)]
pub struct LevelInfo {
    /// Display name (filename without extension)
    pub name: String,
    pub path: PathBuf,
}

/// Find level files (`.ron` or `.json`) in a directory, sorted by name.
pub fn discover_levels(dir: &Path) -> Vec<LevelInfo> {
    let mut levels = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_level = path
                .extension()
                .map(|e| e == "ron" || e == "json")
                .unwrap_or(false);
            if path.is_file() && is_level {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                levels.push(LevelInfo { name, path });
            }
        }
    }

    levels.sort_by(|a, b| a.name.cmp(&b.name));
    levels
}

#[derive(Debug, Clone)]
pub struct LevelCatalog {
    names: Vec<String>,
    levels: Vec<LevelDescriptor>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<(String, LevelDescriptor)>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyCatalog(PathBuf::from("<memory>")));
        }
        let (names, levels) = levels.into_iter().unzip();
        Ok(Self { names, levels })
    }

    /// The levels compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        let levels = BUILTIN_LEVELS
            .iter()
            .map(|(name, text)| {
                load_descriptor_from_str(text)
                    .map(|desc| (name.to_string(), desc))
                    .map_err(|e| {
                        log::error!("built-in level {} is broken: {}", name, e);
                        e
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// Load every level file in `dir`. Any broken file fails the whole load.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let infos = discover_levels(dir);
        if infos.is_empty() {
            return Err(ConfigError::EmptyCatalog(dir.to_path_buf()));
        }
        let mut levels = Vec::with_capacity(infos.len());
        for info in infos {
            let desc = load_descriptor(&info.path)?;
            levels.push((info.name, desc));
        }
        log::info!("loaded {} levels from {}", levels.len(), dir.display());
        Self::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by index; indices past the end wrap around.
    pub fn get(&self, index: usize) -> &LevelDescriptor {
        &self.levels[index % self.levels.len()]
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index % self.names.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::save_descriptor;

    #[test]
    fn test_builtin_levels_load() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.name(0), "level00");
    }

    #[test]
    fn test_get_wraps() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.get(3), catalog.get(0));
        assert_eq!(catalog.name(4), "level01");
    }

    #[test]
    fn test_empty_catalog_is_error() {
        assert!(matches!(LevelCatalog::new(Vec::new()), Err(ConfigError::EmptyCatalog(_))));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(LevelCatalog::load_dir(dir.path()), Err(ConfigError::EmptyCatalog(_))));
    }

    #[test]
    fn test_load_dir_orders_by_name() {
        let builtin = LevelCatalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        save_descriptor(builtin.get(1), dir.path().join("b.ron"), false).unwrap();
        save_descriptor(builtin.get(0), dir.path().join("a.ron"), true).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = LevelCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(0), "a");
        assert_eq!(catalog.get(0), builtin.get(0));
        assert_eq!(catalog.get(1), builtin.get(1));
    }
}
