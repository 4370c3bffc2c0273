//! Configuration du Mapper (fichier YAML optionnel)

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::updater::UpdaterKind;

/// Nom du fichier cherché dans le répertoire courant
pub const DEFAULT_CONFIG_FILE: &str = "automap.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Stratégie utilisée par `Mapper::map`
    #[serde(default)]
    pub default_updater: UpdaterKind,

    /// Transmis aux AutoMap créés par `Mapper::auto_map`
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Signaler qu'un enregistrement en remplace un autre
    #[serde(default = "default_true")]
    pub warn_on_overwrite: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            default_updater: UpdaterKind::default(),
            strict: default_true(),
            warn_on_overwrite: default_true(),
        }
    }
}

impl MapperConfig {
    /// Charge le fichier donné, sinon `automap.yml` s'il existe, sinon les défauts
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::read(config_path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::read(&default_path);
        }

        Ok(MapperConfig::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MapperConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
