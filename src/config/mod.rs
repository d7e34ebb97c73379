//! @acp:module "Configuration"
//! @acp:summary "Display configuration loading and defaults"
//! @acp:domain symbology
//! @acp:layer config

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::mariner::{MarinerSnapshot, MarinerStore};
use crate::rules::{DisplayCategory, RuleRepository};

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_category() -> DisplayCategory {
    DisplayCategory::Standard
}

/// @acp:summary "Mariner defaults, display filters and the presentation library path"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbologyConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Initial mariner parameters
    #[serde(default)]
    pub mariner: MarinerSnapshot,

    /// Most cluttered display category shown
    #[serde(default = "default_category")]
    pub display_category: DisplayCategory,

    /// Object classes hidden regardless of category
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed_classes: Vec<String>,

    /// Repository snapshot to load, relative to the working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,

    /// Finalize every object right after a cell load
    #[serde(default)]
    pub eager_finalize: bool,
}

impl Default for SymbologyConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            mariner: MarinerSnapshot::default(),
            display_category: default_category(),
            suppressed_classes: Vec::new(),
            library: None,
            eager_finalize: false,
        }
    }
}

impl SymbologyConfig {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Load, falling back to defaults when the file is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default symbology config: {:#}", e);
                Self::default()
            }
        }
    }

    /// Parameter store seeded from this config
    pub fn mariner_store(&self) -> MarinerStore {
        let mut store = MarinerStore::new(self.mariner);
        store.set_display_category(self.display_category);
        for class in &self.suppressed_classes {
            store.suppress_class(class);
        }
        store
    }

    /// Load and validate the configured presentation library, if any
    pub fn load_repository(&self) -> anyhow::Result<Option<RuleRepository>> {
        let Some(path) = &self.library else {
            return Ok(None);
        };
        let repo = RuleRepository::from_json(path)
            .with_context(|| format!("Failed to load presentation library {}", path.display()))?;
        Ok(Some(repo))
    }
}
