use crate::benchmark::DEFAULT_ITERATIONS;
use crate::errors::{HistogramError, Result};
use crate::histogram::Strategy;
use crate::quantizer::{validate_divisions, DEFAULT_DIVISIONS};
use crate::worker_pool::default_thread_count;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Worker threads; `None` uses the hardware concurrency.
    pub threads: Option<usize>,
    /// Bins per channel.
    pub divisions: usize,
    pub iterations: usize,
    pub strategy: Strategy,
}

/// Per-run values from the command line. `None` keeps the loaded setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub threads: Option<usize>,
    pub divisions: Option<usize>,
    pub iterations: Option<usize>,
    pub strategy: Option<Strategy>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: None,
            divisions: DEFAULT_DIVISIONS,
            iterations: DEFAULT_ITERATIONS,
            strategy: Strategy::default(),
        }
    }
}

impl Settings {
    /// Location of the persisted settings file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "colorhist", "colorhist")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Loads the persisted settings, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("ignoring settings file: {}", e),
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HistogramError::Settings {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| HistogramError::Settings {
            message: format!("cannot parse {}: {}", path.display(), e),
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path().ok_or_else(|| HistogramError::Settings {
            message: "no config directory available".to_string(),
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HistogramError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| HistogramError::Settings {
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|source| HistogramError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies command-line values on top of file or default settings.
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(threads) = overrides.threads {
            self.threads = Some(threads);
        }
        if let Some(divisions) = overrides.divisions {
            self.divisions = divisions;
        }
        if let Some(iterations) = overrides.iterations {
            self.iterations = iterations;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        self
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(default_thread_count)
    }

    /// Rejects parameters before any work starts.
    pub fn validate(&self) -> Result<()> {
        if let Some(threads) = self.threads {
            if threads == 0 {
                return Err(HistogramError::InvalidThreadCount { threads });
            }
        }
        validate_divisions(self.divisions)?;
        if self.iterations == 0 {
            return Err(HistogramError::InvalidIterations {
                iterations: self.iterations,
            });
        }
        Ok(())
    }
}
