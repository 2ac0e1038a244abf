//! Broker definition loading from TOML files.
//!
//! This module handles loading broker definitions from the `broker-definitions/` directory.

use crate::{
    definition::BrokerDefinition,
    error::{BrokerError, Result},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loader for broker definitions from TOML files.
pub struct BrokerLoader {
    /// Base directory containing broker definitions
    definitions_dir: PathBuf,
}

impl BrokerLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the path doesn't exist or is not a directory.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(BrokerError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Directory this loader reads from.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Load all broker definitions from the definitions directory.
    ///
    /// Unparseable or invalid definitions are logged as warnings and skipped.
    /// When two files declare the same ID the first one read wins.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<BrokerDefinition>> {
        let mut definitions: Vec<BrokerDefinition> = Vec::new();

        for path in Self::collect_toml_files(&self.definitions_dir)? {
            let definition = match Self::load_from_path(&path) {
                Ok(definition) => definition,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load broker definition");
                    continue;
                }
            };

            if let Err(e) = definition.validate() {
                warn!(path = %path.display(), error = %e, "skipping invalid broker definition");
                continue;
            }

            if definitions.iter().any(|d| d.id() == definition.id()) {
                let e = BrokerError::Duplicate {
                    broker_id: definition.id().to_string(),
                };
                warn!(path = %path.display(), error = %e, "skipping broker definition");
                continue;
            }

            definitions.push(definition);
        }

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded broker definitions"
        );

        Ok(definitions)
    }

    /// Recursively collect `*.toml` files, sorted so load order is stable.
    fn collect_toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                files.extend(Self::collect_toml_files(&path)?);
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Load a broker definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<BrokerDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| BrokerError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| BrokerError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}
