//! Builder for creating and configuring ProgressionEngine instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task;

use super::ProgressionEngine;
use crate::{
    clock::{Clock, SystemClock},
    db::Database,
    error::{ProgressionError, Result},
};

/// Builder for creating and configuring ProgressionEngine instances.
#[derive(Clone)]
pub struct ProgressionBuilder {
    database_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
}

impl ProgressionBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            clock: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/attune/attune.db` or `~/.local/share/attune/attune.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Injects the clock used for unlock evaluation.
    ///
    /// Defaults to [`SystemClock`]; tests inject
    /// [`FixedClock`](crate::clock::FixedClock) to pin time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the configured engine instance.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::FileSystem` if the database path is invalid
    /// Returns `ProgressionError::Database` if database initialization fails
    pub async fn build(self) -> Result<ProgressionEngine> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProgressionError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), ProgressionError>(())
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(ProgressionEngine::new(db_path, clock))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("attune")
            .place_data_file("attune.db")
            .map_err(|e| ProgressionError::XdgDirectory(e.to_string()))
    }
}

impl Default for ProgressionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
