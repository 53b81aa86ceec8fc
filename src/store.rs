//! Named project snapshots persisted as one JSON file
//!
//! The file holds a map of name -> `{name, timestamp, data}`. A missing file
//! is an empty store; every `save` rewrites the whole file.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ModelError, Result};
use crate::inputs::ModelInputs;

/// Default store location relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "data/projects.json";

/// Environment variable overriding [`DEFAULT_STORE_PATH`]
pub const STORE_PATH_ENV: &str = "DCF_STORE_PATH";

/// One saved project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub name: String,
    /// Save time, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    pub data: ModelInputs,
}

/// File-backed store of named projects
#[derive(Debug, Clone)]
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Store at `$DCF_STORE_PATH`, or [`DEFAULT_STORE_PATH`] when unset
    pub fn from_env() -> Self {
        match std::env::var(STORE_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::open(path),
            _ => Self::open(DEFAULT_STORE_PATH),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all saved projects, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.read_all()?.into_keys().collect())
    }

    /// Save (or overwrite) a project under `name`, stamped with the current time
    pub fn save(&self, name: &str, data: &ModelInputs) -> Result<SavedProject> {
        let mut projects = self.read_all()?;
        let project = SavedProject {
            name: name.to_string(),
            timestamp: Utc::now(),
            data: data.clone(),
        };
        projects.insert(name.to_string(), project.clone());
        self.write_all(&projects)?;

        info!("Saved project '{}' to {}", name, self.path.display());
        Ok(project)
    }

    pub fn load(&self, name: &str) -> Result<SavedProject> {
        self.read_all()?
            .remove(name)
            .ok_or_else(|| ModelError::ProjectNotFound(name.to_string()))
    }

    /// Every saved project, in name order
    pub fn load_all(&self) -> Result<Vec<SavedProject>> {
        Ok(self.read_all()?.into_values().collect())
    }

    fn read_all(&self) -> Result<BTreeMap<String, SavedProject>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn write_all(&self, projects: &BTreeMap<String, SavedProject>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, projects)?;
        writer.flush()?;
        Ok(())
    }
}
