//! Data directory access
//!
//! Layout:
//! - `<data_dir>/NNNN.json`: one file per year
//! - `<data_dir>/index.json`: derived index (name configurable)
//!
//! Reads are whole-file. Writes are atomic:
//! 1. Write to temp file
//! 2. fsync temp file
//! 3. Rename temp to final (atomic on POSIX)
//!
//! A crash at any point leaves either the previous file or the new file,
//! never a torn one.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::errors::{DatasetError, DatasetResult};
use super::source::SourceFile;
use crate::model::{is_year_file_name, year_file_name, year_from_file_name, IndexFile, YearFile};

/// Default index file name
pub const DEFAULT_INDEX_FILE: &str = "index.json";

/// Handle on a data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    index_file: String,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }

    /// Uses `name` instead of `index.json` for the index artifact.
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    pub fn index_file_name(&self) -> &str {
        &self.index_file
    }

    /// Names of all year files, sorted. Zero-padded names sort in year order.
    pub fn year_file_names(&self) -> DatasetResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| DatasetError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DatasetError::io(&self.root, e))?;
            if let Some(name) = entry.file_name().to_str() {
                if is_year_file_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads every year file. Unparseable content is kept as a malformed
    /// document; only I/O failures are errors.
    pub fn read_year_files(&self) -> DatasetResult<Vec<SourceFile>> {
        self.year_file_names()?
            .into_iter()
            .map(|name| self.read_source(&name))
            .collect()
    }

    /// Reads the index file, if one has been built.
    pub fn read_index(&self) -> DatasetResult<Option<SourceFile>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(None);
        }
        self.read_source(&self.index_file).map(Some)
    }

    fn read_source(&self, name: &str) -> DatasetResult<SourceFile> {
        let path = self.root.join(name);
        let bytes = fs::read(&path).map_err(|e| DatasetError::io(&path, e))?;
        Ok(SourceFile::from_bytes(name, &bytes))
    }

    /// Reads and decodes every year file, keyed by the year in its name.
    ///
    /// Unlike [`read_year_files`](Self::read_year_files), content that does
    /// not decode is an error, and so is a file whose declared `year`
    /// differs from its name: writing it back would replace another file.
    pub fn load_year_files(&self) -> DatasetResult<BTreeMap<i32, YearFile>> {
        let mut files = BTreeMap::new();
        for name in self.year_file_names()? {
            let Some(year) = year_from_file_name(&name) else {
                continue;
            };
            let path = self.root.join(&name);
            let bytes = fs::read(&path).map_err(|e| DatasetError::io(&path, e))?;
            let file: YearFile = serde_json::from_slice(&bytes)
                .map_err(|source| DatasetError::Decode { path: path.clone(), source })?;
            if file.year != year {
                return Err(DatasetError::YearConflict {
                    path,
                    declared: file.year,
                    owner: year_file_name(file.year),
                });
            }
            files.insert(year, file);
        }
        Ok(files)
    }

    /// Writes a year file atomically under its canonical name.
    pub fn write_year_file(&self, file: &YearFile) -> DatasetResult<PathBuf> {
        let path = self.root.join(file.file_name());
        write_json_atomic(&path, file)?;
        Ok(path)
    }

    /// Writes the index atomically.
    pub fn write_index(&self, index: &IndexFile) -> DatasetResult<PathBuf> {
        let path = self.index_path();
        write_json_atomic(&path, index)?;
        Ok(path)
    }
}

/// Serializes `value` as pretty JSON with a trailing newline and replaces
/// `path` atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> DatasetResult<()> {
    let mut content = serde_json::to_string_pretty(value).map_err(|source| DatasetError::Encode {
        what: path.display().to_string(),
        source,
    })?;
    content.push('\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| DatasetError::io(&temp_path, e))?;

    file.write_all(content.as_bytes())
        .map_err(|e| DatasetError::io(&temp_path, e))?;
    file.sync_all().map_err(|e| DatasetError::io(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| DatasetError::io(path, e))?;

    // fsync the directory so the rename itself is durable
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
