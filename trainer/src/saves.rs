//! Generation-numbered save files
//!
//! Each save is `generation_NNNN.bin` in one directory. The highest number is
//! the latest; a resumed session keeps counting from there.

use std::fs;
use std::path::{Path, PathBuf};

use crate::TrainerError;

const PREFIX: &str = "generation_";
const EXTENSION: &str = "bin";

#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Use `dir` for saves, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TrainerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TrainerError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, generation: u32) -> PathBuf {
        self.dir.join(format!("{PREFIX}{generation:04}.{EXTENSION}"))
    }

    /// Every save file found in the directory with its generation, ascending.
    ///
    /// Names are matched loosely (`generation_7.bin` counts as 7), so callers
    /// act on these paths rather than rebuilding them with `path_for`.
    pub fn entries(&self) -> Result<Vec<(u32, PathBuf)>, TrainerError> {
        let dir = fs::read_dir(&self.dir).map_err(|source| self.io_error(source))?;
        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|source| self.io_error(source))?;
            if let Some(generation) = entry.file_name().to_str().and_then(parse_generation) {
                entries.push((generation, entry.path()));
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Every saved generation, ascending
    pub fn generations(&self) -> Result<Vec<u32>, TrainerError> {
        let mut generations: Vec<u32> = self.entries()?.into_iter().map(|(n, _)| n).collect();
        generations.dedup();
        Ok(generations)
    }

    pub fn latest(&self) -> Result<Option<u32>, TrainerError> {
        Ok(self.generations()?.last().copied())
    }

    /// Write a save, replacing any file for the same generation
    pub fn write(&self, generation: u32, bytes: &[u8]) -> Result<PathBuf, TrainerError> {
        let path = self.path_for(generation);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|source| TrainerError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| TrainerError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Read a generation, preferring the canonical file name when several match
    pub fn read(&self, generation: u32) -> Result<Vec<u8>, TrainerError> {
        let canonical = self.path_for(generation);
        let path = if canonical.exists() {
            canonical
        } else {
            self.entries()?
                .into_iter()
                .find(|(n, _)| *n == generation)
                .map_or(canonical, |(_, path)| path)
        };
        fs::read(&path).map_err(|source| TrainerError::Io { path, source })
    }

    /// Remove every generation file; returns how many were removed
    pub fn delete_all(&self) -> Result<usize, TrainerError> {
        let entries = self.entries()?;
        for (_, path) in &entries {
            fs::remove_file(path).map_err(|source| TrainerError::Io {
                path: path.clone(),
                source,
            })?;
        }
        Ok(entries.len())
    }

    fn io_error(&self, source: std::io::Error) -> TrainerError {
        TrainerError::Io {
            path: self.dir.clone(),
            source,
        }
    }
}

/// `generation_0012.bin` -> 12
fn parse_generation(name: &str) -> Option<u32> {
    name.strip_prefix(PREFIX)?
        .strip_suffix(EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}
