//! Numbered list of still images.
//!
//! The catalog file holds one image name per line. Entries are presented
//! 1-based and resolve to `<image_dir>/<name>`.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ImageCatalog {
    image_dir: PathBuf,
    entries: Vec<String>,
}

impl ImageCatalog {
    pub fn load(catalog_path: &Path, image_dir: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(catalog_path)
            .with_context(|| format!("failed to read image catalog {}", catalog_path.display()))?;
        Self::parse(&raw, image_dir)
            .with_context(|| format!("invalid image catalog {}", catalog_path.display()))
    }

    pub fn parse(contents: &str, image_dir: &Path) -> Result<Self> {
        let entries: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if entries.is_empty() {
            return Err(anyhow!("image catalog has no entries"));
        }
        Ok(Self {
            image_dir: image_dir.to_path_buf(),
            entries,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `"<n>: <name>"` lines for a selection prompt.
    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}: {}", i + 1, name))
            .collect()
    }

    /// Path of the 1-based entry `number`.
    pub fn resolve(&self, number: usize) -> Result<PathBuf> {
        let name = number
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .ok_or_else(|| {
                anyhow!(
                    "catalog entry {} out of range (1-{})",
                    number,
                    self.entries.len()
                )
            })?;
        Ok(self.image_dir.join(name))
    }
}
