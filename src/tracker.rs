//! Which catalog entries have been posted.
//!
//! The posted set is a JSON list of catalog indices. Once every index is in
//! it, the set is cleared and selection starts again from the top. A lost or
//! corrupt file means repeats, never a crash.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::app::{NectarError, Result};
use crate::domain::{CatalogEntry, Theme, VerseReference};
use crate::store::write_atomic;

/// The entry chosen for the next post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub reference: VerseReference,
    pub theme: Theme,
}

pub struct SelectionTracker {
    path: Option<PathBuf>,
    catalog: Vec<CatalogEntry>,
    posted: Mutex<Vec<usize>>,
}

impl SelectionTracker {
    pub fn open<P: AsRef<Path>>(path: P, catalog: Vec<CatalogEntry>) -> Self {
        let path = path.as_ref().to_path_buf();
        let posted = Self::load(&path);

        Self {
            path: Some(path),
            catalog,
            posted: Mutex::new(posted),
        }
    }

    pub fn in_memory(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            path: None,
            catalog,
            posted: Mutex::new(Vec::new()),
        }
    }

    fn load(path: &Path) -> Vec<usize> {
        if !path.exists() {
            return Vec::new();
        }

        match fs::read_to_string(path)
            .map_err(NectarError::from)
            .and_then(|content| Ok(serde_json::from_str::<Vec<usize>>(&content)?))
        {
            Ok(posted) => posted,
            Err(e) => {
                tracing::warn!("Posted list {} unusable, starting empty: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<usize>> {
        self.posted.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, posted: &[usize]) -> Result<()> {
        match &self.path {
            Some(path) => write_atomic(path, &serde_json::to_string(posted)?),
            None => Ok(()),
        }
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn posted_count(&self) -> usize {
        self.lock().len()
    }

    fn selection(&self, index: usize) -> Result<Selection> {
        let entry = self.catalog[index];
        Ok(Selection {
            index,
            reference: entry.reference()?,
            theme: entry.theme,
        })
    }

    fn first_unposted(&self, posted: &[usize]) -> Option<usize> {
        (0..self.catalog.len()).find(|i| !posted.contains(i))
    }

    /// The entry `next` would return, without resetting anything.
    pub fn peek(&self) -> Option<Selection> {
        let posted = self.lock();
        let index = match self.first_unposted(&posted) {
            Some(index) => index,
            None if !self.catalog.is_empty() => 0,
            None => return None,
        };
        self.selection(index).ok()
    }

    /// Pick the first catalog entry not yet posted. When every entry has
    /// been posted the set is cleared first.
    pub fn next(&self) -> Result<Selection> {
        if self.catalog.is_empty() {
            return Err(NectarError::Other("verse catalog is empty".into()));
        }

        let mut posted = self.lock();
        let index = match self.first_unposted(&posted) {
            Some(index) => index,
            None => {
                tracing::info!(
                    "All {} catalog verses posted, starting over",
                    self.catalog.len()
                );
                posted.clear();
                if let Err(e) = self.save(&posted) {
                    tracing::warn!("Could not persist posted-list reset: {}", e);
                }
                0
            }
        };

        self.selection(index)
    }

    /// Record a confirmed post and persist the set.
    pub fn mark_posted(&self, index: usize) -> Result<()> {
        if index >= self.catalog.len() {
            return Err(NectarError::Other(format!(
                "catalog index {} out of range (catalog has {} entries)",
                index,
                self.catalog.len()
            )));
        }

        let mut posted = self.lock();
        if !posted.contains(&index) {
            posted.push(index);
        }
        self.save(&posted)
    }
}
