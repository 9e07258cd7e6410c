use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::Table;
use crate::error::Result;

/// Entries kept by [`TableCache::new`].
pub const DEFAULT_CAPACITY: usize = 16;

struct CachedTable {
    modified: Option<SystemTime>,
    table: Arc<Table>,
}

/// Loaded tables keyed by path.
///
/// An entry is reused only while the file's modification time is unchanged,
/// so a hit always returns what a fresh load would. A failed load drops any
/// entry held for that path. Past `capacity` entries the oldest insertion is
/// evicted.
pub struct TableCache {
    entries: HashMap<PathBuf, CachedTable>,
    order: VecDeque<PathBuf>,
    capacity: usize,
}

impl Default for TableCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` tables (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<Arc<Table>> {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if let Some(entry) = self.entries.get(path) {
            if entry.modified.is_some() && entry.modified == modified {
                log::debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = match load_file(path) {
            Ok(table) => Arc::new(table),
            Err(e) => {
                self.invalidate(path);
                return Err(e);
            }
        };
        self.insert(path, modified, Arc::clone(&table));
        Ok(table)
    }

    fn insert(&mut self, path: &Path, modified: Option<SystemTime>, table: Arc<Table>) {
        let entry = CachedTable { modified, table };
        if self.entries.insert(path.to_path_buf(), entry).is_some() {
            return;
        }
        self.order.push_back(path.to_path_buf());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                log::debug!("cache evicting {}", oldest.display());
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn invalidate(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            self.order.retain(|p| p != path);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
