//! Catalog scanning: the navigable tree of folders and spreadsheet files.
//!
//! The walk is bottom-up: a folder is only emitted once its children are
//! known, and dropped when nothing below it is a recognized file. Entries are
//! sorted by name at every level.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{default_extensions, DashboardConfig};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// CatalogNode
// ---------------------------------------------------------------------------

/// One entry of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogNode {
    /// Never empty: folders without recognized files below them are pruned.
    Folder {
        name: String,
        children: Vec<CatalogNode>,
    },
    File { name: String, path: PathBuf },
}

impl CatalogNode {
    pub fn name(&self) -> &str {
        match self {
            CatalogNode::Folder { name, .. } | CatalogNode::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, CatalogNode::Folder { .. })
    }
}

/// Depth-first iterator over every file node of a catalog, in display order.
pub struct Files<'a> {
    stack: Vec<std::slice::Iter<'a, CatalogNode>>,
}

impl<'a> Iterator for Files<'a> {
    type Item = (&'a str, &'a Path);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(CatalogNode::File { name, path }) => {
                    return Some((name.as_str(), path.as_path()))
                }
                Some(CatalogNode::Folder { children, .. }) => self.stack.push(children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Iterate over all files of a catalog.
pub fn files(nodes: &[CatalogNode]) -> Files<'_> {
    Files {
        stack: vec![nodes.iter()],
    }
}

pub fn file_count(nodes: &[CatalogNode]) -> usize {
    files(nodes).count()
}

/// Find the catalog file whose path equals `path`.
pub fn find_file<'a>(nodes: &'a [CatalogNode], path: &Path) -> Option<&'a Path> {
    files(nodes).map(|(_, p)| p).find(|p| *p == path)
}

/// Indented text outline of the catalog, one entry per line.
pub fn outline(nodes: &[CatalogNode]) -> String {
    fn walk(nodes: &[CatalogNode], level: usize, out: &mut String) {
        for node in nodes {
            let indent = "  ".repeat(level);
            match node {
                CatalogNode::Folder { name, children } => {
                    let _ = writeln!(out, "{indent}{name}/");
                    walk(children, level + 1, out);
                }
                CatalogNode::File { name, .. } => {
                    let _ = writeln!(out, "{indent}{name}");
                }
            }
        }
    }
    let mut out = String::new();
    walk(nodes, 0, &mut out);
    out
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Recursive catalog scanner.
#[derive(Debug, Clone)]
pub struct Scanner {
    extensions: Vec<String>,
    max_depth: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_depth: 32,
        }
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            max_depth: config.max_depth,
        }
    }

    /// Replace the recognized extensions (case-insensitive, no leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether a file name ends with one of the recognized extensions.
    ///
    /// Matching is on the name suffix, so a file named exactly `.xlsx` is
    /// recognized too.
    pub fn is_recognized(&self, file_name: &str) -> bool {
        let name = file_name.to_ascii_lowercase();
        self.extensions.iter().any(|known| {
            name.len() > known.len()
                && name.ends_with(known.as_str())
                && name[..name.len() - known.len()].ends_with('.')
        })
    }

    /// Scan `base` and return its pruned, sorted catalog.
    ///
    /// Only a failure to read `base` itself is an error; unreadable
    /// sub-directories are skipped.
    pub fn scan(&self, base: &Path) -> Result<Vec<CatalogNode>> {
        let mut ancestors = HashSet::new();
        if let Ok(canonical) = fs::canonicalize(base) {
            ancestors.insert(canonical);
        }
        let entries = sorted_entries(base).map_err(|e| Error::io(base, e))?;
        let nodes = self.scan_entries(entries, 0, &mut ancestors);
        log::debug!(
            "scanned {}: {} files",
            base.display(),
            file_count(&nodes)
        );
        Ok(nodes)
    }

    fn scan_entries(
        &self,
        entries: Vec<(String, PathBuf)>,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
    ) -> Vec<CatalogNode> {
        let mut nodes = Vec::new();
        for (name, path) in entries {
            // `metadata` follows symlinks, so linked folders and files count.
            let Ok(metadata) = fs::metadata(&path) else {
                log::debug!("skipping {}: not accessible", path.display());
                continue;
            };

            if metadata.is_dir() {
                if let Some(children) = self.scan_dir(&path, depth + 1, ancestors) {
                    if !children.is_empty() {
                        nodes.push(CatalogNode::Folder { name, children });
                    }
                }
            } else if metadata.is_file() && self.is_recognized(&name) {
                nodes.push(CatalogNode::File { name, path });
            }
        }
        nodes
    }

    fn scan_dir(
        &self,
        path: &Path,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
    ) -> Option<Vec<CatalogNode>> {
        if depth > self.max_depth {
            log::warn!(
                "not descending into {}: depth limit {} reached",
                path.display(),
                self.max_depth
            );
            return None;
        }

        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !ancestors.insert(canonical.clone()) {
            log::warn!("skipping {}: directory cycle", path.display());
            return None;
        }

        let children = match sorted_entries(path) {
            Ok(entries) => Some(self.scan_entries(entries, depth, ancestors)),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                None
            }
        };
        ancestors.remove(&canonical);
        children
    }
}

/// List a directory as `(file name, full path)` pairs sorted by name.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut entries: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Scan `base` with the default recognized extensions.
pub fn scan(base: &Path) -> Result<Vec<CatalogNode>> {
    Scanner::default().scan(base)
}
