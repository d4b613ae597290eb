//! Sources of raw tile content.
//!
//! A tile source resolves local tile names to raw XML content. Template
//! definitions reference tiles as `"<origin>:<name>"`, where the origin
//! selects one of the sources registered with the builder.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Supplier of raw tile content by local name.
pub trait TileSource {
    /// Open the named tile for reading, `None` when no such tile exists.
    fn get_tile(&self, name: &str) -> Option<Box<dyn Read + '_>>;

    /// Copy the named tile into `sink`. Returns `false` when the tile does
    /// not exist. The tile handle is released on every path.
    fn read_tile(&self, name: &str, sink: &mut dyn Write) -> Result<bool> {
        let Some(mut tile) = self.get_tile(name) else {
            return Ok(false);
        };
        io::copy(&mut tile, sink)?;
        Ok(true)
    }
}

/// Tile source backed by files under a root directory.
pub struct DirectoryTileSource {
    root: PathBuf,
}

impl DirectoryTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all tiles under the root, relative paths, sorted.
    pub fn tile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();
        names.sort();
        names
    }
}

impl TileSource for DirectoryTileSource {
    fn get_tile(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        let path = self.root.join(name);
        if !path.is_file() {
            return None;
        }
        File::open(path).ok().map(|f| Box::new(f) as Box<dyn Read>)
    }
}

/// Tile source over named in-memory blobs.
#[derive(Default)]
pub struct MemoryTileSource {
    tiles: HashMap<String, Vec<u8>>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.tiles.insert(name.into(), content.into());
    }

    /// Chained form of [`insert`](Self::insert) for building fixtures.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }
}

impl TileSource for MemoryTileSource {
    fn get_tile(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        self.tiles
            .get(name)
            .map(|c| Box::new(Cursor::new(c.as_slice())) as Box<dyn Read + '_>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tile_roundtrip() {
        let source = MemoryTileSource::new().with("page.xml", "<p/>");

        let mut sink = Vec::new();
        assert!(source.read_tile("page.xml", &mut sink).unwrap());
        assert_eq!(sink, b"<p/>");
    }

    #[test]
    fn test_memory_tile_missing() {
        let source = MemoryTileSource::new();
        let mut sink = Vec::new();
        assert!(!source.read_tile("ghost.xml", &mut sink).unwrap());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_directory_tile_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.xml"), b"<main/>").unwrap();

        let source = DirectoryTileSource::new(dir.path());
        let mut sink = Vec::new();
        assert!(source.read_tile("main.xml", &mut sink).unwrap());
        assert_eq!(sink, b"<main/>");
    }

    #[test]
    fn test_directory_tile_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryTileSource::new(dir.path());
        assert!(source.get_tile("absent.xml").is_none());
    }

    #[test]
    fn test_directory_tile_names_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.xml"), b"").unwrap();
        std::fs::write(dir.path().join("a.xml"), b"").unwrap();

        let source = DirectoryTileSource::new(dir.path());
        assert_eq!(source.tile_names(), ["a.xml", "b.xml"]);
    }
}
