//! File access for table loading.
//!
//! The engine never touches paths directly; hosts hand it a [`FileSystem`]
//! that resolves a bare filename within a search-path category.

use std::io;
use std::path::{Path, PathBuf};

/// Search-path category for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    Tables,
    Missions,
    Any,
}

impl PathType {
    /// Sub-directory used by [`DirFileSystem`].
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Tables => "tables",
            Self::Missions => "missions",
            Self::Any => "",
        }
    }
}

/// Host-provided file access.
pub trait FileSystem {
    /// Reads the whole file.
    fn read(&self, name: &str, path_type: PathType) -> io::Result<Vec<u8>>;

    /// Whether the file exists.
    fn exists(&self, name: &str, path_type: PathType) -> bool;

    /// Filenames (not paths) available in a category.
    fn list(&self, path_type: PathType) -> io::Result<Vec<String>>;

    /// Path used in diagnostics.
    fn display_path(&self, name: &str, path_type: PathType) -> PathBuf {
        Path::new(path_type.dir_name()).join(name)
    }
}

/// A [`FileSystem`] rooted at a directory on disk.
///
/// `Tables` maps to `<root>/tables`, `Missions` to `<root>/missions` and
/// `Any` to the root itself.
#[derive(Debug, Clone)]
pub struct DirFileSystem {
    root: PathBuf,
}

impl DirFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, path_type: PathType) -> PathBuf {
        self.root.join(path_type.dir_name())
    }
}

impl FileSystem for DirFileSystem {
    fn read(&self, name: &str, path_type: PathType) -> io::Result<Vec<u8>> {
        std::fs::read(self.dir(path_type).join(name))
    }

    fn exists(&self, name: &str, path_type: PathType) -> bool {
        self.dir(path_type).join(name).is_file()
    }

    fn list(&self, path_type: PathType) -> io::Result<Vec<String>> {
        let dir = self.dir(path_type);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn display_path(&self, name: &str, path_type: PathType) -> PathBuf {
        self.dir(path_type).join(name)
    }
}
