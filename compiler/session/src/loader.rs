//! Access to the contents of source files.

use std::{
    io,
    path::{Component, Path, PathBuf},
};
use utility::HashMap;

/// A provider of the contents of source files.
///
/// The session never touches the file system itself. It asks its loader for every file
/// it needs.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// A loader serving files kept in memory.
#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.files.insert(normalize(path.as_ref()), source.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::ErrorKind::NotFound.into())
    }
}

/// Remove `.` components and resolve `..` components that follow a named folder.
///
/// This does not consult the file system and thus does not resolve symbolic links.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) =>
            {
                normalized.pop();
            }
            component => normalized.push(component),
        }
    }

    normalized
}
