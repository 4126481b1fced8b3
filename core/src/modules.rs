//! Where `import` finds module source text.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A store of module source texts keyed by module name (a path without
/// extension).
pub trait ModuleSource {
    /// Read a module's source. `Ok(None)` means the module does not exist;
    /// `Err` means it exists but could not be read.
    fn read(&self, name: &str) -> io::Result<Option<String>>;
}

/// Modules stored as `<root>/<name>.<extension>` files
#[derive(Debug, Clone)]
pub struct FileModules {
    root: PathBuf,
    extension: String,
}

impl FileModules {
    pub const DEFAULT_EXTENSION: &'static str = "lisp";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileModules {
            root: root.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// `<root>/<name>.<extension>`; dots already in `name` are kept
    pub fn path_of(&self, name: &str) -> PathBuf {
        let mut path = self.root.join(name).into_os_string();
        path.push(".");
        path.push(&self.extension);
        PathBuf::from(path)
    }
}

impl Default for FileModules {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ModuleSource for FileModules {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_of(name)) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Modules held in memory, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryModules {
    sources: HashMap<String, String>,
}

impl MemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }
}

impl ModuleSource for MemoryModules {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self.sources.get(name).cloned())
    }
}
