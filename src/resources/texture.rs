use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Opaque reference to a texture owned by a [`TextureLoader`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Turns an image path into something a renderer can bind.
///
/// Loaders are free to cache: asking twice for the same path may return the
/// same handle.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureHandle>;
}

/// Headless loader that only checks the file exists and hands out handles.
///
/// Useful wherever there is no GPU, e.g. when validating assets or in tests.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    paths: Vec<PathBuf>,
    by_path: HashMap<PathBuf, TextureHandle>,
    require_files: bool,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail for paths that do not point at a readable file.
    pub fn requiring_files() -> Self {
        Self {
            require_files: true,
            ..Default::default()
        }
    }

    pub fn path(&self, handle: TextureHandle) -> Option<&Path> {
        self.paths.get(handle.0 as usize).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl TextureLoader for TextureRegistry {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.by_path.get(path) {
            return Ok(*handle);
        }
        if self.require_files && !path.is_file() {
            anyhow::bail!("texture {} does not exist", path.display());
        }
        let handle = TextureHandle(self.paths.len() as u32);
        self.paths.push(path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), handle);
        Ok(handle)
    }
}
