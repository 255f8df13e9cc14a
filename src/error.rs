//! Asset loading errors.
//!
//! Every failure is terminal for the asset that produced it: the loaders
//! return a single [`AssetError`] naming the file and the reason and never
//! hand back a partially reconstructed model.

use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Why an asset could not be turned into a model.
#[derive(Debug)]
pub enum AssetErrorKind {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// A geometry line is unusable, e.g. a face index outside its table.
    MalformedGeometry { line: usize, reason: String },
    /// A material-table line is unusable, e.g. `Kd` before any `newmtl`.
    MalformedMaterialTable { line: usize, reason: String },
    /// Parsing finished without producing a single submesh.
    EmptyAsset,
}

#[derive(Debug)]
pub struct AssetError {
    pub path: PathBuf,
    pub kind: AssetErrorKind,
}

impl AssetError {
    pub fn new(path: impl AsRef<Path>, kind: AssetErrorKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
        }
    }

    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::new(path, AssetErrorKind::Io(err))
    }

    pub fn geometry(path: impl AsRef<Path>, line: usize, reason: impl Into<String>) -> Self {
        Self::new(
            path,
            AssetErrorKind::MalformedGeometry {
                line,
                reason: reason.into(),
            },
        )
    }

    pub fn material_table(path: impl AsRef<Path>, line: usize, reason: impl Into<String>) -> Self {
        Self::new(
            path,
            AssetErrorKind::MalformedMaterialTable {
                line,
                reason: reason.into(),
            },
        )
    }

    pub fn is_malformed_geometry(&self) -> bool {
        matches!(self.kind, AssetErrorKind::MalformedGeometry { .. })
    }

    pub fn is_malformed_material_table(&self) -> bool {
        matches!(self.kind, AssetErrorKind::MalformedMaterialTable { .. })
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            AssetErrorKind::Io(err) => write!(f, "{path}: cannot read file: {err}"),
            AssetErrorKind::MalformedGeometry { line, reason } => {
                write!(f, "{path}:{line}: malformed geometry: {reason}")
            }
            AssetErrorKind::MalformedMaterialTable { line, reason } => {
                write!(f, "{path}:{line}: malformed material table: {reason}")
            }
            AssetErrorKind::EmptyAsset => write!(f, "{path}: asset contains no faces"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AssetErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}
