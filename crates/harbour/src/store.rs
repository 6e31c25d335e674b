//! Store: the declaration document and the running-state snapshot on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use engine::Declaration;
use tracing::debug;

use crate::error::{HarbourError, HarbourResult};

pub struct DeclarationStore {
    snapshot_path: PathBuf,
}

impl DeclarationStore {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self { snapshot_path: snapshot_path.into() }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Resolve a user-supplied path against the current directory.
    ///
    /// The file must exist.
    pub fn resolve(path: &Path) -> HarbourResult<PathBuf> {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| HarbourError::io(".", e))?
                .join(path)
        };
        if !resolved.is_file() {
            return Err(HarbourError::configuration(format!(
                "declaration file '{}' does not exist",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    /// Read and parse a declaration document.
    pub fn load(path: &Path) -> HarbourResult<Declaration> {
        let text = fs::read_to_string(path).map_err(|e| HarbourError::io(path, e))?;
        parse(path, &text)
    }

    /// The last persisted declaration, or an empty one if there is none yet.
    pub fn load_snapshot(&self) -> HarbourResult<Declaration> {
        match fs::read_to_string(&self.snapshot_path) {
            Ok(text) => parse(&self.snapshot_path, &text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.snapshot_path.display(), "No snapshot yet, starting empty");
                Ok(Declaration::default())
            }
            Err(e) => Err(HarbourError::io(&self.snapshot_path, e)),
        }
    }

    /// The last applied declaration. Unlike [`Self::load_snapshot`], a
    /// missing snapshot is a configuration error.
    pub fn load_applied(&self) -> HarbourResult<Declaration> {
        if !self.snapshot_path.is_file() {
            return Err(HarbourError::configuration(format!(
                "no declaration given and no snapshot at '{}'",
                self.snapshot_path.display()
            )));
        }
        self.load_snapshot()
    }

    /// `path` if given (resolved), otherwise the snapshot.
    pub fn load_or_snapshot(&self, path: Option<&Path>) -> HarbourResult<Declaration> {
        match path {
            Some(path) => Self::load(&Self::resolve(path)?),
            None => self.load_snapshot(),
        }
    }

    /// Replace the snapshot atomically.
    pub fn save_snapshot(&self, declaration: &Declaration) -> HarbourResult<()> {
        if let Some(parent) = self.snapshot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HarbourError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(declaration)?;
        let tmp = self.snapshot_path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| HarbourError::io(&tmp, e))?;
        fs::rename(&tmp, &self.snapshot_path).map_err(|e| HarbourError::io(&self.snapshot_path, e))?;

        debug!(path = %self.snapshot_path.display(), services = declaration.services().len(), "Snapshot saved");
        Ok(())
    }
}

fn parse(path: &Path, text: &str) -> HarbourResult<Declaration> {
    serde_json::from_str(text).map_err(|e| {
        HarbourError::configuration(format!("{}: {}", path.display(), e))
    })
}
