use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use zeimu_core::state::{StateStore, StateStoreError};

/// Keeps form state in a TOML file.
///
/// A missing file loads as `None`; saving creates parent directories.
#[derive(Debug, Clone)]
pub struct TomlFileStore<S> {
    path: PathBuf,
    _state: PhantomData<fn() -> S>,
}

impl<S> TomlFileStore<S> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<S> StateStore<S> for TomlFileStore<S>
where
    S: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<S>, StateStoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&text)
            .map(Some)
            .map_err(|e| StateStoreError::Decode(e.to_string()))
    }

    fn save(
        &self,
        state: &S,
    ) -> Result<(), StateStoreError> {
        let text = toml::to_string(state).map_err(|e| StateStoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, text)?;

        tracing::debug!(path = %self.path.display(), "saved form state");
        Ok(())
    }

    fn clear(&self) -> Result<(), StateStoreError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
