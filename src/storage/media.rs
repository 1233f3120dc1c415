//! Upload ingestion: stores inbound media bytes under the media root and
//! hands back the public path the catalog records.

use std::path::{Component, Path, PathBuf};

use crate::{config, storage::error::StorageError};

pub const AUDIO_DIR: &str = "audio";
pub const COVER_DIR: &str = "cover_art";

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(config: &config::Media) -> Self {
        Self {
            root: config.root.clone(),
        }
    }

    /// The public `/audio/<name>` path an upload with this file name will
    /// get. Writes nothing: callers check the path against the catalog's
    /// audio_url uniqueness before any bytes land on disk.
    pub fn audio_url(&self, filename: &str) -> Result<String, StorageError> {
        let name = base_name(filename)?;
        Ok(format!("/{AUDIO_DIR}/{name}"))
    }

    /// Stores audio bytes under the client-supplied file name and returns
    /// the public `/audio/<name>` path. Re-uploading the same name yields
    /// the same path, which the catalog's audio_url uniqueness then rejects.
    pub fn store_audio(&self, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let name = base_name(filename)?;
        self.write(AUDIO_DIR, &name, data)
    }

    /// Stores cover art under a generated unique name and returns the public
    /// `/cover_art/<prefix>_<digest>.<ext>` path. The name is derived from a
    /// content digest, so identical bytes land on the same file.
    pub fn store_cover(
        &self,
        prefix: &str,
        filename: Option<&str>,
        data: &[u8],
    ) -> Result<String, StorageError> {
        let ext = filename
            .and_then(|f| Path::new(f).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let digest = blake3::hash(data).to_hex();
        let name = format!("{prefix}_{}.{ext}", &digest.as_str()[..16]);
        self.write(COVER_DIR, &name, data)
    }

    fn write(&self, dir: &str, name: &str, data: &[u8]) -> Result<String, StorageError> {
        let dir_path = self.root.join(dir);
        std::fs::create_dir_all(&dir_path)?;
        std::fs::write(dir_path.join(name), data)?;
        Ok(format!("/{dir}/{name}"))
    }

    /// Maps a public media path back to a file under the root. Returns None
    /// for unknown files and for paths with non-normal components.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let rel = Path::new(url.strip_prefix('/')?);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        let full = self.root.join(rel);
        full.is_file().then_some(full)
    }
}

/// Strips any directory part the client smuggled into the file name.
fn base_name(filename: &str) -> Result<String, StorageError> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| StorageError::InvalidFileName(filename.to_string()))
}
