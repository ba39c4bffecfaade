//! Photo blob store
//!
//! Filesystem-backed key-value store for uploaded images, namespaced
//! by owner id and an entry key (trophy id or build id):
//! `<root>/<owner_id>/<key>/<NN>.<ext>`. The workflow treats this as an
//! opaque put / get_all / delete_all store, so the backing can move to
//! object storage without touching workflow logic.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Blob store rooted at one namespace directory
/// (e.g. `uploads/trophies` or `uploads/builds`).
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, owner_id: i64, key: &str) -> PathBuf {
        self.root.join(owner_id.to_string()).join(key)
    }

    /// Maps a declared image content type onto a file extension.
    /// Unknown subtypes fall back to "img" — the files are opaque blobs.
    fn extension(content_type: &str) -> &'static str {
        match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            _ => "img",
        }
    }

    /// Writes one photo under the entry, returning its path.
    pub async fn put(
        &self,
        owner_id: i64,
        key: &str,
        index: usize,
        content_type: &str,
        bytes: &[u8],
    ) -> io::Result<PathBuf> {
        let dir = self.entry_dir(owner_id, key);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{:02}.{}", index, Self::extension(content_type)));
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Lists all photo paths of an entry, sorted by filename so the
    /// upload order is preserved. Missing entry — empty list.
    pub async fn get_all(&self, owner_id: i64, key: &str) -> io::Result<Vec<PathBuf>> {
        let dir = self.entry_dir(owner_id, key);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Removes an entry's directory with everything in it. Removing an
    /// absent entry is not an error.
    pub async fn delete_all(&self, owner_id: i64, key: &str) -> io::Result<()> {
        let dir = self.entry_dir(owner_id, key);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
