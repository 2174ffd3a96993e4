//! `PhotoStorage` backed by a `cap_std` directory capability.
//!
//! Every file operation is resolved relative to the upload directory handle,
//! so a stored name can never reach outside it.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PhotoStorage, PhotoStorageError};
use crate::domain::{StoredPhotoName, TraceId};

/// Photo files under one upload directory.
#[derive(Debug, Clone)]
pub struct CapStdPhotoStorage {
    dir: Arc<Dir>,
}

impl CapStdPhotoStorage {
    /// Create `root` if needed and open it as the storage capability.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, PhotoStorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || TraceId::sync_scope(trace_id, || op(&dir)))
            .await
            .map_err(|err| PhotoStorageError::io(format!("storage task failed: {err}")))?
            .map_err(|err| PhotoStorageError::io(err.to_string()))
    }
}

fn write_atomically(dir: &Dir, name: &str, bytes: &[u8]) -> io::Result<()> {
    if dir.exists(name) {
        debug!(photo = name, "photo already stored");
        return Ok(());
    }
    // Readers never observe a partially written file.
    let staging = format!(".{name}.{}.part", Uuid::new_v4());
    dir.write(&staging, bytes)?;
    if let Err(err) = dir.rename(&staging, dir, name) {
        let _ = dir.remove_file(&staging);
        return Err(err);
    }
    Ok(())
}

fn read_if_present(dir: &Dir, name: &str) -> io::Result<Option<Vec<u8>>> {
    match dir.read(name) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl PhotoStorage for CapStdPhotoStorage {
    async fn put(&self, name: &StoredPhotoName, bytes: &[u8]) -> Result<(), PhotoStorageError> {
        let name = name.as_str().to_owned();
        let bytes = bytes.to_vec();
        self.blocking(move |dir| write_atomically(dir, &name, &bytes))
            .await
    }

    async fn get(&self, name: &StoredPhotoName) -> Result<Option<Vec<u8>>, PhotoStorageError> {
        let name = name.as_str().to_owned();
        self.blocking(move |dir| read_if_present(dir, &name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PhotoExtension;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn root() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    #[rstest]
    #[tokio::test]
    async fn open_creates_missing_directories(root: TempDir) {
        let nested = root.path().join("public").join("uploads");
        CapStdPhotoStorage::open(&nested).expect("open storage");
        assert!(nested.is_dir());
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_get_returns_bytes(root: TempDir) {
        let storage = CapStdPhotoStorage::open(root.path()).expect("open storage");
        let name = StoredPhotoName::for_content(b"jpeg bytes", PhotoExtension::Jpg);

        storage.put(&name, b"jpeg bytes").await.expect("put");

        let read = storage.get(&name).await.expect("get");
        assert_eq!(read.as_deref(), Some(&b"jpeg bytes"[..]));
        assert!(root.path().join(name.as_str()).is_file());
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_put_is_a_no_op(root: TempDir) {
        let storage = CapStdPhotoStorage::open(root.path()).expect("open storage");
        let name = StoredPhotoName::for_content(b"png", PhotoExtension::Png);

        storage.put(&name, b"png").await.expect("first put");
        storage.put(&name, b"png").await.expect("second put");

        let files: Vec<_> = std::fs::read_dir(root.path())
            .expect("list dir")
            .collect::<Result<_, _>>()
            .expect("dir entries");
        assert_eq!(files.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_file_is_none(root: TempDir) {
        let storage = CapStdPhotoStorage::open(root.path()).expect("open storage");
        let name = StoredPhotoName::for_content(b"never stored", PhotoExtension::Gif);
        assert_eq!(storage.get(&name).await.expect("get"), None);
    }
}
