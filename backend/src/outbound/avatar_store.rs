//! Filesystem avatar store built on `cap-std`.
//!
//! All access goes through a capability handle on the avatar directory, so
//! a file name can never address anything outside it. Writes are staged to
//! a hidden temporary name and renamed into place; the static file handler
//! therefore never serves a partially written image.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::AvatarFileName;
use crate::domain::ports::{AvatarStore, AvatarStoreError};

/// Avatar store rooted at a directory on the local filesystem.
#[derive(Clone)]
pub struct CapStdAvatarStore {
    root: PathBuf,
    dir: Arc<Dir>,
}

impl CapStdAvatarStore {
    /// Open `root`, creating it and any missing parents first.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, AvatarStoreError> {
        let root = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|err| io_error(&root, &err))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|err| io_error(&root, &err))?;
        Ok(Self {
            root,
            dir: Arc::new(dir),
        })
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(path: &Path, error: &io::Error) -> AvatarStoreError {
    AvatarStoreError::io(format!("{}: {error}", path.display()))
}

fn write_staged(dir: &Dir, name: &str, data: &[u8]) -> io::Result<()> {
    let staged = format!(".tmp-avatar-{}", Uuid::new_v4().simple());
    let result = dir
        .write(&staged, data)
        .and_then(|()| dir.rename(&staged, dir, name));
    if result.is_err() {
        let _cleanup = dir.remove_file(&staged);
    }
    result
}

fn remove_if_exists(dir: &Dir, name: &str) -> io::Result<()> {
    match dir.remove_file(name) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait]
impl AvatarStore for CapStdAvatarStore {
    async fn store(&self, name: &AvatarFileName, data: Vec<u8>) -> Result<(), AvatarStoreError> {
        let dir = Arc::clone(&self.dir);
        let target = name.as_str().to_owned();
        let path = self.root.join(&target);
        tokio::task::spawn_blocking(move || write_staged(&dir, &target, &data))
            .await
            .map_err(|err| AvatarStoreError::io(err.to_string()))?
            .map_err(|err| io_error(&path, &err))?;
        debug!(path = %path.display(), "avatar written");
        Ok(())
    }

    async fn remove(&self, name: &AvatarFileName) -> Result<(), AvatarStoreError> {
        let dir = Arc::clone(&self.dir);
        let target = name.as_str().to_owned();
        let path = self.root.join(&target);
        tokio::task::spawn_blocking(move || remove_if_exists(&dir, &target))
            .await
            .map_err(|err| AvatarStoreError::io(err.to_string()))?
            .map_err(|err| io_error(&path, &err))
    }
}
