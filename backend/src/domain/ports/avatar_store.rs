//! Driven port for avatar file storage.

use async_trait::async_trait;

use crate::domain::AvatarFileName;

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        /// Reading or writing the underlying storage failed.
        Io { message: String } => "avatar storage failed: {message}",
    }
}

/// Write-only storage for avatar images.
///
/// Files are served by a separate static handler, so the port never reads
/// them back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Store `data` under `name`, replacing nothing: names are unique.
    async fn store(&self, name: &AvatarFileName, data: Vec<u8>) -> Result<(), AvatarStoreError>;

    /// Delete `name`. Missing files are not an error.
    async fn remove(&self, name: &AvatarFileName) -> Result<(), AvatarStoreError>;
}
