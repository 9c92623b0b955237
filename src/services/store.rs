//! The boundary between the sync engine and an object store.
//!
//! The engine only needs a handful of operations, so any S3-like backend can
//! drive it by implementing [`RedirectStore`].

use crate::models::object::{RemoteObject, RemoteSnapshot};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The provider answered, but not with success.
    #[error("{status} {reason}\n{body}")]
    Response {
        status: u16,
        reason: String,
        body: String,
    },
    /// No response was received (connection, signing, timeout...).
    #[error("transport error: {0}")]
    Transport(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Operations the sync engine performs against a bucket.
#[async_trait]
pub trait RedirectStore: Send + Sync {
    /// Enumerate every object in the bucket.
    async fn list_objects(&self) -> StorageResult<RemoteSnapshot>;

    /// Current redirect target of `object`, if it has one.
    async fn get_redirect(&self, object: &RemoteObject) -> StorageResult<Option<String>>;

    /// Handle for a not-yet-existing object. Nothing is written.
    fn create_object(&self, name: &str) -> RemoteObject {
        RemoteObject::new(name, 0)
    }

    /// Make `object` a public-read, zero-length object that redirects to
    /// `location`. Overwrites whatever was there.
    async fn set_public_redirect(&self, object: &RemoteObject, location: &str)
    -> StorageResult<()>;

    async fn delete_object(&self, object: &RemoteObject) -> StorageResult<()>;
}
