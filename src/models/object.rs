//! Represents an object stored in the remote bucket.

use std::collections::BTreeMap;

/// Snapshot of a bucket, keyed by object name.
///
/// Ordered so that iteration follows the lexicographic order S3 lists in.
pub type RemoteSnapshot = BTreeMap<String, RemoteObject>;

/// A single object within the bucket.
///
/// Only the listing metadata is held here. The redirect target is fetched on
/// demand through the store, since listings do not carry it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteObject {
    /// Object key (path-like identifier within the bucket).
    pub name: String,

    /// Size of the object body in bytes. Redirect markers have no body.
    pub size: u64,
}

impl RemoteObject {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Zero-length objects are the only ones this tool will consider managing.
    pub fn is_marker(&self) -> bool {
        self.size == 0
    }
}
