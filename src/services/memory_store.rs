//! In-memory bucket used to exercise the sync engine.
//!
//! Records every mutating call so tests can assert on exactly what the
//! engine asked the store to do.

use crate::{
    models::object::{RemoteObject, RemoteSnapshot},
    services::store::{RedirectStore, StorageError, StorageResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

#[derive(Clone, Debug)]
struct StoredObject {
    size: u64,
    redirect: Option<String>,
}

/// Mutating calls received, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallLog {
    pub puts: Vec<(String, String)>,
    pub deletes: Vec<String>,
}

impl CallLog {
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, StoredObject>,
    calls: CallLog,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a zero-length redirect marker.
    pub async fn with_redirect(self, name: &str, location: &str) -> Self {
        self.insert(name, 0, Some(location)).await;
        self
    }

    /// Seed a regular object with a body and no redirect.
    pub async fn with_content(self, name: &str, size: u64) -> Self {
        self.insert(name, size, None).await;
        self
    }

    pub async fn insert(&self, name: &str, size: u64, redirect: Option<&str>) {
        self.state.lock().await.objects.insert(
            name.to_string(),
            StoredObject {
                size,
                redirect: redirect.map(str::to_string),
            },
        );
    }

    /// Make every write or delete of `name` fail with a 403.
    pub async fn fail_on(&self, name: &str) {
        self.state.lock().await.failing.insert(name.to_string());
    }

    pub async fn calls(&self) -> CallLog {
        self.state.lock().await.calls.clone()
    }

    pub async fn reset_calls(&self) {
        self.state.lock().await.calls = CallLog::default();
    }

    pub async fn redirect_of(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .objects
            .get(name)
            .and_then(|o| o.redirect.clone())
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.state.lock().await.objects.contains_key(name)
    }
}

fn forbidden(name: &str) -> StorageError {
    StorageError::Response {
        status: 403,
        reason: "Forbidden".into(),
        body: format!("<Error><Code>AccessDenied</Code><Key>{}</Key></Error>", name),
    }
}

#[async_trait]
impl RedirectStore for MemoryStore {
    async fn list_objects(&self) -> StorageResult<RemoteSnapshot> {
        let state = self.state.lock().await;
        Ok(state
            .objects
            .iter()
            .map(|(name, obj)| (name.clone(), RemoteObject::new(name.clone(), obj.size)))
            .collect())
    }

    async fn get_redirect(&self, object: &RemoteObject) -> StorageResult<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .objects
            .get(&object.name)
            .and_then(|o| o.redirect.clone()))
    }

    async fn set_public_redirect(
        &self,
        object: &RemoteObject,
        location: &str,
    ) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        state
            .calls
            .puts
            .push((object.name.clone(), location.to_string()));
        if state.failing.contains(&object.name) {
            return Err(forbidden(&object.name));
        }
        state.objects.insert(
            object.name.clone(),
            StoredObject {
                size: 0,
                redirect: Some(location.to_string()),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, object: &RemoteObject) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        state.calls.deletes.push(object.name.clone());
        if state.failing.contains(&object.name) {
            return Err(forbidden(&object.name));
        }
        state.objects.remove(&object.name);
        Ok(())
    }
}
