//! Reconciliation of desired redirects against a bucket.
//!
//! A run takes one snapshot of the bucket, then walks the desired entries in
//! order. Each entry claims (removes) its object from the snapshot; whatever
//! is left afterwards is the set of orphans considered for deletion.
//!
//! Only zero-length objects that already carry a redirect are ever deleted.
//! Anything with a body is treated as real site content and left alone.

use crate::{
    models::{
        action::{ActionKind, ActionRecord},
        redirect::RedirectEntry,
    },
    services::store::{RedirectStore, StorageResult},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Also remove redirect objects not listed in the desired state.
    pub delete: bool,
    /// Decide and report actions without touching the bucket.
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// A key that appeared more than once in the desired entries.
///
/// Positions are 1-based indexes into the desired entries, not file lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    pub first: usize,
    pub again: usize,
}

/// Result of a completed run.
#[derive(Clone, Debug, Default)]
pub struct SyncReport {
    /// Creates and updates in desired order, then deletes in listing order.
    pub actions: Vec<ActionRecord>,
    pub summary: SyncSummary,
    pub duplicates: Vec<DuplicateKey>,
}

impl SyncReport {
    fn record<F>(&mut self, action: ActionRecord, on_action: &mut F)
    where
        F: FnMut(&ActionRecord),
    {
        match action.kind {
            ActionKind::New => self.summary.created += 1,
            ActionKind::Update => self.summary.updated += 1,
            ActionKind::Delete => self.summary.deleted += 1,
        }
        info!(action = %action.kind, key = %action.key, location = %action.location, "redirect");
        on_action(&action);
        self.actions.push(action);
    }
}

/// Drives one bucket towards a desired set of redirects.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn RedirectStore>,
    options: SyncOptions,
}

impl SyncService {
    pub fn new(store: Arc<dyn RedirectStore>, options: SyncOptions) -> Self {
        Self { store, options }
    }

    /// Run a full sync.
    ///
    /// `on_action` sees every record as soon as it is decided (and, outside a
    /// dry run, applied), so callers can report progress even if a later key
    /// fails. The first storage error aborts the run.
    pub async fn run<I, F>(&self, desired: I, mut on_action: F) -> StorageResult<SyncReport>
    where
        I: IntoIterator<Item = RedirectEntry>,
        F: FnMut(&ActionRecord),
    {
        let dry = self.options.dry_run;
        let mut remote_keys = self.store.list_objects().await?;
        debug!(objects = remote_keys.len(), "listed bucket");

        let mut report = SyncReport::default();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (index, RedirectEntry { key, location }) in desired.into_iter().enumerate() {
            let position = index + 1;
            match first_seen.get(&key) {
                Some(&first) => {
                    // the first occurrence already claimed the remote object
                    warn!(
                        key = %key,
                        first,
                        again = position,
                        "key listed more than once, handling it as a new object"
                    );
                    report.duplicates.push(DuplicateKey {
                        key: key.clone(),
                        first,
                        again: position,
                    });
                }
                None => {
                    first_seen.insert(key.clone(), position);
                }
            }

            let (object, existed) = match remote_keys.remove(&key) {
                Some(object) => (object, true),
                None => (self.store.create_object(&key), false),
            };

            if existed
                && self.store.get_redirect(&object).await?.as_deref() == Some(location.as_str())
            {
                debug!(key = %key, "unchanged");
                report.summary.unchanged += 1;
                continue;
            }

            if !dry {
                self.store.set_public_redirect(&object, &location).await?;
            }
            let kind = if existed {
                ActionKind::Update
            } else {
                ActionKind::New
            };
            report.record(ActionRecord::new(kind, key, location), &mut on_action);
        }

        if self.options.delete {
            for object in remote_keys.into_values() {
                // objects with a body are never redirects; skip the HEAD request
                if !object.is_marker() {
                    continue;
                }
                let Some(redirect) = self.store.get_redirect(&object).await? else {
                    continue;
                };
                if !dry {
                    self.store.delete_object(&object).await?;
                }
                report.record(
                    ActionRecord::new(ActionKind::Delete, object.name, redirect),
                    &mut on_action,
                );
            }
        }

        let summary = &report.summary;
        info!(
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            unchanged = summary.unchanged,
            dry_run = dry,
            "sync finished"
        );
        Ok(report)
    }
}
