//! Merging cached collections with fresh server lists.
//!
//! The cache is the availability fallback: a list screen never goes blank
//! while a snapshot exists, even a stale one. Records only the cache knows
//! about are kept, which means a server-side deletion made elsewhere stays
//! visible until this client removes it itself.

use std::collections::HashSet;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use taskdesk_shared::schemas::{Task, User};

use crate::error::ApiError;
use crate::persistence::Storage;

/// A record that can live in a reconciled collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> i64;

    /// Recompute client-side derived fields.
    fn normalize(&mut self) {}
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Task {
    fn id(&self) -> i64 {
        self.id
    }

    fn normalize(&mut self) {
        self.locked = self.status.is_completed();
    }
}

/// Merge `remote` into `local`: local order first, then remote records whose
/// id is not yet present. No id appears twice in the result.
pub fn reconcile<T: Record>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(local.len() + remote.len());
    let mut merged: Vec<T> = local
        .into_iter()
        .chain(remote)
        .filter(|item| seen.insert(item.id()))
        .collect();
    merged.iter_mut().for_each(T::normalize);
    merged
}

/// Where a refreshed collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Server,
    Cache,
}

#[derive(Debug, Clone)]
pub struct Refreshed<T> {
    pub items: Vec<T>,
    pub source: Source,
}

/// Read the cached snapshot under `key`. Unreadable caches count as empty;
/// a single record that no longer decodes is skipped on its own.
pub fn load_cached<T: Record>(storage: &Storage, key: &str) -> Vec<T> {
    let raw = match storage.get_json::<Vec<Value>>(key) {
        Ok(raw) => raw.unwrap_or_default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read cached collection");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(mut item) => {
                item.normalize();
                Some(item)
            }
            Err(e) => {
                warn!(key, error = %e, "skipping undecodable cached record");
                None
            }
        })
        .collect()
}

pub fn store_cached<T: Record>(storage: &Storage, key: &str, items: &[T]) -> anyhow::Result<()> {
    storage.set_json(key, items)?;
    debug!(key, count = items.len(), "cached collection written");
    Ok(())
}

/// Replace or append `item` in the cached snapshot.
pub fn upsert_cached<T: Record>(storage: &Storage, key: &str, item: T) -> anyhow::Result<()> {
    let mut items: Vec<T> = load_cached(storage, key);
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
    store_cached(storage, key, &items)
}

pub fn remove_cached<T: Record>(storage: &Storage, key: &str, id: i64) -> anyhow::Result<()> {
    let mut items: Vec<T> = load_cached(storage, key);
    items.retain(|item| item.id() != id);
    store_cached(storage, key, &items)
}

/// Fetch, reconcile against the cache and write the result back.
///
/// A failed fetch skips reconciliation and returns the cached snapshot
/// unchanged; the failure is logged, not returned.
pub async fn refresh_collection<T, F>(storage: &Storage, key: &str, fetch: F) -> Refreshed<T>
where
    T: Record,
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    let local: Vec<T> = load_cached(storage, key);

    match fetch.await {
        Ok(remote) => {
            let merged = reconcile(local, remote);
            if let Err(e) = store_cached(storage, key, &merged) {
                warn!(key, error = %e, "failed to write cached collection");
            }
            Refreshed {
                items: merged,
                source: Source::Server,
            }
        }
        Err(e) => {
            warn!(key, error = %e, cached = local.len(), "fetch failed, using cached collection");
            Refreshed {
                items: local,
                source: Source::Cache,
            }
        }
    }
}
