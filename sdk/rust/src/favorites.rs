use serde_json::Value;
use shared::{KeyValueStore, RecipeId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

pub const FAVORITES_KEY: &str = "favorite_recipes";

/// Locally persisted favorite recipe ids, kept as a JSON array under one key.
///
/// Ids keep insertion order and never repeat. A value that does not parse is
/// treated as an empty list rather than an error. Clones share one write lock,
/// so read-modify-write cycles from cloned clients never interleave.
#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, FAVORITES_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<RecipeId>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        Ok(parse_ids(&self.key, &raw))
    }

    pub async fn contains(&self, id: RecipeId) -> Result<bool> {
        Ok(self.list().await?.contains(&id))
    }

    /// Returns `false` when the id was already present.
    pub async fn add(&self, id: RecipeId) -> Result<bool> {
        self.modify(|ids| {
            if ids.contains(&id) {
                false
            } else {
                ids.push(id);
                true
            }
        })
        .await
    }

    /// Returns `false` when the id was not present.
    pub async fn remove(&self, id: RecipeId) -> Result<bool> {
        self.modify(|ids| {
            let before = ids.len();
            ids.retain(|existing| *existing != id);
            ids.len() != before
        })
        .await
    }

    /// Flips membership and returns whether the id is now a favorite.
    pub async fn toggle(&self, id: RecipeId) -> Result<bool> {
        self.modify(|ids| match ids.iter().position(|existing| *existing == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id);
                true
            }
        })
        .await
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key).await?;
        Ok(())
    }

    /// Runs one read-modify-write cycle under the write lock. Saves only on change.
    async fn modify<T>(&self, f: impl FnOnce(&mut Vec<RecipeId>) -> T) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.list().await?;
        let before = ids.clone();
        let outcome = f(&mut ids);
        if ids != before {
            self.save(&ids).await?;
        }
        Ok(outcome)
    }

    async fn save(&self, ids: &[RecipeId]) -> Result<()> {
        let raw = Value::from(ids.to_vec()).to_string();
        self.store.set(&self.key, &raw).await?;
        debug!("Saved {} favorites", ids.len());
        Ok(())
    }
}

fn parse_ids(key: &str, raw: &str) -> Vec<RecipeId> {
    let values = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(other) => {
            warn!("Ignoring {}: expected an array, found {}", key, other);
            return Vec::new();
        }
        Err(e) => {
            warn!("Ignoring corrupt {}: {}", key, e);
            return Vec::new();
        }
    };

    let mut ids: Vec<RecipeId> = Vec::with_capacity(values.len());
    for value in values {
        let id = match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<RecipeId>().ok(),
            _ => None,
        };
        match id {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => debug!("Skipping favorite entry {}", value),
        }
    }
    ids
}
