/// Process-wide store for model-generated recipes and cached
/// expansions. The static catalog never changes after startup, so
/// expansions for catalog recipes live here too, keyed by id, instead
/// of mutating catalog records.
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::model::{RecipeRecord, GENERATED_ID_START};

#[derive(Clone)]
pub struct GeneratedStore {
    recipes: Arc<Mutex<HashMap<i64, RecipeRecord>>>,
    expansions: Arc<Mutex<HashMap<i64, Value>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for GeneratedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratedStore {
    pub fn new() -> Self {
        Self {
            recipes: Arc::new(Mutex::new(HashMap::new())),
            expansions: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(GENERATED_ID_START)),
        }
    }

    /// Allocate an id from the generated range, disjoint from the
    /// static catalog's ids.
    pub fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn insert(&self, recipe: RecipeRecord) {
        self.recipes.lock().await.insert(recipe.id, recipe);
    }

    pub async fn get(&self, id: i64) -> Option<RecipeRecord> {
        self.recipes.lock().await.get(&id).cloned()
    }

    /// Attach an expansion once. The first expansion wins; later
    /// attempts return the cached value so repeated detail requests
    /// stay idempotent.
    pub async fn attach_expansion(&self, id: i64, expansion: Value) -> Value {
        let mut expansions = self.expansions.lock().await;
        expansions.entry(id).or_insert(expansion).clone()
    }

    pub async fn expansion(&self, id: i64) -> Option<Value> {
        self.expansions.lock().await.get(&id).cloned()
    }
}
