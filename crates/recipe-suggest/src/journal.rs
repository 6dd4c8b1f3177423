/// Append-only JSON-line logs under the data directory. Journaling is
/// best-effort: a failed write warns and the request proceeds.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

const REQUESTS_LOG: &str = "requests.log";
const FEEDBACK_LOG: &str = "feedback.log";
const RECIPE_FEEDBACK_LOG: &str = "recipe_feedback.log";
const EMERGENCY_LOG: &str = "emergency.log";

#[derive(Clone)]
pub struct Journal {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Journal {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn log_request(&self, ingredients: &str, tier: &str, cards: usize) {
        self.append(
            REQUESTS_LOG,
            json!({
                "ts": epoch_secs(),
                "ingredients": ingredients,
                "tier": tier,
                "cards": cards,
            }),
        )
        .await;
    }

    pub async fn log_feedback(&self, entry: Value) {
        self.append(FEEDBACK_LOG, with_timestamp(entry)).await;
    }

    pub async fn log_recipe_feedback(&self, entry: Value) {
        self.append(RECIPE_FEEDBACK_LOG, with_timestamp(entry)).await;
    }

    pub async fn log_emergency(&self, ingredients: &str) {
        self.append(
            EMERGENCY_LOG,
            json!({
                "ts": epoch_secs(),
                "ingredients": ingredients,
            }),
        )
        .await;
    }

    async fn append(&self, file: &str, entry: Value) {
        let _guard = self.lock.lock().await;
        if let Err(e) = self.write_line(file, &entry).await {
            warn!(file, error = %e, "journal write failed");
        }
    }

    async fn write_line(&self, file: &str, entry: &Value) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut handle = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file))
            .await?;
        handle
            .write_all(format!("{entry}\n").as_bytes())
            .await?;
        Ok(())
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn with_timestamp(entry: Value) -> Value {
    match entry {
        Value::Object(mut map) => {
            map.insert("ts".to_string(), json!(epoch_secs()));
            Value::Object(map)
        }
        other => json!({ "ts": epoch_secs(), "entry": other }),
    }
}
