use super::Store;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store: survives reconnects, not restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.map.read().await.get(key).cloned())
    }
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.map.write().await.insert(key.to_string(), value);
        Ok(())
    }
    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.map.write().await.remove(key);
        Ok(())
    }
    async fn keys_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .map
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
