use super::Store;
use std::sync::Arc;
use tokio_postgres::Client;

/// Table holding every persisted key.
pub const KV: &str = "feltd_kv";

const CREATES: &str = const_format::concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    KV,
    " (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );"
);
const UPSERT: &str = const_format::concatcp!(
    "INSERT INTO ",
    KV,
    " (key, value) VALUES ($1, $2)
     ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value;"
);
const SELECT: &str = const_format::concatcp!("SELECT value FROM ", KV, " WHERE key = $1;");
const DELETE: &str = const_format::concatcp!("DELETE FROM ", KV, " WHERE key = $1;");
const PREFIX: &str = const_format::concatcp!(
    "SELECT key FROM ",
    KV,
    " WHERE key LIKE $1 || '%';"
);

/// Durable store on a single upserting PostgreSQL table.
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    /// Connects and ensures the schema. Any error here sends the caller
    /// to the in-memory fallback.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let tls = tokio_postgres::tls::NoTls;
        let (client, connection) = tokio_postgres::connect(url, tls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("[store] connection task ended: {}", e);
            }
        });
        client.execute(CREATES, &[]).await?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = self.client.query_opt(SELECT, &[&key]).await?;
        Ok(row.map(|r| r.get(0)))
    }
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.client.execute(UPSERT, &[&key, &value]).await?;
        Ok(())
    }
    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.client.execute(DELETE, &[&key]).await?;
        Ok(())
    }
    async fn keys_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let rows = self.client.query(PREFIX, &[&prefix]).await?;
        Ok(rows.into_iter().map(|r| r.get(0)).collect())
    }
}
