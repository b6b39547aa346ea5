use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use reqwest::header;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::config::GcpConfig;
use crate::utils::batching::chunk_vec;
use crate::utils::http_client::post_json;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Embedding model seam. Production talks to Gemini; tests substitute a
/// deterministic fake.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts, preserving order. The result always has one
    /// vector per input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
}

pub struct GeminiEmbeddingClient {
    config: GcpConfig,
    redis_pool: Pool,
    cache_ttl_secs: u64,
}

impl GeminiEmbeddingClient {
    pub fn new(config: GcpConfig, redis_pool: Pool, cache_ttl_secs: u64) -> Self {
        Self {
            config,
            redis_pool,
            cache_ttl_secs,
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            header::HeaderValue::from_str(&self.config.auth_token)
                .context("auth token is not a valid header value")?,
        );
        Ok(headers)
    }

    fn embed_request(&self, text: &str) -> Value {
        json!({
            "model": format!("models/{}", self.config.model),
            "content": { "parts": [{ "text": text }] },
            "taskType": "SEMANTIC_SIMILARITY",
            "outputDimensionality": self.config.dimensions,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct SingleEmbedResponse {
    embedding: EmbeddingValues,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            GEMINI_BASE_URL, self.config.model
        );

        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for chunk in chunk_vec(texts, self.config.batch_size) {
            let requests: Vec<Value> = chunk.iter().map(|text| self.embed_request(text)).collect();

            info!("🚀 Requesting {} embeddings from Gemini", chunk.len());

            let raw = post_json(
                &url,
                json!({ "requests": requests }),
                Some(self.auth_headers()?),
            )
            .await?;

            let parsed: BatchEmbedResponse =
                serde_json::from_value(raw).context("unexpected batch embedding response shape")?;

            ensure!(
                parsed.embeddings.len() == chunk.len(),
                "embedding count mismatch: requested {}, received {}",
                chunk.len(),
                parsed.embeddings.len()
            );

            for entry in parsed.embeddings {
                ensure!(
                    entry.values.len() == self.config.dimensions,
                    "embedding has {} dimensions, expected {}",
                    entry.values.len(),
                    self.config.dimensions
                );
                embeddings.push(entry.values);
            }
        }

        Ok(embeddings)
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hex::encode(hasher.finalize());
        let cache_key = format!("embedding:{}:{}", self.config.model, hash);

        // A broken cache should never block embedding.
        let mut conn = match self.redis_pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("❌ Redis unavailable for embedding cache: {:?}", e);
                None
            }
        };

        if let Some(conn) = conn.as_mut() {
            match conn.get::<_, Option<String>>(&cache_key).await {
                Ok(Some(cached)) => {
                    if let Ok(vec) = serde_json::from_str::<Vec<f32>>(&cached) {
                        info!("✅ Embedding cache hit ({} chars)", text.len());
                        return Ok(vec);
                    }
                }
                Ok(None) => info!("❌ Embedding cache miss ({} chars)", text.len()),
                Err(e) => error!("❌ Redis get error for key {}: {:?}", cache_key, e),
            }
        }

        let url = format!(
            "{}/models/{}:embedContent",
            GEMINI_BASE_URL, self.config.model
        );

        let raw = post_json(&url, self.embed_request(text), Some(self.auth_headers()?)).await?;
        let parsed: SingleEmbedResponse =
            serde_json::from_value(raw).context("unexpected embedding response shape")?;
        let embedding = parsed.embedding.values;

        ensure!(
            embedding.len() == self.config.dimensions,
            "embedding has {} dimensions, expected {}",
            embedding.len(),
            self.config.dimensions
        );

        if let Some(conn) = conn.as_mut() {
            if let Err(e) = conn
                .set_ex::<_, _, ()>(
                    &cache_key,
                    serde_json::to_string(&embedding)?,
                    self.cache_ttl_secs,
                )
                .await
            {
                error!("❌ Failed to cache embedding in Redis: {:?}", e);
            }
        }

        Ok(embedding)
    }
}
