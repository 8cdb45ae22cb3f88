#[cfg(test)]
#[path = "query_cache_test.rs"]
mod tests;

use std::future::Future;

use anyhow::Result;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client side copy of backend reads, keyed by path segments such as
/// `workflowRuns/fal-ai`. Mutations invalidate the keys they touch so the next
/// read goes back to the backend.
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<String, serde_json::Value>,
}

impl QueryCache {
    pub fn key(segments: &[&str]) -> String {
        return segments.join("/");
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        return serde_json::from_value(entry.value().clone()).ok();
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        return Ok(());
    }

    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key) {
            tracing::debug!(key, "query cache hit");
            return Ok(cached);
        }

        let value = fetch().await?;
        self.set(key, &value)?;

        return Ok(value);
    }

    /// Drops every key equal to `prefix` or nested under it.
    pub fn invalidate(&self, prefix: &str) {
        let nested = format!("{prefix}/");
        self.entries
            .retain(|key, _| return key != prefix && !key.starts_with(&nested));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
