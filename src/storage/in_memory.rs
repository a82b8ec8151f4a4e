use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::storage::{Storage, StorageTrait};
use crate::types::{ObjectKeyPage, ObjectMetadata};

#[derive(Debug, Clone, PartialEq)]
pub struct CopyRecord {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub cache_control: String,
}

#[derive(Default)]
struct State {
    buckets: HashMap<String, BTreeMap<String, ObjectMetadata>>,
    copies: Vec<CopyRecord>,
    head_failures: HashSet<String>,
    copy_failures: HashSet<String>,
    list_failure: bool,
    head_count: usize,
}

/// Object store kept in process memory, shared by every storage created from it.
///
/// Used to drive a `Pipeline` without S3, with optional latency jitter and failure injection.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    max_jitter: Duration,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every store call sleeps up to `max_jitter`, derived from the key.
    pub fn with_jitter(max_jitter: Duration) -> Self {
        Self {
            max_jitter,
            ..Self::default()
        }
    }

    pub fn storage(&self, bucket: &str) -> Storage {
        Box::new(InMemoryStorage {
            bucket: bucket.to_string(),
            store: self.clone(),
        })
    }

    pub fn put(&self, bucket: &str, key: &str, content_type: Option<&str>, cache_control: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                ObjectMetadata {
                    content_type: content_type.map(str::to_string),
                    cache_control: cache_control.map(str::to_string),
                },
            );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<ObjectMetadata> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn copies(&self) -> Vec<CopyRecord> {
        self.state.lock().unwrap().copies.clone()
    }

    pub fn head_count(&self) -> usize {
        self.state.lock().unwrap().head_count
    }

    pub fn fail_head(&self, key: &str) {
        self.state
            .lock()
            .unwrap()
            .head_failures
            .insert(key.to_string());
    }

    pub fn fail_copy(&self, key: &str) {
        self.state
            .lock()
            .unwrap()
            .copy_failures
            .insert(key.to_string());
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().list_failure = true;
    }

    async fn jitter(&self, key: &str) {
        let max_micros = self.max_jitter.as_micros() as u64;
        if max_micros == 0 {
            return;
        }

        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        tokio::time::sleep(Duration::from_micros(hasher.finish() % max_micros)).await;
    }
}

#[derive(Clone)]
struct InMemoryStorage {
    bucket: String,
    store: InMemoryStore,
}

#[async_trait]
impl StorageTrait for InMemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects_page(
        &self,
        max_keys: i32,
        start_after: Option<String>,
        continuation_token: Option<String>,
    ) -> Result<ObjectKeyPage> {
        let state = self.store.state.lock().unwrap();
        if state.list_failure {
            return Err(anyhow!("list_objects_v2() failed."));
        }

        let after = continuation_token.or(start_after).unwrap_or_default();
        let mut remaining = state
            .buckets
            .get(&self.bucket)
            .into_iter()
            .flat_map(|objects| objects.keys())
            .filter(|key| after.is_empty() || key.as_str() > after.as_str());

        let keys: Vec<String> = remaining
            .by_ref()
            .take(max_keys as usize)
            .cloned()
            .collect();
        let next_continuation_token = if remaining.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectKeyPage {
            keys,
            next_continuation_token,
        })
    }

    async fn head_object_metadata(&self, key: &str) -> Result<Option<ObjectMetadata>> {
        self.store.jitter(key).await;

        let mut state = self.store.state.lock().unwrap();
        state.head_count += 1;
        if state.head_failures.contains(key) {
            return Err(anyhow!("head_object() failed: {key}"));
        }

        Ok(state
            .buckets
            .get(&self.bucket)
            .and_then(|objects| objects.get(key).cloned()))
    }

    async fn copy_object_with_metadata_replace(
        &self,
        source_bucket: &str,
        source_key: &str,
        key: &str,
        content_type: &str,
        cache_control: &str,
    ) -> Result<()> {
        self.store.jitter(key).await;

        let mut state = self.store.state.lock().unwrap();
        if state.copy_failures.contains(key) {
            return Err(anyhow!("copy_object() failed: {key}"));
        }
        if !state
            .buckets
            .get(source_bucket)
            .is_some_and(|objects| objects.contains_key(source_key))
        {
            return Err(anyhow!("copy source not found: {source_bucket}/{source_key}"));
        }

        state
            .buckets
            .entry(self.bucket.clone())
            .or_default()
            .insert(
                key.to_string(),
                ObjectMetadata {
                    content_type: Some(content_type.to_string()),
                    cache_control: Some(cache_control.to_string()),
                },
            );
        state.copies.push(CopyRecord {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            cache_control: cache_control.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_objects_page_with_continuation() {
        let store = InMemoryStore::new();
        for key in ["a", "b", "c", "d", "e"] {
            store.put("bucket", key, None, None);
        }
        let storage = store.storage("bucket");

        let page = storage.list_objects_page(2, None, None).await.unwrap();
        assert_eq!(page.keys, vec!["a", "b"]);
        assert_eq!(page.next_continuation_token, Some("b".to_string()));

        let page = storage
            .list_objects_page(2, None, page.next_continuation_token)
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["c", "d"]);

        let page = storage
            .list_objects_page(2, Some("c".to_string()), None)
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["d", "e"]);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn copy_replaces_metadata() {
        let store = InMemoryStore::new();
        store.put("source", "a.jpg", Some("image/jpeg"), Some("no-cache"));
        let target = store.storage("target");

        target
            .copy_object_with_metadata_replace("source", "a.jpg", "a.jpg", "image/jpeg", "public")
            .await
            .unwrap();

        let metadata = store.get("target", "a.jpg").unwrap();
        assert_eq!(metadata.cache_control(), Some("public"));
        assert_eq!(store.copies().len(), 1);

        assert!(
            target
                .copy_object_with_metadata_replace("source", "none", "none", "image/png", "public")
                .await
                .is_err()
        );
    }
}
