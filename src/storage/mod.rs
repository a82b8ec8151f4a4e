use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;
use leaky_bucket::RateLimiter;

use crate::config::ClientConfig;
use crate::types::{ObjectKeyPage, ObjectMetadata};

pub mod cloudwatch;
pub mod in_memory;
pub mod s3;

pub type Storage = Box<dyn StorageTrait + Send + Sync>;

pub struct StoragePair {
    pub source: Storage,
    pub target: Storage,
}

#[async_trait]
pub trait StorageFactory {
    async fn create(
        client_config: &ClientConfig,
        bucket: String,
        rate_limit_objects_per_sec: Option<Arc<RateLimiter>>,
    ) -> Storage;
}

/// Object store operations used by the fix-up pipeline. One instance is bound to one bucket.
#[async_trait]
pub trait StorageTrait: DynClone {
    fn bucket(&self) -> &str;

    async fn list_objects_page(
        &self,
        max_keys: i32,
        start_after: Option<String>,
        continuation_token: Option<String>,
    ) -> Result<ObjectKeyPage>;

    /// `Ok(None)` if the object does not exist.
    async fn head_object_metadata(&self, key: &str) -> Result<Option<ObjectMetadata>>;

    /// Copies `source_bucket/source_key` onto `key` in this bucket, replacing all metadata.
    async fn copy_object_with_metadata_replace(
        &self,
        source_bucket: &str,
        source_key: &str,
        key: &str,
        content_type: &str,
        cache_control: &str,
    ) -> Result<()>;
}
