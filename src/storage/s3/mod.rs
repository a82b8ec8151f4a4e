use std::sync::Arc;

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::copy_object::CopyObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::types::MetadataDirective;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use aws_smithy_types::body::SdkBody;
use leaky_bucket::RateLimiter;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::storage::{Storage, StorageFactory, StorageTrait};
use crate::types::{ObjectKeyPage, ObjectMetadata};

pub mod client_builder;

const COPY_SOURCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct S3StorageFactory {}

#[async_trait]
impl StorageFactory for S3StorageFactory {
    async fn create(
        client_config: &ClientConfig,
        bucket: String,
        rate_limit_objects_per_sec: Option<Arc<RateLimiter>>,
    ) -> Storage {
        S3Storage::boxed_new(
            bucket,
            Arc::new(client_config.create_client().await),
            rate_limit_objects_per_sec,
        )
    }
}

#[derive(Clone)]
pub struct S3Storage {
    bucket: String,
    client: Arc<Client>,
    rate_limit_objects_per_sec: Option<Arc<RateLimiter>>,
}

impl S3Storage {
    pub fn boxed_new(
        bucket: String,
        client: Arc<Client>,
        rate_limit_objects_per_sec: Option<Arc<RateLimiter>>,
    ) -> Storage {
        Box::new(S3Storage {
            bucket,
            client,
            rate_limit_objects_per_sec,
        })
    }

    async fn exec_rate_limit_objects_per_sec(&self) {
        if let Some(rate_limiter) = self.rate_limit_objects_per_sec.as_ref() {
            rate_limiter.acquire(1).await;
        }
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects_page(
        &self,
        max_keys: i32,
        start_after: Option<String>,
        continuation_token: Option<String>,
    ) -> Result<ObjectKeyPage> {
        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys)
            .set_start_after(start_after)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .context("aws_sdk_s3::client::list_objects_v2() failed.")?;

        let keys: Vec<String> = list_objects_output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        let next_continuation_token = if list_objects_output.is_truncated().unwrap_or(false) {
            list_objects_output
                .next_continuation_token()
                .map(str::to_string)
        } else {
            None
        };

        trace!(
            bucket = self.bucket,
            key_count = keys.len(),
            truncated = next_continuation_token.is_some(),
            "list_objects_v2() page received."
        );

        Ok(ObjectKeyPage {
            keys,
            next_continuation_token,
        })
    }

    async fn head_object_metadata(&self, key: &str) -> Result<Option<ObjectMetadata>> {
        self.exec_rate_limit_objects_per_sec().await;

        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(head_object_output) => Ok(Some(ObjectMetadata {
                content_type: head_object_output.content_type().map(str::to_string),
                cache_control: head_object_output.cache_control().map(str::to_string),
            })),
            Err(e) => {
                let e = anyhow!(e);
                if is_head_object_not_found_error(&e) {
                    debug!(bucket = self.bucket, key = key, "object not found.");
                    return Ok(None);
                }

                Err(e.context("aws_sdk_s3::client::head_object() failed."))
            }
        }
    }

    async fn copy_object_with_metadata_replace(
        &self,
        source_bucket: &str,
        source_key: &str,
        key: &str,
        content_type: &str,
        cache_control: &str,
    ) -> Result<()> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(key)
            .copy_source(generate_copy_source(source_bucket, source_key))
            .content_type(content_type)
            .cache_control(cache_control)
            .metadata_directive(MetadataDirective::Replace)
            .send()
            .await
            .context("aws_sdk_s3::client::copy_object() failed.")?;

        Ok(())
    }
}

fn generate_copy_source(bucket: &str, key: &str) -> String {
    format!(
        "{}/{}",
        bucket,
        utf8_percent_encode(key, COPY_SOURCE_ENCODE_SET)
    )
}

fn is_head_object_not_found_error(result: &Error) -> bool {
    if let Some(SdkError::ServiceError(e)) =
        result.downcast_ref::<SdkError<HeadObjectError, Response<SdkBody>>>()
    {
        if e.err().is_not_found() {
            return true;
        }
    }

    false
}

pub fn is_access_denied_error(result: &Error) -> bool {
    // HEAD responses carry no error body, so only the status code is available.
    if let Some(SdkError::ServiceError(e)) =
        result.downcast_ref::<SdkError<HeadObjectError, Response<SdkBody>>>()
    {
        return e.raw().status().as_u16() == 403;
    }

    if let Some(SdkError::ServiceError(e)) =
        result.downcast_ref::<SdkError<CopyObjectError, Response<SdkBody>>>()
    {
        if let Some(code) = e.err().meta().code() {
            return code == "AccessDenied";
        }
    }

    false
}
