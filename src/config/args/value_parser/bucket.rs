const S3_SCHEME: &str = "s3://";

const EMPTY_BUCKET_NAME: &str = "bucket name must not be empty.";
const BUCKET_NAME_WITH_PREFIX: &str =
    "bucket name must not contain '/'. a prefix cannot be specified.";

/// Accepts `s3://<BUCKET_NAME>` or `<BUCKET_NAME>` and returns the bare bucket name.
pub fn check_bucket_name(bucket: &str) -> Result<String, String> {
    let bucket = bucket.strip_prefix(S3_SCHEME).unwrap_or(bucket);
    let bucket = bucket.strip_suffix('/').unwrap_or(bucket);

    if bucket.is_empty() {
        return Err(EMPTY_BUCKET_NAME.to_string());
    }
    if bucket.contains('/') {
        return Err(BUCKET_NAME_WITH_PREFIX.to_string());
    }

    Ok(bucket.to_string())
}
