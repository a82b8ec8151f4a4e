use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FixupError {
    #[error("source metadata read failed.")]
    SourceMetadataReadFailed,
    #[error("source object not found.")]
    SourceObjectNotFound,
    #[error("failed to record the failed key.")]
    FailureSinkUnavailable,
}

pub fn is_failure_sink_error(e: &anyhow::Error) -> bool {
    if let Some(err) = e.downcast_ref::<FixupError>() {
        return *err == FixupError::FailureSinkUnavailable;
    }

    false
}
