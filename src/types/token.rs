/// Cancelled only when the pipeline cannot continue, e.g. the failed-keys file is unwritable.
pub type PipelineCancellationToken = tokio_util::sync::CancellationToken;

pub fn create_pipeline_cancellation_token() -> PipelineCancellationToken {
    tokio_util::sync::CancellationToken::new()
}
