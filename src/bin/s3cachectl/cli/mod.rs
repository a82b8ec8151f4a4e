use anyhow::{Result, anyhow};
use tokio::time::Instant;
use tracing::{error, info, trace};

use s3cachectl::Config;
use s3cachectl::pipeline::Pipeline;
use s3cachectl::types::FIXUP_SUMMARY_NAME;
use s3cachectl::types::run_context::RunContext;
use s3cachectl::types::token::create_pipeline_cancellation_token;

mod indicator;
mod ui_config;

#[allow(dead_code)]
const EXIT_CODE_SUCCESS: i32 = 0;
#[allow(dead_code)]
const EXIT_CODE_ERROR: i32 = 1;
#[allow(dead_code)]
const EXIT_CODE_INVALID_ARGS: i32 = 2;
const EXIT_CODE_WARNING: i32 = 3;

pub async fn run(config: Config) -> Result<()> {
    #[allow(unused_assignments)]
    let mut has_warning = false;

    {
        let cancellation_token = create_pipeline_cancellation_token();

        let start_time = Instant::now();
        trace!("fixup pipeline start.");

        let mut pipeline = Pipeline::new(config.clone(), cancellation_token).await;
        let run_context = pipeline.get_run_context();
        let indicator_join_handle = indicator::show_indicator(
            pipeline.get_stats_receiver(),
            run_context.clone(),
            ui_config::is_progress_indicator_needed(&config),
            ui_config::is_show_result_needed(&config),
            config.dry_run,
        );

        pipeline.run().await;
        indicator_join_handle.await?;

        let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
        if pipeline.has_error() {
            error!(duration_sec = duration_sec, "s3cachectl failed.");

            return Err(anyhow!("s3cachectl failed."));
        }

        has_warning = pipeline.has_warning();

        show_fixup_summary(&run_context, &duration_sec);

        if has_warning {
            error!(
                failed = run_context.failed(),
                failed_keys_file = %config.failed_keys_file.display(),
                "some objects could not be fixed up."
            );
        }

        trace!(duration_sec = duration_sec, "s3cachectl has been completed.");
    }

    if has_warning {
        std::process::exit(EXIT_CODE_WARNING);
    }

    Ok(())
}

fn show_fixup_summary(run_context: &RunContext, duration_sec: &str) {
    let histograms = run_context.histograms();
    info!(
        name = FIXUP_SUMMARY_NAME,
        processed = run_context.processed(),
        copied = run_context.copied(),
        failed = run_context.failed(),
        written = histograms.written(),
        expected_total = ?run_context.expected_total(),
        status_histogram = ?histograms.status,
        content_type_histogram = ?histograms.content_type,
        duration_sec = duration_sec,
    );
}
