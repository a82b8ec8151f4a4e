use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Error, anyhow};
use async_channel::{Receiver, Sender};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, trace};

use crate::Config;
use crate::pipeline::estimator::ObjectCountEstimator;
use crate::pipeline::failure_sink::FailureSink;
use crate::pipeline::fixer::FixupEngine;
use crate::pipeline::lister::KeyLister;
use crate::pipeline::stage::Stage;
use crate::pipeline::worker::FixupWorker;
use crate::storage::cloudwatch::Metrics;
use crate::storage::{Storage, StoragePair};
use crate::types::FixupStatistics;
use crate::types::run_context::RunContext;
use crate::types::token::PipelineCancellationToken;

const CHANNEL_CAPACITY: usize = 20000;

mod estimator;
mod failure_sink;
mod fixer;
mod lister;
mod stage;
mod storage_factory;
mod worker;

/// One fix-up run: a key lister feeding a bounded queue drained by `worker_size` workers,
/// with the object count estimator running alongside.
pub struct Pipeline {
    config: Config,
    source: Storage,
    target: Storage,
    metrics: Option<Vec<Metrics>>,
    cancellation_token: PipelineCancellationToken,
    stats_sender: Sender<FixupStatistics>,
    stats_receiver: Receiver<FixupStatistics>,
    has_error: Arc<AtomicBool>,
    has_warning: Arc<AtomicBool>,
    errors: Arc<Mutex<VecDeque<Error>>>,
    run_context: Arc<RunContext>,
    failure_sink: Arc<FailureSink>,
    ready: bool,
}

impl Pipeline {
    pub async fn new(config: Config, cancellation_token: PipelineCancellationToken) -> Self {
        let storage_pair = storage_factory::create_storage_pair(&config).await;
        let metrics = storage_factory::create_metrics(&config).await;

        Self::with_storage(config, storage_pair, metrics, cancellation_token)
    }

    /// `metrics` are queried in order for the object count estimate.
    pub fn with_storage(
        config: Config,
        storage_pair: StoragePair,
        metrics: Vec<Metrics>,
        cancellation_token: PipelineCancellationToken,
    ) -> Self {
        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let run_context = Arc::new(RunContext::new(config.progress_interval));
        let failure_sink = Arc::new(FailureSink::new(config.failed_keys_file.clone()));

        Self {
            config,
            source: storage_pair.source,
            target: storage_pair.target,
            metrics: Some(metrics),
            cancellation_token,
            stats_sender,
            stats_receiver,
            has_error: Arc::new(AtomicBool::new(false)),
            has_warning: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(Mutex::new(VecDeque::<Error>::new())),
            run_context,
            failure_sink,
            ready: true,
        }
    }

    pub async fn run(&mut self) {
        if !self.ready {
            panic!("it can be executed only once.")
        }
        self.ready = false;

        let estimator = self.estimate_object_count();
        let lister = self.list_keys();

        self.fix_objects(lister.receiver).await;

        if let Err(e) = lister.handle.await {
            log_error(
                self.has_error.clone(),
                self.errors.clone(),
                anyhow!(e),
                "key lister panicked.",
            );
        }
        estimator.abort();

        self.shutdown();
    }

    fn shutdown(&self) {
        self.close_stats_sender();
    }

    fn estimate_object_count(&mut self) -> JoinHandle<()> {
        let estimator = ObjectCountEstimator::new(
            self.config.estimate_config.clone(),
            self.config.source_bucket.clone(),
            self.metrics.take().unwrap_or_default(),
            self.run_context.clone(),
        );

        tokio::spawn(async move {
            estimator.run().await;
        })
    }

    fn list_keys(&self) -> SpawnedLister {
        let (sender, receiver) = async_channel::bounded::<String>(CHANNEL_CAPACITY);
        let stage = self.create_stage(None, Some(sender));
        let key_lister = KeyLister::new(stage);
        let has_error = self.has_error.clone();
        let error_list = self.errors.clone();

        let handle = tokio::spawn(async move {
            let result = key_lister.list().await;
            match result {
                Ok(()) => {}
                Err(e) => {
                    log_error(has_error, error_list, e, "list keys failed.");
                }
            }
        });

        SpawnedLister { receiver, handle }
    }

    async fn fix_objects(&self, keys: Receiver<String>) {
        let mut join_set = JoinSet::new();

        for worker_index in 0..self.config.worker_size {
            let engine = FixupEngine::new(
                self.config.clone(),
                dyn_clone::clone_box(&*self.source),
                dyn_clone::clone_box(&*self.target),
                self.run_context.clone(),
                self.stats_sender.clone(),
            );
            let worker = FixupWorker::new(
                self.create_stage(Some(keys.clone()), None),
                worker_index,
                engine,
                self.failure_sink.clone(),
            );
            let has_error = self.has_error.clone();
            let error_list = self.errors.clone();

            join_set.spawn(async move {
                let result = worker.run().await;
                match result {
                    Ok(_) => {}
                    Err(e) => {
                        log_error(has_error, error_list, e, "fixup objects failed.");
                    }
                }
            });
        }
        drop(keys);

        trace!(worker_size = self.config.worker_size, "all fixup workers have been started.");

        while let Some(result) = join_set.join_next().await {
            if let Err(e) = result {
                log_error(
                    self.has_error.clone(),
                    self.errors.clone(),
                    anyhow!(e),
                    "fixup worker panicked.",
                );
            }
        }

        trace!("all fixup workers have been completed.");
    }

    fn create_stage(
        &self,
        receiver: Option<Receiver<String>>,
        sender: Option<Sender<String>>,
    ) -> Stage {
        Stage::new(
            self.config.clone(),
            dyn_clone::clone_box(&*self.source),
            receiver,
            sender,
            self.cancellation_token.clone(),
            self.has_warning.clone(),
            self.run_context.clone(),
            self.stats_sender.clone(),
        )
    }

    pub fn get_stats_receiver(&self) -> Receiver<FixupStatistics> {
        self.stats_receiver.clone()
    }

    pub fn get_run_context(&self) -> Arc<RunContext> {
        self.run_context.clone()
    }

    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::SeqCst)
    }

    pub fn has_warning(&self) -> bool {
        self.has_warning.load(Ordering::SeqCst)
    }

    pub fn get_errors_and_consume(&self) -> Option<Vec<Error>> {
        if !self.has_error() {
            return None;
        }

        let mut error_list = self.errors.lock().unwrap();
        Some(error_list.drain(..).collect())
    }

    pub fn close_stats_sender(&self) {
        self.stats_sender.close();
    }
}

struct SpawnedLister {
    receiver: Receiver<String>,
    handle: JoinHandle<()>,
}

fn log_error(
    has_error: Arc<AtomicBool>,
    errors: Arc<Mutex<VecDeque<Error>>>,
    e: Error,
    message: &str,
) {
    has_error.store(true, Ordering::SeqCst);

    let error = e.to_string();
    let source = e.source();

    error!(error = error, source = source, message);

    let mut error_list = errors.lock().unwrap();
    error_list.push_back(e);
}
