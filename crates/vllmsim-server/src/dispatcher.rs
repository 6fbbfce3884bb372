//! Bounded admission queue and the fixed worker pool that drains it.
//!
//! `max_num_seqs` bounds both the channel capacity and the number of
//! workers, so at most `max_num_seqs` requests are in flight and another
//! `max_num_seqs` are queued; beyond that, handlers block on `submit` and
//! backpressure reaches the client. Admission is FIFO; nothing is ordered
//! across workers.

use crate::models::response::CompletionResponse;
use crate::models::CompletionRequest;
use crate::response;
use crate::streaming;
use crate::validation::ValidatedRequest;
use crate::ServerError;
use axum::response::sse::Event;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use vllmsim_core::textgen::{echo_text, random_text};
use vllmsim_core::{AdapterRegistry, Config, LatencyModel, Mode};

/// Where a worker delivers its result.
pub enum Responder {
    /// Single JSON body, sent once generation and pacing finish.
    Unary(oneshot::Sender<CompletionResponse>),
    /// SSE frames, paced as they are produced.
    Stream(mpsc::Sender<Event>),
}

/// One admitted request, owned by the dispatcher until a worker finishes it.
pub struct WorkItem {
    pub request: CompletionRequest,
    pub validated: ValidatedRequest,
    pub responder: Responder,
    pub enqueued_at: Instant,
}

/// Shared read-mostly state the workers run against.
pub(crate) struct SimContext {
    pub config: Arc<Config>,
    pub adapters: Arc<AdapterRegistry>,
    pub latency: LatencyModel,
}

/// Handle for publishing work to the pool.
#[derive(Clone)]
pub struct Dispatcher {
    queue: mpsc::Sender<WorkItem>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    /// Spawn the worker pool and return the submission handle.
    pub fn start(
        config: Arc<Config>,
        adapters: Arc<AdapterRegistry>,
        shutdown: CancellationToken,
    ) -> Self {
        let (queue, rx) = mpsc::channel(config.max_num_seqs);
        let rx = Arc::new(Mutex::new(rx));
        let ctx = Arc::new(SimContext {
            latency: LatencyModel::new(&config),
            adapters,
            config,
        });

        for worker in 0..ctx.config.max_num_seqs {
            tokio::spawn(worker_loop(
                worker,
                Arc::clone(&ctx),
                Arc::clone(&rx),
                shutdown.clone(),
            ));
        }
        tracing::info!(workers = ctx.config.max_num_seqs, "worker pool started");

        Self { queue, shutdown }
    }

    /// Enqueue a request. Blocks while the queue is full; fails with
    /// [`ServerError::QueueShuttingDown`] once shutdown begins.
    pub async fn submit(&self, item: WorkItem) -> Result<(), ServerError> {
        if self.shutdown.is_cancelled() {
            return Err(ServerError::QueueShuttingDown);
        }
        tokio::select! {
            sent = self.queue.send(item) => sent.map_err(|_| ServerError::QueueShuttingDown),
            _ = self.shutdown.cancelled() => Err(ServerError::QueueShuttingDown),
        }
    }
}

async fn worker_loop(
    worker: usize,
    ctx: Arc<SimContext>,
    rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    shutdown: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = async { rx.lock().await.recv().await } => match received {
                Some(item) => item,
                None => break,
            },
        };
        tracing::debug!(
            worker,
            model = item.request.model(),
            queued_for = ?item.enqueued_at.elapsed(),
            stream = item.request.is_stream(),
            "processing request"
        );
        process(&ctx, item).await;
    }
    tracing::debug!(worker, "worker stopped");
}

/// Run one request to completion: adapter admission, text synthesis, and
/// response emission.
async fn process(ctx: &SimContext, item: WorkItem) {
    let WorkItem {
        request, validated, responder, ..
    } = item;

    if request.model() != ctx.config.model {
        ctx.adapters.admit(request.model());
    }

    // Prefill-only requests carry at most the first generated token.
    let cap = if request.do_remote_decode() {
        validated.completion_cap.min(1)
    } else {
        validated.completion_cap
    };
    let (text, finish_reason) = match ctx.config.mode {
        Mode::Echo => echo_text(cap, request.echo_source()),
        Mode::Random => random_text(cap),
    };

    match responder {
        Responder::Unary(reply) => {
            response::respond_unary(ctx, &request, validated.prompt_tokens, &text, finish_reason, reply)
                .await;
        }
        Responder::Stream(frames) => {
            streaming::emit(ctx, &request, validated.prompt_tokens, &text, finish_reason, frames)
                .await;
        }
    }
}
