//! Queued intent evaluation.
//!
//! Product mutations publish a [`ProductChanged`] event instead of evaluating
//! in line. A single [`EvaluationWorker`] drains the queue, so evaluations run
//! one at a time in publication order. Publishing never waits: when the queue
//! is full the change is dropped with a warning, and the product's next change
//! is evaluated against its state at that time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

use nearby_shared::Product;

use super::IntentEvaluator;

/// A product's price or stock changed.
#[derive(Debug, Clone)]
pub struct ProductChanged {
    /// The product after the change.
    pub product: Product,
}

/// How a product change reaches the evaluator.
#[derive(Clone)]
pub enum EvaluationDispatch {
    /// Evaluate before the mutation returns.
    Inline(Arc<IntentEvaluator>),
    /// Publish to the evaluation worker.
    Queued(mpsc::Sender<ProductChanged>),
}

impl EvaluationDispatch {
    /// Hand the changed product to the evaluator.
    ///
    /// Failures are logged; the caller's mutation has already succeeded.
    /// In queued mode this never waits for room in the queue.
    pub async fn dispatch(&self, product: Product) {
        match self {
            Self::Inline(evaluator) => {
                evaluator.evaluate_product_change(&product).await;
            }
            Self::Queued(sender) => {
                let product_id = product.id;
                match sender.try_send(ProductChanged { product }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => warn!(
                        product_id = %product_id,
                        capacity = sender.max_capacity(),
                        "Evaluation queue full, change not evaluated"
                    ),
                    Err(TrySendError::Closed(_)) => warn!(
                        product_id = %product_id,
                        "Evaluation queue closed, change not evaluated"
                    ),
                }
            }
        }
    }
}

/// Consumes product change events and evaluates them.
pub struct EvaluationWorker {
    evaluator: Arc<IntentEvaluator>,
    receiver: mpsc::Receiver<ProductChanged>,
    shutdown_rx: broadcast::Receiver<()>,
    /// Total number of events evaluated since startup.
    total_events_processed: Arc<AtomicU64>,
}

impl EvaluationWorker {
    /// Create a worker and the dispatch that feeds it.
    ///
    /// # Arguments
    ///
    /// * `evaluator` - The evaluator to run for each event
    /// * `buffer_size` - Capacity of the event queue
    /// * `shutdown_rx` - Stops the worker when a value is broadcast
    pub fn channel(
        evaluator: Arc<IntentEvaluator>,
        buffer_size: usize,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> (EvaluationDispatch, Self) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let worker = Self {
            evaluator,
            receiver,
            shutdown_rx,
            total_events_processed: Arc::new(AtomicU64::new(0)),
        };
        (EvaluationDispatch::Queued(sender), worker)
    }

    /// Shared counter of evaluated events.
    pub fn processed_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.total_events_processed)
    }

    /// Run until shutdown is broadcast or every dispatch is dropped.
    ///
    /// Events already queued when shutdown arrives are still evaluated.
    /// Returns the number of events evaluated.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> u64 {
        info!("Starting evaluation worker");

        loop {
            tokio::select! {
                event = self.receiver.recv() => {
                    match event {
                        Some(event) => self.process(event).await,
                        None => {
                            info!("All dispatchers dropped, stopping evaluation worker");
                            break;
                        }
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Received shutdown signal, draining evaluation queue");
                    self.receiver.close();
                    while let Some(event) = self.receiver.recv().await {
                        self.process(event).await;
                    }
                    break;
                }
            }
        }

        let total = self.total_events_processed.load(Ordering::Relaxed);
        info!(total_events_processed = total, "Evaluation worker stopped");
        total
    }

    async fn process(&self, event: ProductChanged) {
        let report = self.evaluator.evaluate_product_change(&event.product).await;
        self.total_events_processed.fetch_add(1, Ordering::Relaxed);
        debug!(
            product_id = %event.product.id,
            examined = report.examined,
            notified = report.notified,
            "Processed product change"
        );
    }
}
