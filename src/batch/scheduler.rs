//! Bounded-concurrency batch execution with per-item retry.

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::batch::events::{emit, BatchEvent};
use crate::batch::options::BatchOptions;
use crate::batch::result::{BatchResult, ItemFailure};
use crate::batch::work::{ItemState, WorkItem};
use crate::error::{classify_boxed, BoxError, Error};

/// Outcome of one fully settled item.
struct SettledItem<T> {
    index: usize,
    attempts: u32,
    outcome: Result<T, BoxError>,
}

/// Runs ordered batches of work items under a concurrency cap.
///
/// Holds no state between runs; the options, the optional event channel, and
/// the optional cancellation signal are fixed at construction.
pub struct BatchScheduler {
    options: BatchOptions,
    events: Option<mpsc::Sender<BatchEvent>>,
    cancel: Option<watch::Receiver<bool>>,
}

impl BatchScheduler {
    /// Create a scheduler with the given options.
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            events: None,
            cancel: None,
        }
    }

    /// Attach a lifecycle event channel (best-effort delivery).
    pub fn with_events(mut self, events: mpsc::Sender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Attach a cancellation signal.
    ///
    /// Flipping the signal to `true` stops new launches and interrupts
    /// in-flight attempts and retry waits; interrupted items settle as
    /// failures with [`Error::Cancelled`].
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The options this scheduler runs with.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run every item to permanent settlement and aggregate the outcomes.
    ///
    /// Items are launched in strict ascending index order while fewer than
    /// the cap are in flight. Never returns an error: item failures are
    /// recorded per index in the result.
    ///
    /// With `continue_on_error` off, a permanent failure sets an abort flag
    /// honored at the next scheduling decision point: settled completions
    /// are drained immediately before every launch, so an item that fails
    /// synchronously prevents the very next launch. Items already in flight
    /// and retries already committed still run to completion.
    pub async fn run<T: Send>(&self, items: Vec<Box<dyn WorkItem<Output = T>>>) -> BatchResult<T> {
        let total = items.len();
        let cap = self.options.effective_concurrency();
        let batch_start = Instant::now();

        emit(
            self.events.as_ref(),
            BatchEvent::Started {
                total,
                concurrency: cap,
                at: chrono::Utc::now(),
            },
        );
        debug!(total, concurrency = cap, "batch started");

        let mut successful: Vec<(usize, T)> = Vec::new();
        let mut failed: Vec<ItemFailure> = Vec::new();
        let mut in_flight = FuturesUnordered::new();
        let mut next_index = 0usize;
        let mut aborted = false;

        loop {
            // Launch phase. Every launch is a scheduling decision point:
            // already-settled completions are drained first and the abort
            // flag re-checked, so a synchronous failure stops the cursor
            // before the next item starts.
            while !aborted
                && !self.cancel_requested()
                && next_index < total
                && in_flight.len() < cap
            {
                while let Some(Some(settled)) = in_flight.next().now_or_never() {
                    let was_failure =
                        self.record(settled, &mut successful, &mut failed, in_flight.len());
                    if was_failure && !self.options.continue_on_error {
                        aborted = true;
                    }
                }
                if aborted || self.cancel_requested() {
                    break;
                }
                in_flight.push(drive_item(
                    next_index,
                    items[next_index].as_ref(),
                    &self.options,
                    self.events.as_ref(),
                    self.cancel.clone(),
                ));
                next_index += 1;
            }

            if in_flight.is_empty() {
                break;
            }

            match in_flight.next().await {
                Some(settled) => {
                    let was_failure =
                        self.record(settled, &mut successful, &mut failed, in_flight.len());
                    if was_failure && !self.options.continue_on_error {
                        aborted = true;
                    }
                }
                None => break,
            }
        }

        let result = BatchResult::new(total, successful, failed);
        let duration = batch_start.elapsed();
        emit(
            self.events.as_ref(),
            BatchEvent::Finished {
                succeeded: result.successful().len(),
                failed: result.failed().len(),
                duration,
                at: chrono::Utc::now(),
            },
        );
        info!(
            total,
            succeeded = result.successful().len(),
            failed = result.failed().len(),
            duration_ms = duration.as_millis() as u64,
            "batch finished"
        );
        result
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|signal| *signal.borrow())
            .unwrap_or(false)
    }

    /// Record a settled item and emit progress. Returns true for a failure.
    fn record<T>(
        &self,
        settled: SettledItem<T>,
        successful: &mut Vec<(usize, T)>,
        failed: &mut Vec<ItemFailure>,
        in_flight: usize,
    ) -> bool {
        let was_failure = match settled.outcome {
            Ok(value) => {
                successful.push((settled.index, value));
                false
            }
            Err(error) => {
                warn!(
                    index = settled.index,
                    attempts = settled.attempts,
                    category = classify_boxed(&error).as_str(),
                    %error,
                    "work item failed permanently"
                );
                failed.push(ItemFailure {
                    index: settled.index,
                    attempts: settled.attempts,
                    error,
                });
                true
            }
        };
        emit(
            self.events.as_ref(),
            BatchEvent::Progress {
                succeeded: successful.len(),
                failed: failed.len(),
                in_flight,
            },
        );
        was_failure
    }
}

/// Drive one item from first attempt to permanent settlement.
///
/// Walks `Pending -> Retrying -> Settled`. The cancellation signal is
/// observed at both suspension points: the attempt itself and the retry
/// wait. A cancelled attempt settles immediately; it is never retried.
async fn drive_item<T: Send>(
    index: usize,
    item: &dyn WorkItem<Output = T>,
    options: &BatchOptions,
    events: Option<&mpsc::Sender<BatchEvent>>,
    cancel: Option<watch::Receiver<bool>>,
) -> SettledItem<T> {
    let mut state = ItemState::Pending;
    let mut attempts = 0u32;

    loop {
        state = match state {
            ItemState::Pending => {
                attempts = 1;
                match run_attempt(item, cancel.clone()).await {
                    Ok(value) => ItemState::Settled(Ok(value)),
                    Err(error) => next_state_after_failure(index, 0, error, options, events),
                }
            }
            ItemState::Retrying { attempt, not_before } => {
                if wait_for_deadline(not_before, cancel.clone()).await {
                    ItemState::Settled(Err(cancelled_error()))
                } else {
                    attempts = attempt + 2;
                    match run_attempt(item, cancel.clone()).await {
                        Ok(value) => ItemState::Settled(Ok(value)),
                        Err(error) => {
                            next_state_after_failure(index, attempt + 1, error, options, events)
                        }
                    }
                }
            }
            ItemState::Settled(outcome) => {
                return SettledItem {
                    index,
                    attempts,
                    outcome,
                };
            }
        };
    }
}

/// Decide whether a failed attempt earns retry `retry_attempt` (0-based).
fn next_state_after_failure<T>(
    index: usize,
    retry_attempt: u32,
    error: BoxError,
    options: &BatchOptions,
    events: Option<&mpsc::Sender<BatchEvent>>,
) -> ItemState<T> {
    if is_cancelled(&error) || retry_attempt >= options.retry_limit {
        return ItemState::Settled(Err(error));
    }
    let delay = options.delay_for_attempt(retry_attempt);
    emit(
        events,
        BatchEvent::Retried {
            index,
            attempt: retry_attempt,
            delay,
        },
    );
    debug!(
        index,
        attempt = retry_attempt,
        delay_ms = delay.as_millis() as u64,
        "retrying work item"
    );
    ItemState::Retrying {
        attempt: retry_attempt,
        not_before: Instant::now() + delay,
    }
}

/// Run one attempt, racing it against cancellation when a signal is attached.
async fn run_attempt<T: Send>(
    item: &dyn WorkItem<Output = T>,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<T, BoxError> {
    match cancel {
        Some(signal) => tokio::select! {
            _ = wait_cancelled(signal) => Err(cancelled_error()),
            outcome = item.attempt() => outcome,
        },
        None => item.attempt().await,
    }
}

/// Sleep until the retry deadline; true when interrupted by cancellation.
async fn wait_for_deadline(not_before: Instant, cancel: Option<watch::Receiver<bool>>) -> bool {
    match cancel {
        Some(signal) => tokio::select! {
            _ = wait_cancelled(signal) => true,
            _ = sleep_until(not_before) => false,
        },
        None => {
            sleep_until(not_before).await;
            false
        }
    }
}

/// Resolve once the signal flips to `true`. Never resolves if the sender is
/// dropped without cancelling.
async fn wait_cancelled(mut cancel: watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn cancelled_error() -> BoxError {
    Box::new(Error::Cancelled)
}

fn is_cancelled(error: &BoxError) -> bool {
    matches!(error.downcast_ref::<Error>(), Some(Error::Cancelled))
}
