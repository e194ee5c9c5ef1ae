use crate::adapters::{DeliveryTransport, MemberProvider, ProgressSink};
use anyhow::Context as _;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::delivery::DeliveryWorker;
use super::guard::{AdmissionDenied, GuardRegistry};
use super::notification::Notification;
use super::outcome::{DeliveryOutcome, RejectReason};
use super::recipient::Recipient;
use super::recipient_filter::RecipientFilter;
use super::shutdown::ShutdownSignal;
use super::source::BroadcastSource;
use super::state::{BroadcastState, DEFAULT_FAILED_SAMPLE_LIMIT, FinalSummary};

/// Default number of recipients delivered to concurrently before pacing
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Tunables for one coordinator
#[derive(Debug, Clone, Copy)]
pub struct BroadcastPolicy {
    pub chunk_size: usize,
    pub failed_sample_limit: usize,
    /// Extra rounds for recipients whose delivery failed transiently
    pub max_transient_retries: usize,
    pub filter: RecipientFilter,
}

impl Default for BroadcastPolicy {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            failed_sample_limit: DEFAULT_FAILED_SAMPLE_LIMIT,
            max_transient_retries: 0,
            filter: RecipientFilter::default(),
        }
    }
}

/// How a broadcast run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastReport {
    /// Admission refused; nothing was sent
    Denied(AdmissionDenied),
    /// Every recipient has an outcome (possibly after cancellation)
    Completed(FinalSummary),
    /// Aborted before delivery started
    Failed(String),
}

/// Orchestrates a full broadcast
///
/// `Idle -> Admitted -> Running -> Finalizing -> Idle`. The permit obtained
/// at admission is dropped on every exit path, so the guard is never left
/// locked. The coordinator task is the only writer of `BroadcastState`.
pub struct BatchCoordinator<T, M>
where
    T: DeliveryTransport,
    M: MemberProvider,
{
    worker: DeliveryWorker<T>,
    members: Arc<M>,
    guard: GuardRegistry,
    policy: BroadcastPolicy,
}

impl<T, M> BatchCoordinator<T, M>
where
    T: DeliveryTransport,
    M: MemberProvider,
{
    /// Create a new BatchCoordinator
    ///
    /// # Arguments
    ///
    /// * `transport` - Delivery transport used for every recipient
    /// * `members` - Membership snapshot provider
    /// * `guard` - Shared admission registry (also owns the rate limiter)
    /// * `policy` - Chunking, sampling, retry and filtering knobs
    pub fn new(
        transport: Arc<T>,
        members: Arc<M>,
        guard: GuardRegistry,
        policy: BroadcastPolicy,
    ) -> Self {
        let policy = BroadcastPolicy {
            chunk_size: policy.chunk_size.max(1),
            ..policy
        };

        Self {
            worker: DeliveryWorker::new(transport),
            members,
            guard,
            policy,
        }
    }

    pub fn guard(&self) -> &GuardRegistry {
        &self.guard
    }

    /// Run one broadcast for `source`, reporting to `sink`
    pub async fn run<P>(
        &self,
        source: &BroadcastSource,
        sink: &P,
        shutdown: &ShutdownSignal,
    ) -> BroadcastReport
    where
        P: ProgressSink + ?Sized,
    {
        // Idle -> Admitted
        let permit = match self.guard.try_admit(source.key) {
            Ok(permit) => permit,
            Err(denied) => {
                info!(source = %source.key, reason = %denied, "Broadcast denied");
                notify("denied", sink.denied(&denied).await);
                return BroadcastReport::Denied(denied);
            }
        };

        // Admitted -> Running
        let raw_members = match self
            .members
            .members(source.key.guild_id)
            .await
            .context("Member snapshot unavailable")
        {
            Ok(members) => members,
            Err(err) => {
                error!(source = %source.key, ?err, "Broadcast failed before delivery");
                drop(permit);
                notify("failed", sink.failed(&err).await);
                return BroadcastReport::Failed(format!("{:#}", err));
            }
        };

        let recipients = self.policy.filter.filter(&raw_members, source.author_id);
        let notification = Notification::render(source);
        let mut state = BroadcastState::new(recipients.len(), self.policy.failed_sample_limit);

        info!(
            source = %source.key,
            author = %source.author_id,
            members = raw_members.len(),
            recipients = recipients.len(),
            "Broadcast started"
        );
        notify("started", sink.started(recipients.len()).await);

        let cancelled = self
            .deliver_all(&recipients, &notification, &mut state, sink, shutdown)
            .await;

        // Running -> Finalizing -> Idle
        let attempts = state.attempted();
        drop(permit);
        let summary = state.into_summary(cancelled);

        info!(
            source = %source.key,
            succeeded = summary.succeeded,
            failed = summary.failed,
            total = summary.total,
            attempts,
            cancelled,
            "Broadcast finished"
        );
        notify("finished", sink.finished(&summary).await);

        BroadcastReport::Completed(summary)
    }

    /// Drive every chunk; returns `true` when stopped by shutdown
    async fn deliver_all<P>(
        &self,
        recipients: &[Recipient],
        notification: &Notification,
        state: &mut BroadcastState,
        sink: &P,
        shutdown: &ShutdownSignal,
    ) -> bool
    where
        P: ProgressSink + ?Sized,
    {
        for (index, chunk) in recipients.chunks(self.policy.chunk_size).enumerate() {
            let interrupted = index > 0 && self.pace(index - 1, shutdown).await;

            if interrupted || shutdown.is_triggered() {
                let remaining = &recipients[state.processed()..];
                warn!(
                    remaining = remaining.len(),
                    "Broadcast cancelled, remaining recipients marked transient"
                );
                for recipient in remaining {
                    state.record(recipient, DeliveryOutcome::Rejected(RejectReason::Transient));
                }
                return true;
            }

            let outcomes = self.deliver_chunk(index, chunk, notification, state, shutdown).await;
            for (recipient, outcome) in chunk.iter().zip(outcomes) {
                state.record(recipient, outcome);
            }

            notify("progress", sink.progress(&state.snapshot()).await);
        }

        false
    }

    /// Deliver one chunk concurrently, then retry transient failures
    async fn deliver_chunk(
        &self,
        index: usize,
        chunk: &[Recipient],
        notification: &Notification,
        state: &mut BroadcastState,
        shutdown: &ShutdownSignal,
    ) -> Vec<DeliveryOutcome> {
        let mut outcomes = join_all(
            chunk
                .iter()
                .map(|recipient| self.worker.deliver(recipient, notification)),
        )
        .await;
        state.record_attempts(chunk.len());

        for _ in 0..self.policy.max_transient_retries {
            let pending: Vec<usize> = outcomes
                .iter()
                .enumerate()
                .filter(|(_, outcome)| outcome.is_transient())
                .map(|(position, _)| position)
                .collect();

            if pending.is_empty() || self.pace(index, shutdown).await {
                break;
            }

            let retried = join_all(
                pending
                    .iter()
                    .map(|&position| self.worker.deliver(&chunk[position], notification)),
            )
            .await;
            state.record_attempts(pending.len());

            for (position, outcome) in pending.into_iter().zip(retried) {
                outcomes[position] = outcome;
            }
        }

        outcomes
    }

    /// The single suspension point between deliveries
    ///
    /// Returns `true` when interrupted by shutdown.
    async fn pace(&self, chunk_index: usize, shutdown: &ShutdownSignal) -> bool {
        let delay = self.guard.limiter().pace(chunk_index);
        shutdown.sleep(delay).await
    }
}

/// Discard a sink failure after logging it
fn notify(stage: &'static str, result: anyhow::Result<()>) {
    if let Err(err) = result {
        warn!(stage, ?err, "Progress sink failed; continuing");
    }
}
