use serde::Serialize;

use super::outcome::{DeliveryOutcome, RejectReason};
use super::recipient::Recipient;

/// Default number of failed recipients kept for the summary
pub const DEFAULT_FAILED_SAMPLE_LIMIT: usize = 10;

/// Progress reported to the sink after each chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

/// Failed recipient entry kept in the bounded sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRecipient {
    pub tag: String,
    pub reason: RejectReason,
}

/// Final result of a broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    pub failed_sample: Vec<FailedRecipient>,
    /// Failures beyond the sample limit
    pub failed_overflow: usize,
    pub cancelled: bool,
}

impl FinalSummary {
    /// Success rate in percent rounded to one decimal, `None` for an empty broadcast
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let rate = self.succeeded as f64 / self.total as f64 * 100.0;
        Some((rate * 10.0).round() / 10.0)
    }

    /// Failed sample as display lines, with an overflow note when truncated
    pub fn failed_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .failed_sample
            .iter()
            .map(|entry| format!("{} ({})", entry.tag, entry.reason))
            .collect();
        if self.failed_overflow > 0 {
            lines.push(format!("...and {} more", self.failed_overflow));
        }
        lines
    }
}

/// Mutable accounting for one running broadcast
///
/// Only the coordinator task writes to it. Every recipient in the snapshot
/// is recorded exactly once before the state is turned into a summary.
#[derive(Debug)]
pub struct BroadcastState {
    total: usize,
    attempted: usize,
    succeeded: usize,
    failed: usize,
    processed: usize,
    failed_sample: Vec<FailedRecipient>,
    failed_overflow: usize,
    sample_limit: usize,
}

impl BroadcastState {
    pub fn new(total: usize, sample_limit: usize) -> Self {
        Self {
            total,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            processed: 0,
            failed_sample: Vec::new(),
            failed_overflow: 0,
            sample_limit,
        }
    }

    /// Count delivery attempts (retries included)
    pub fn record_attempts(&mut self, count: usize) {
        self.attempted += count;
    }

    /// Record the terminal outcome for one recipient
    pub fn record(&mut self, recipient: &Recipient, outcome: DeliveryOutcome) {
        self.processed += 1;
        match outcome {
            DeliveryOutcome::Delivered => self.succeeded += 1,
            DeliveryOutcome::Rejected(reason) => {
                self.failed += 1;
                if self.failed_sample.len() < self.sample_limit {
                    self.failed_sample.push(FailedRecipient {
                        tag: recipient.tag.clone(),
                        reason,
                    });
                } else {
                    self.failed_overflow += 1;
                }
            }
        }
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed,
            succeeded: self.succeeded,
            failed: self.failed,
            total: self.total,
        }
    }

    pub fn into_summary(self, cancelled: bool) -> FinalSummary {
        FinalSummary {
            succeeded: self.succeeded,
            failed: self.failed,
            total: self.total,
            failed_sample: self.failed_sample,
            failed_overflow: self.failed_overflow,
            cancelled,
        }
    }
}
