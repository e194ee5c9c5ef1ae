use serenity::async_trait;

use crate::broadcast::guard::AdmissionDenied;
use crate::broadcast::state::{FinalSummary, ProgressSnapshot};

/// Interface for rendering broadcast progress to the user
///
/// Errors returned here are logged by the coordinator and otherwise ignored;
/// they never affect delivery or accounting.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Admission was refused (cooldown or already running)
    async fn denied(&self, reason: &AdmissionDenied) -> anyhow::Result<()>;

    /// Broadcast admitted and recipient snapshot taken
    async fn started(&self, total: usize) -> anyhow::Result<()>;

    /// A chunk finished
    async fn progress(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()>;

    /// Every recipient has an outcome
    async fn finished(&self, summary: &FinalSummary) -> anyhow::Result<()>;

    /// Broadcast aborted before delivery could start
    async fn failed(&self, error: &anyhow::Error) -> anyhow::Result<()>;
}
