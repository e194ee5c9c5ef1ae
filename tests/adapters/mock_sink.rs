use anyhow::bail;
use dmcast::adapters::ProgressSink;
use dmcast::broadcast::{
    AdmissionDenied, FinalSummary, ProgressSnapshot, ShutdownTrigger,
};
use serenity::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Denied(AdmissionDenied),
    Started(usize),
    Progress(ProgressSnapshot),
    Finished(FinalSummary),
    Failed(String),
}

pub struct MockProgressSink {
    pub events: Arc<Mutex<Vec<SinkEvent>>>,
    broken: bool,
    stop_after_progress: Mutex<Option<ShutdownTrigger>>,
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProgressSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            broken: false,
            stop_after_progress: Mutex::new(None),
        }
    }

    /// A sink that records events but reports every render as failed
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::new()
        }
    }

    /// Fire `trigger` when the first progress snapshot arrives
    pub fn stopping_after_first_chunk(trigger: ShutdownTrigger) -> Self {
        Self {
            stop_after_progress: Mutex::new(Some(trigger)),
            ..Self::new()
        }
    }

    pub fn get_events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<ProgressSnapshot> {
        self.get_events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Progress(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SinkEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        if self.broken {
            bail!("status message was deleted");
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for MockProgressSink {
    async fn denied(&self, reason: &AdmissionDenied) -> anyhow::Result<()> {
        self.record(SinkEvent::Denied(*reason))
    }

    async fn started(&self, total: usize) -> anyhow::Result<()> {
        self.record(SinkEvent::Started(total))
    }

    async fn progress(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        if let Some(trigger) = self.stop_after_progress.lock().unwrap().take() {
            trigger.trigger();
        }
        self.record(SinkEvent::Progress(*snapshot))
    }

    async fn finished(&self, summary: &FinalSummary) -> anyhow::Result<()> {
        self.record(SinkEvent::Finished(summary.clone()))
    }

    async fn failed(&self, error: &anyhow::Error) -> anyhow::Result<()> {
        self.record(SinkEvent::Failed(format!("{:#}", error)))
    }
}
