//! Progress notifier implementations

use std::sync::Arc;
use tokio::sync::broadcast;

use alongtrack_core::error::Result;
use alongtrack_core::models::{Job, JobId};
use alongtrack_core::ports::ProgressNotifier;

/// Logs every update through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl ProgressNotifier for TracingNotifier {
    fn notify(&self, job_id: JobId, percent: u8, message: &str) -> Result<()> {
        tracing::info!(job_id = %job_id, percent, "{}", message);
        Ok(())
    }

    fn snapshot(&self, job: &Job) -> Result<()> {
        tracing::debug!(job_id = %job.id, state = %job.state, percent = job.percent, "Job snapshot");
        Ok(())
    }
}

/// Event published to live subscribers
#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress {
        job_id: JobId,
        percent: u8,
        message: String,
    },
    Snapshot(Box<Job>),
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Progress { job_id, .. } => *job_id,
            JobEvent::Snapshot(job) => job.id,
        }
    }
}

/// Publishes updates on a broadcast channel.
///
/// Having no subscribers is not an error; lagging subscribers miss events.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<JobEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgressNotifier for BroadcastNotifier {
    fn notify(&self, job_id: JobId, percent: u8, message: &str) -> Result<()> {
        let _ = self.sender.send(JobEvent::Progress {
            job_id,
            percent,
            message: message.to_string(),
        });
        Ok(())
    }

    fn snapshot(&self, job: &Job) -> Result<()> {
        let _ = self.sender.send(JobEvent::Snapshot(Box::new(job.clone())));
        Ok(())
    }
}

/// Forwards every update to each inner notifier.
///
/// An inner failure does not stop delivery to the others; the first error is
/// returned once all have been tried.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn ProgressNotifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Arc<dyn ProgressNotifier>>) -> Self {
        Self { targets }
    }

    fn deliver<F>(&self, f: F) -> Result<()>
    where
        F: Fn(&dyn ProgressNotifier) -> Result<()>,
    {
        let mut first_error = None;
        for target in &self.targets {
            if let Err(e) = f(target.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl ProgressNotifier for FanoutNotifier {
    fn notify(&self, job_id: JobId, percent: u8, message: &str) -> Result<()> {
        self.deliver(|n| n.notify(job_id, percent, message))
    }

    fn snapshot(&self, job: &Job) -> Result<()> {
        self.deliver(|n| n.snapshot(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        let job = Job::new("Alps");

        notifier.notify(job.id, 25, "Querying").unwrap();
        notifier.snapshot(&job).unwrap();

        match rx.recv().await.unwrap() {
            JobEvent::Progress { percent, message, .. } => {
                assert_eq!(percent, 25);
                assert_eq!(message, "Querying");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().job_id(), job.id);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let notifier = BroadcastNotifier::default();
        assert!(notifier.notify(JobId::new(), 5, "Preparing").is_ok());
    }

    #[test]
    fn test_tracing_notifier() {
        let job = Job::new("Alps");
        assert!(TracingNotifier.notify(job.id, 10, "Loading").is_ok());
        assert!(TracingNotifier.snapshot(&job).is_ok());
    }

    struct Failing;

    impl ProgressNotifier for Failing {
        fn notify(&self, _job_id: JobId, _percent: u8, _message: &str) -> Result<()> {
            Err(alongtrack_core::AlongTrackError::Serialization("closed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fanout_delivers_past_failures() {
        let broadcast = BroadcastNotifier::new(8);
        let mut rx = broadcast.subscribe();
        let fanout = FanoutNotifier::new(vec![Arc::new(Failing), Arc::new(broadcast)]);
        let job = Job::new("Alps");

        assert!(fanout.notify(job.id, 40, "Querying").is_err());
        assert_eq!(rx.recv().await.unwrap().job_id(), job.id);
    }
}
