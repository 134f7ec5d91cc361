use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::sleep,
};

use crate::hardware::{
    ControlSurface,
    fan::protocol::{PollError, StatusReport},
};

pub type PollOutcome = Result<StatusReport, PollError>;

/// Background task fetching the appliance status forever, sleeping a fixed
/// interval after every attempt. Outcomes are handed to the owner of the
/// mirror through a channel.
pub struct StatusSync {
    task: JoinHandle<()>,
}

impl StatusSync {
    pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn spawn<S: ControlSurface>(surface: Arc<S>) -> (Self, mpsc::Receiver<PollOutcome>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(Self::poll_task(surface, tx));

        (Self { task }, rx)
    }

    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    async fn poll_task<S: ControlSurface>(surface: Arc<S>, outcomes: mpsc::Sender<PollOutcome>) {
        loop {
            let outcome = surface.fetch_status().await;

            if outcomes.send(outcome).await.is_err() {
                tracing::debug!("Status receiver dropped, stopping poll task");
                break;
            }

            sleep(Self::POLL_INTERVAL).await;
        }
    }
}

impl Drop for StatusSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::time::{advance, timeout};

    use crate::hardware::fan::protocol::Instruction;

    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ControlSurface for CountingSurface {
        async fn fetch_status(&self) -> PollOutcome {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);

            match n % 2 {
                0 => Ok(StatusReport::parse(r#"{"status":1}"#)?),
                _ => Err(PollError::Http(503)),
            }
        }

        async fn send(&self, _instruction: Instruction) -> Result<(), reqwest::Error> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_interval() {
        let surface = Arc::new(CountingSurface::default());
        let (sync, mut outcomes) = StatusSync::spawn(surface.clone());

        // First attempt is immediate
        assert!(outcomes.recv().await.unwrap().is_ok());

        // Failures do not break the loop
        advance(StatusSync::POLL_INTERVAL).await;
        assert!(outcomes.recv().await.unwrap().is_err());

        advance(StatusSync::POLL_INTERVAL).await;
        assert!(outcomes.recv().await.unwrap().is_ok());

        assert_eq!(surface.fetches.load(Ordering::SeqCst), 3);
        assert!(sync.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_attempts() {
        let surface = Arc::new(CountingSurface::default());
        let (_sync, mut outcomes) = StatusSync::spawn(surface);

        outcomes.recv().await.unwrap().unwrap();

        let early = timeout(StatusSync::POLL_INTERVAL / 2, outcomes.recv()).await;
        assert!(early.is_err());

        let next = timeout(StatusSync::POLL_INTERVAL, outcomes.recv()).await;
        assert!(next.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop() {
        let surface = Arc::new(CountingSurface::default());
        let (sync, mut outcomes) = StatusSync::spawn(surface.clone());

        outcomes.recv().await.unwrap().unwrap();
        sync.stop();

        advance(StatusSync::POLL_INTERVAL * 5).await;

        assert!(outcomes.recv().await.is_none());
        assert_eq!(surface.fetches.load(Ordering::SeqCst), 1);
    }
}
