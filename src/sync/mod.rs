use std::{sync::Arc, time::Duration};

use crate::{
    display::{Feedback, NoFeedback, PanelView, animation::AnimationProfile},
    hardware::{
        ControlSurface,
        fan::{
            defs::{InvalidSpeedLevel, SpeedLevel, TimerDuration},
            protocol::Instruction,
        },
    },
};

use self::{poller::PollOutcome, state::ApplianceState};

pub mod poller;
pub mod state;

pub use poller::StatusSync;

/// Owns the appliance mirror and the panel view derived from it.
///
/// Commands update the mirror optimistically and fire their request without
/// waiting for it. Poll outcomes overwrite the mirror wholesale, whichever
/// arrives last wins.
pub struct Controller<S> {
    surface: Arc<S>,
    state: ApplianceState,
    view: PanelView,
    feedback: Box<dyn Feedback>,
}

impl<S: ControlSurface> Controller<S> {
    const HAPTIC_PULSE: Duration = Duration::from_millis(200);

    pub fn new(surface: Arc<S>, profile: AnimationProfile) -> Self {
        let state = ApplianceState::default();

        Self {
            surface,
            view: PanelView::new(profile, &state),
            state,
            feedback: Box::new(NoFeedback),
        }
    }

    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn state(&self) -> &ApplianceState {
        &self.state
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    /* == Status == */

    pub async fn poll_once(&mut self) -> bool {
        let outcome = self.surface.fetch_status().await;
        self.reconcile(outcome)
    }

    /// Applies a poll outcome. Failures are logged and leave both the mirror
    /// and the view untouched.
    pub fn reconcile(&mut self, outcome: PollOutcome) -> bool {
        match outcome {
            Ok(report) => {
                self.state = ApplianceState::from(&report);
                self.view.refresh(&self.state);
                true
            }

            Err(error) => {
                tracing::error!("Error fetching status: {error}");
                false
            }
        }
    }

    /* == Commands == */

    pub fn toggle_power(&mut self) {
        self.state.is_on = !self.state.is_on;
        self.feedback.pulse(Self::HAPTIC_PULSE);

        let instruction = match self.state.is_on {
            true => Instruction::On { level: None },
            false => Instruction::Off,
        };

        self.dispatch(instruction);
        self.view.update_animation(&self.state);
    }

    pub fn select_speed(&mut self, level: SpeedLevel) {
        self.state.is_on = true;
        self.state.speed = level;

        self.dispatch(Instruction::On { level: Some(level) });

        self.view.update_animation(&self.state);
        self.view.update_selector(&self.state);
    }

    /// Selects a speed from a raw selector value.
    pub fn select_level(&mut self, level: u8) -> Result<(), InvalidSpeedLevel> {
        self.select_speed(SpeedLevel::try_from(level)?);
        Ok(())
    }

    /// The countdown is left alone, the next poll reports it.
    pub fn set_timer(&mut self, duration: TimerDuration) {
        self.dispatch(Instruction::TimerOff(duration));
    }

    pub fn cancel_timer(&mut self) {
        self.dispatch(Instruction::CancelTimer);
    }

    fn dispatch(&self, instruction: Instruction) {
        let surface = self.surface.clone();

        tokio::spawn(async move {
            let _ = surface.send(instruction).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::{
        display::countdown::Countdown,
        hardware::fan::protocol::{PollError, StatusReport},
    };

    use super::*;

    /// Replies to polls from a script and forwards every command.
    struct ScriptedSurface {
        replies: Mutex<VecDeque<Option<&'static str>>>,
        sent: mpsc::UnboundedSender<Instruction>,
    }

    #[async_trait]
    impl ControlSurface for ScriptedSurface {
        async fn fetch_status(&self) -> PollOutcome {
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(body) => Ok(StatusReport::parse(body)?),
                None => Err(PollError::Http(504)),
            }
        }

        async fn send(&self, instruction: Instruction) -> Result<(), reqwest::Error> {
            let _ = self.sent.send(instruction);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingFeedback(Arc<AtomicUsize>);

    impl Feedback for CountingFeedback {
        fn pulse(&self, _duration: Duration) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Shared sink for a test-scoped `tracing` subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn controller(
        replies: &[Option<&'static str>],
    ) -> (
        Controller<ScriptedSurface>,
        mpsc::UnboundedReceiver<Instruction>,
    ) {
        let (sent, rx) = mpsc::unbounded_channel();

        let surface = ScriptedSurface {
            replies: Mutex::new(replies.iter().copied().collect()),
            sent,
        };

        let controller = Controller::new(Arc::new(surface), AnimationProfile::Linear);
        (controller, rx)
    }

    #[tokio::test]
    async fn test_countdown_from_poll() {
        let (mut c, _) = controller(&[Some(r#"{"status":1,"timer_left":125}"#)]);

        assert!(c.poll_once().await);

        assert_eq!(c.view().countdown().text(), Some("00:02:05"));
        assert!(c.view().countdown().is_visible());
        assert!(c.view().animation().running);
    }

    #[tokio::test]
    async fn test_countdown_hidden() {
        let (mut c, _) = controller(&[
            Some(r#"{"status":1,"timer_left":60}"#),
            Some(r#"{"status":1,"timer_left":0}"#),
            Some(r#"{"status":0,"timer_left":-1}"#),
            Some(r#"{"status":1}"#),
        ]);

        assert!(c.poll_once().await);
        assert!(c.view().countdown().is_visible());

        for _ in 0..3 {
            assert!(c.poll_once().await);
            assert_eq!(c.view().countdown(), &Countdown::Hidden);
        }
    }

    #[tokio::test]
    async fn test_missing_level_resolves_to_low() {
        let (mut c, _) = controller(&[
            Some(r#"{"status":1,"last_fan_level":3}"#),
            Some(r#"{"status":1}"#),
        ]);

        c.poll_once().await;
        assert_eq!(c.state().speed, SpeedLevel::High);
        assert_eq!(c.view().selected(), SpeedLevel::High);

        c.poll_once().await;
        assert_eq!(c.state().speed, SpeedLevel::Low);
        assert_eq!(c.view().selected(), SpeedLevel::Low);
    }

    #[tokio::test]
    async fn test_initial_poll_off() {
        let (mut c, _) = controller(&[Some(r#"{"status":0}"#)]);

        c.poll_once().await;

        let animation = c.view().animation();
        assert!(!animation.running);
        assert!(animation.greyscale);
        assert!(!c.view().countdown().is_visible());
    }

    #[tokio::test]
    async fn test_select_speed_idempotent() {
        let (mut c, mut sent) = controller(&[]);

        c.select_speed(SpeedLevel::Medium);
        let once = *c.state();
        let view = c.view().clone();

        c.select_speed(SpeedLevel::Medium);

        assert_eq!(*c.state(), once);
        assert_eq!(c.view(), &view);
        assert!(c.state().is_on);
        assert_eq!(c.state().speed, SpeedLevel::Medium);
        assert_eq!(c.view().selected(), SpeedLevel::Medium);

        for _ in 0..2 {
            assert_eq!(
                sent.recv().await,
                Some(Instruction::On {
                    level: Some(SpeedLevel::Medium)
                })
            );
        }
    }

    #[tokio::test]
    async fn test_select_level_validation() {
        let (mut c, _) = controller(&[]);

        assert_eq!(c.select_level(4), Err(InvalidSpeedLevel(4)));
        assert_eq!(*c.state(), ApplianceState::default());

        assert_eq!(c.select_level(3), Ok(()));
        assert_eq!(c.state().speed, SpeedLevel::High);
    }

    #[tokio::test]
    async fn test_toggle_power_optimistic() {
        let (c, mut sent) = controller(&[]);
        let feedback = CountingFeedback::default();
        let mut c = c.with_feedback(feedback.clone());

        c.toggle_power();

        // Applied before anything was sent
        assert!(c.state().is_on);
        assert!(c.view().animation().running);
        assert!(!c.view().animation().greyscale);
        assert_eq!(feedback.0.load(Ordering::SeqCst), 1);

        assert_eq!(sent.recv().await, Some(Instruction::On { level: None }));

        c.toggle_power();
        assert!(!c.state().is_on);
        assert_eq!(sent.recv().await, Some(Instruction::Off));
    }

    #[tokio::test]
    async fn test_set_timer_leaves_countdown() {
        let (mut c, mut sent) = controller(&[]);
        let before = c.view().clone();

        let timer = TimerDuration::new(0, 30).unwrap();
        c.set_timer(timer);

        let instruction = sent.recv().await.unwrap();
        assert_eq!(instruction, Instruction::TimerOff(timer));
        assert_eq!(instruction.query().as_deref(), Some("seconds=1800"));
        assert_eq!(c.view(), &before);

        c.cancel_timer();
        assert_eq!(sent.recv().await, Some(Instruction::CancelTimer));
        assert_eq!(c.view(), &before);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_state() {
        let (mut c, _) = controller(&[
            Some(r#"{"status":1,"timer_left":90,"last_fan_level":2}"#),
            Some(r#"{"timer_left":5}"#),
            None,
        ]);

        assert!(c.poll_once().await);
        let state = *c.state();
        let view = c.view().clone();

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // Missing status, then a transport-level failure
        assert!(!c.poll_once().await);
        assert!(!c.poll_once().await);

        assert_eq!(*c.state(), state);
        assert_eq!(c.view(), &view);

        let logs = logs.contents();
        assert_eq!(logs.matches("Error fetching status").count(), 2);
        assert!(logs.contains("Malformed status payload"));
        assert!(logs.contains("HTTP 504"));
    }

    #[tokio::test]
    async fn test_poll_overwrites_optimistic_update() {
        let (mut c, _) = controller(&[Some(r#"{"status":0}"#)]);

        c.select_speed(SpeedLevel::High);
        assert!(c.state().is_on);

        // A poll that was already in flight still wins
        c.poll_once().await;

        assert_eq!(*c.state(), ApplianceState::default());
        assert_eq!(c.view().selected(), SpeedLevel::Low);
    }
}
