use std::{
    io::{self, Write},
    time::Duration,
};

use crate::{hardware::fan::defs::SpeedLevel, sync::state::ApplianceState};

use self::{
    animation::{Animation, AnimationProfile, animate},
    countdown::Countdown,
};

pub mod animation;
pub mod countdown;
pub mod picker;
pub mod rotor;

/// What the panel shows. Each part is refreshed by its own updater so that
/// optimistic commands only touch what they change.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelView {
    profile: AnimationProfile,
    animation: Animation,
    countdown: Countdown,
    selected: SpeedLevel,
}

/// Best-effort haptic hint fired on power toggles.
pub trait Feedback: Send {
    fn pulse(&self, duration: Duration);
}

/// Feedback for environments with nothing to vibrate.
pub struct NoFeedback;

/// Rings the terminal bell.
pub struct Bell;

impl PanelView {
    pub fn new(profile: AnimationProfile, state: &ApplianceState) -> Self {
        Self {
            profile,
            animation: animate(profile, state.is_on, state.speed),
            countdown: Countdown::from_remaining(state.timer_remaining),
            selected: state.speed,
        }
    }

    pub fn refresh(&mut self, state: &ApplianceState) {
        self.update_animation(state);
        self.update_countdown(state);
        self.update_selector(state);
    }

    pub fn update_animation(&mut self, state: &ApplianceState) {
        self.animation = animate(self.profile, state.is_on, state.speed);
    }

    pub fn update_countdown(&mut self, state: &ApplianceState) {
        self.countdown = Countdown::from_remaining(state.timer_remaining);
    }

    pub fn update_selector(&mut self, state: &ApplianceState) {
        self.selected = state.speed;
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn selected(&self) -> SpeedLevel {
        self.selected
    }
}

impl Feedback for NoFeedback {
    fn pulse(&self, _duration: Duration) {}
}

impl Feedback for Bell {
    fn pulse(&self, _duration: Duration) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
    }
}
