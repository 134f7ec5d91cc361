use std::time::Duration;

use crate::hardware::fan::defs::SpeedLevel;

use super::animation::{Animation, deceleration_target};

/// Blade angle of the drawn fan, advanced once per rendered frame.
#[derive(Clone, Debug, Default)]
pub struct Rotor {
    angle: f32,
    motion: Motion,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Motion {
    #[default]
    Idle,
    Spinning {
        cycle: Duration,
    },
    Gliding {
        from: f32,
        to: f32,
        elapsed: Duration,
    },
}

impl Rotor {
    pub const GLIDE_DURATION: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_moving(&self) -> bool {
        self.motion != Motion::Idle
    }

    /// Follows a new animation state. When `decelerate` is set, stopping a
    /// spinning rotor glides it to a resting angle instead of freezing it.
    pub fn apply(&mut self, animation: &Animation, level: SpeedLevel, decelerate: bool) {
        self.motion = match (&self.motion, animation.running) {
            (_, true) => Motion::Spinning {
                cycle: animation.cycle,
            },

            (Motion::Spinning { .. }, false) if decelerate => Motion::Gliding {
                from: self.angle,
                to: deceleration_target(self.angle, level),
                elapsed: Duration::ZERO,
            },

            (Motion::Gliding { .. }, false) => return,

            (_, false) => Motion::Idle,
        };
    }

    pub fn advance(&mut self, delta: Duration) {
        match &mut self.motion {
            Motion::Idle => {}

            Motion::Spinning { cycle } => {
                let turns = delta.as_secs_f32() / cycle.as_secs_f32().max(f32::EPSILON);
                self.angle = (self.angle + 360. * turns).rem_euclid(360.);
            }

            Motion::Gliding { from, to, elapsed } => {
                *elapsed += delta;

                if *elapsed >= Self::GLIDE_DURATION {
                    // Blades are symmetric, the snap is invisible
                    self.angle = 0.;
                    self.motion = Motion::Idle;
                } else {
                    let t = elapsed.as_secs_f32() / Self::GLIDE_DURATION.as_secs_f32();
                    let eased = 1. - (1. - t).powi(3);
                    self.angle = *from + (*to - *from) * eased;
                }
            }
        }
    }
}
