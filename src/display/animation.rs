use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::hardware::fan::defs::SpeedLevel;

/// How the blade rotation speed follows the selected level.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Display, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnimationProfile {
    /// Plain pause/resume, same cycle at every level.
    Fixed,
    /// Cycle shrinks by half a second per level, from 1.5 s.
    #[default]
    Linear,
    /// Cycle looked up per level: 2 s, 1 s, 0.5 s.
    Table,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Animation {
    pub running: bool,
    pub cycle: Duration,
    pub greyscale: bool,
}

impl AnimationProfile {
    const FIXED_CYCLE: Duration = Duration::from_secs(1);

    pub fn cycle(self, level: SpeedLevel) -> Duration {
        match self {
            Self::Fixed => Self::FIXED_CYCLE,

            Self::Linear => {
                let seconds = 1.5 - (level.value() - 1) as f32 * 0.5;
                Duration::from_secs_f32(seconds)
            }

            Self::Table => match level {
                SpeedLevel::Low => Duration::from_secs(2),
                SpeedLevel::Medium => Duration::from_secs(1),
                SpeedLevel::High => Duration::from_millis(500),
            },
        }
    }
}

/// Visual state of the fan for a given power flag and level.
pub fn animate(profile: AnimationProfile, is_on: bool, level: SpeedLevel) -> Animation {
    Animation {
        running: is_on,
        cycle: profile.cycle(level),
        greyscale: !is_on,
    }
}

/// Angle the blades come to rest at when the fan is switched off.
///
/// The three blades look identical every 120 degrees, so the rotor stops on
/// the next such multiple ahead of `current`, coasting one extra third of a
/// turn per level above the lowest.
pub fn deceleration_target(current: f32, level: SpeedLevel) -> f32 {
    const STEP: f32 = 120.;

    let current = current.rem_euclid(360.);
    let stop = (current / STEP).ceil() * STEP;
    let overshoot = STEP * (level.value() - 1) as f32;

    stop + overshoot
}
