use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Discrete fan speed, as exposed by the appliance's `level` parameter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum SpeedLevel {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Speed level must be 1, 2 or 3 (got {0})")]
pub struct InvalidSpeedLevel(pub i64);

/// Delay before the appliance switches itself off.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerDuration {
    hours: u8,
    minutes: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTimer {
    #[error("Expected a duration formatted as HH:MM")]
    Format,

    #[error("Hours must be between 0 and 23")]
    Hours,

    #[error("Minutes must be between 0 and 59")]
    Minutes,
}

/* == SpeedLevel == */

impl SpeedLevel {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Lenient conversion used for server-reported levels: anything that is
    /// not exactly 1, 2 or 3 resolves to the lowest level.
    pub fn or_default(raw: Option<i64>) -> Self {
        raw.and_then(|raw| Self::try_from(raw).ok())
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl TryFrom<i64> for SpeedLevel {
    type Error = InvalidSpeedLevel;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(InvalidSpeedLevel(other)),
        }
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = InvalidSpeedLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl FromStr for SpeedLevel {
    type Err = InvalidSpeedLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().map_err(|_| InvalidSpeedLevel(0))?;
        Self::try_from(value)
    }
}

impl fmt::Display for SpeedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/* == TimerDuration == */

impl TimerDuration {
    pub const DEFAULT: Self = Self {
        hours: 0,
        minutes: 30,
    };

    pub fn new(hours: u8, minutes: u8) -> Result<Self, InvalidTimer> {
        if hours > 23 {
            return Err(InvalidTimer::Hours);
        }

        if minutes > 59 {
            return Err(InvalidTimer::Minutes);
        }

        Ok(Self { hours, minutes })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn as_secs(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60
    }

    /// Steps hours, wrapping around the picker's 0..=23 range.
    pub fn add_hours(&mut self, delta: i8) {
        self.hours = (self.hours as i16 + delta as i16).rem_euclid(24) as u8;
    }

    /// Steps minutes, wrapping around the picker's 0..=59 range.
    pub fn add_minutes(&mut self, delta: i8) {
        self.minutes = (self.minutes as i16 + delta as i16).rem_euclid(60) as u8;
    }
}

impl Default for TimerDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for TimerDuration {
    type Err = InvalidTimer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = s.trim().split_once(':').ok_or(InvalidTimer::Format)?;

        let hours = hours.parse::<u8>().map_err(|_| InvalidTimer::Format)?;
        let minutes = minutes.parse::<u8>().map_err(|_| InvalidTimer::Format)?;

        Self::new(hours, minutes)
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl Serialize for TimerDuration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimerDuration {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
