use std::fmt;

use crate::{
    display::countdown::format_hms,
    hardware::fan::{defs::SpeedLevel, protocol::StatusReport},
};

/// Local mirror of the appliance, replaced wholesale on every good poll.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplianceState {
    pub is_on: bool,
    pub speed: SpeedLevel,
    pub timer_remaining: Option<u64>,
}

impl From<&StatusReport> for ApplianceState {
    fn from(report: &StatusReport) -> Self {
        Self {
            is_on: report.is_on(),
            speed: report.speed(),
            timer_remaining: report.timer_remaining(),
        }
    }
}

impl fmt::Display for ApplianceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = if self.is_on { "on" } else { "off" };
        write!(f, "{power}, level {}", self.speed)?;

        if let Some(seconds) = self.timer_remaining {
            write!(f, ", off in {}", format_hms(seconds))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(json: &str) -> ApplianceState {
        ApplianceState::from(&StatusReport::parse(json).unwrap())
    }

    #[test]
    fn test_defaults() {
        let state = ApplianceState::default();

        assert!(!state.is_on);
        assert_eq!(state.speed, SpeedLevel::Low);
        assert_eq!(state.timer_remaining, None);
    }

    #[test]
    fn test_from_report() {
        assert_eq!(
            state(r#"{"status":1,"timer_left":125,"last_fan_level":2}"#),
            ApplianceState {
                is_on: true,
                speed: SpeedLevel::Medium,
                timer_remaining: Some(125),
            }
        );

        assert_eq!(state(r#"{"status":0}"#), ApplianceState::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            state(r#"{"status":1,"timer_left":61,"last_fan_level":3}"#).to_string(),
            "on, level 3, off in 00:01:01"
        );
        assert_eq!(ApplianceState::default().to_string(), "off, level 1");
    }
}
