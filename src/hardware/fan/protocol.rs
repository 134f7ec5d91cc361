use std::{fmt, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use super::defs::{SpeedLevel, TimerDuration};

/* === Definitions === */

#[derive(Clone)]
pub struct Link {
    base_url: String,
    client: reqwest::Client,
}

/// A state-changing request. The appliance's reply is never inspected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    On { level: Option<SpeedLevel> },
    Off,
    TimerOff(TimerDuration),
    CancelTimer,
}

/// Raw `/api/status` payload.
#[derive(Debug, Deserialize)]
pub struct StatusReport {
    pub status: serde_json::Number,
    #[serde(default)]
    pub timer_left: Option<serde_json::Value>,
    #[serde(default)]
    pub last_fan_level: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Status request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Appliance replied with HTTP {0}")]
    Http(u16),

    #[error("Malformed status payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/* === Implementations === */

impl Link {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    const STATUS_PATH: &str = "/api/status";

    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_status(&self) -> Result<StatusReport, PollError> {
        let url = format!("{}{}", self.base_url, Self::STATUS_PATH);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(PollError::Http(response.status().as_u16()));
        }

        let text = response.text().await?;

        Ok(StatusReport::parse(&text)?)
    }

    pub async fn send(&self, instruction: Instruction) -> Result<(), reqwest::Error> {
        let url = instruction.url(&self.base_url);
        tracing::trace!("GET {url}");

        self.client.get(url).send().await?;

        Ok(())
    }
}

impl Instruction {
    pub fn path(&self) -> &'static str {
        match self {
            Instruction::On { .. } => "/api/on",
            Instruction::Off => "/api/off",
            Instruction::TimerOff(_) => "/api/timer_off",
            Instruction::CancelTimer => "/api/cancel_timer",
        }
    }

    pub fn query(&self) -> Option<String> {
        match self {
            Instruction::On { level: Some(level) } => Some(format!("level={level}")),
            Instruction::TimerOff(timer) => Some(format!("seconds={}", timer.as_secs())),
            _ => None,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        match self.query() {
            Some(query) => format!("{base_url}{}?{query}", self.path()),
            None => format!("{base_url}{}", self.path()),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::On { level: Some(level) } => write!(f, "on (level {level})"),
            Instruction::On { level: None } => write!(f, "on"),
            Instruction::Off => write!(f, "off"),
            Instruction::TimerOff(timer) => write!(f, "timer off in {timer}"),
            Instruction::CancelTimer => write!(f, "cancel timer"),
        }
    }
}

impl StatusReport {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_on(&self) -> bool {
        self.status.as_f64() == Some(1.)
    }

    /// Remaining whole seconds, only when the appliance reports a positive
    /// number. Less than a second left still yields `Some(0)`.
    pub fn timer_remaining(&self) -> Option<u64> {
        let seconds = self.timer_left.as_ref()?.as_f64()?;
        (seconds > 0.).then_some(seconds as u64)
    }

    pub fn speed(&self) -> SpeedLevel {
        let raw = self.last_fan_level.as_ref().and_then(|v| v.as_i64());
        SpeedLevel::or_default(raw)
    }
}
