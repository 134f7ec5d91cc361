use std::fmt;

use async_trait::async_trait;
use eyre::{Context, Result};

use crate::config::ApplianceConfig;

use self::protocol::{Instruction, Link, PollError, StatusReport};

use super::ControlSurface;

pub mod defs;
pub mod protocol;

pub struct Fan {
    link: Link,
}

impl Fan {
    pub const NAME: &str = "fan";

    pub fn from_config(config: &ApplianceConfig) -> Result<Self> {
        Self::connect(&config.url)
    }

    pub fn connect(url: &str) -> Result<Self> {
        let link = Link::new(url).wrap_err("Failed to build HTTP client")?;
        tracing::debug!("Using appliance at {}", link.base_url());

        Ok(Self { link })
    }

    /* == Public API == */

    /// Sends an instruction and waits for the request to complete.
    pub async fn command(&self, instruction: Instruction) -> Result<()> {
        self.link
            .send(instruction)
            .await
            .wrap_err_with(|| format!("Failed to send \"{instruction}\""))
    }

    pub async fn status(&self) -> Result<StatusReport> {
        self.link
            .fetch_status()
            .await
            .wrap_err("Failed to fetch appliance status")
    }
}

impl fmt::Display for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", Self::NAME, self.link.base_url())
    }
}

#[async_trait]
impl ControlSurface for Fan {
    async fn fetch_status(&self) -> Result<StatusReport, PollError> {
        self.link.fetch_status().await
    }

    async fn send(&self, instruction: Instruction) -> Result<(), reqwest::Error> {
        self.link.send(instruction).await
    }
}
