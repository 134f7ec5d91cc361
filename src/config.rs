use std::{fmt, io, path::Path};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{display::animation::AnimationProfile, hardware::fan::defs::TimerDuration};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub appliance: ApplianceConfig,
    pub display: DisplayConfig,
    pub timer: TimerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplianceConfig {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub animation: AnimationProfile,
    pub decelerate: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Initial value of the timer picker.
    pub default: TimerDuration,
}

impl Config {
    /// Loads the YAML configuration. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e).wrap_err("Failed to read config"),
        };

        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(data).wrap_err("Failed to parse config")
    }
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.4.1:8080".to_owned(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            animation: AnimationProfile::default(),
            decelerate: true,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Appliance   {}", self.appliance.url)?;
        writeln!(f, "Animation   {}", self.display.animation)?;
        writeln!(f, "Decelerate  {}", self.display.decelerate)?;
        write!(f, "Timer       {}", self.timer.default)
    }
}
