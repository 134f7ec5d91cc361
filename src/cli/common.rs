use std::{path::Path, sync::Arc};

use eyre::Result;

use crate::{config::Config, hardware::Fan};

/// Configuration and appliance shared by every subcommand.
pub struct Context {
    pub config: Config,
    pub fan: Arc<Fan>,
}

impl Context {
    pub async fn load(path: &Path, url: Option<String>) -> Result<Self> {
        let mut config = Config::load(path).await?;

        if let Some(url) = url {
            config.appliance.url = url;
        }

        let fan = Arc::new(Fan::from_config(&config.appliance)?);

        Ok(Self { config, fan })
    }
}
