use std::{fs::File, io, path::PathBuf, sync::Mutex};

use color_eyre::owo_colors::OwoColorize;
use eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod config;
pub mod display;
pub mod hardware;
pub mod misc;
pub mod sync;

pub use cli::cli;

const DEFAULT_FILTER: &str = "fanpanel=info";

/// Where log output goes. The panel owns the terminal, so it logs to a file.
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

pub fn init(target: LogTarget) -> Result<()> {
    color_eyre::install()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).init(),

        LogTarget::File(path) => {
            let file = File::create(&path)
                .wrap_err_with(|| format!("Failed to create log file {}", path.display()))?;

            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
    }

    Ok(())
}

pub fn banner() {
    eprintln!(
        "{} v{} ({}-{})",
        "fanpanel".bold().bright_cyan(),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_CFG_TARGET_ARCH"),
        env!("CARGO_CFG_TARGET_OS"),
    );
}
