use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;

use crate::{
    LogTarget,
    display::animation::AnimationProfile,
    hardware::fan::defs::{SpeedLevel, TimerDuration},
};

use self::common::Context;

mod command;
mod common;
mod config;
mod panel;
mod status;

#[derive(Parser)]
#[command(version, about)]
pub struct CliOpts {
    /// YAML configuration file
    #[arg(short, long, default_value = "fanpanel.yaml", global = true)]
    config: PathBuf,

    /// Appliance base URL, overrides the configuration
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive control panel
    Panel {
        #[arg(long, default_value = "fanpanel.log")]
        log_file: PathBuf,

        #[arg(short, long)]
        animation: Option<AnimationProfile>,
    },

    /// Print the current appliance state
    Status,

    /// Poll the appliance and log every change
    Watch,

    /// Switch the fan on, optionally at a given level
    On {
        #[arg(short, long)]
        level: Option<SpeedLevel>,
    },

    /// Switch the fan off
    Off,

    /// Flip the power state
    Toggle,

    /// Switch the fan on at a given level (1-3)
    Speed { level: SpeedLevel },

    /// Switch the fan off after a delay (HH:MM)
    Timer { duration: TimerDuration },

    /// Cancel a scheduled power-off
    CancelTimer,

    /// Print the effective configuration
    Config,
}

impl CliOpts {
    pub fn log_target(&self) -> LogTarget {
        match &self.command {
            Command::Panel { log_file, .. } => LogTarget::File(log_file.clone()),
            _ => LogTarget::Stderr,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Command::Panel { .. })
    }
}

#[tokio::main(flavor = "current_thread")]
pub async fn cli(opts: CliOpts) -> Result<()> {
    let context = Context::load(&opts.config, opts.url).await?;

    match opts.command {
        Command::Panel { animation, .. } => panel::launch(context, animation).await,
        Command::Status => status::print(context).await,
        Command::Watch => status::watch(context).await,
        Command::On { level } => command::on(context, level).await,
        Command::Off => command::off(context).await,
        Command::Toggle => command::toggle(context).await,
        Command::Speed { level } => command::on(context, Some(level)).await,
        Command::Timer { duration } => command::timer(context, duration).await,
        Command::CancelTimer => command::cancel_timer(context).await,
        Command::Config => config::print(&context),
    }
}
