use eyre::Result;
use tokio::{select, signal::ctrl_c};

use crate::{
    display::{animation::AnimationProfile, countdown::Countdown},
    misc::ColourDot,
    sync::{Controller, StatusSync, state::ApplianceState},
};

use super::common::Context;

pub async fn print(context: Context) -> Result<()> {
    let report = context.fan.status().await?;
    let state = ApplianceState::from(&report);

    println!("{} {}", ColourDot(state.is_on), context.fan);
    println!("  Power  {}", if state.is_on { "on" } else { "off" });
    println!("  Speed  {}", state.speed);

    if let countdown @ Countdown::Visible(_) = Countdown::from_remaining(state.timer_remaining) {
        println!("  {countdown}");
    }

    Ok(())
}

pub async fn watch(context: Context) -> Result<()> {
    let mut controller = Controller::new(context.fan.clone(), AnimationProfile::default());
    let (sync, mut outcomes) = StatusSync::spawn(context.fan.clone());

    tracing::info!("Watching {}, press ctrl-c to stop", context.fan);

    let mut last: Option<ApplianceState> = None;

    loop {
        select! {
            Some(outcome) = outcomes.recv() => {
                if controller.reconcile(outcome) && last.as_ref() != Some(controller.state()) {
                    tracing::info!("Fan is {}", controller.state());
                    last = Some(*controller.state());
                }
            }

            _ = ctrl_c() => break,
        }
    }

    sync.stop();
    tracing::debug!("Poll task stopped");

    Ok(())
}
