use eyre::Result;

use crate::{
    hardware::fan::{
        defs::{SpeedLevel, TimerDuration},
        protocol::Instruction,
    },
    sync::state::ApplianceState,
};

use super::common::Context;

pub async fn on(context: Context, level: Option<SpeedLevel>) -> Result<()> {
    send(&context, Instruction::On { level }).await
}

pub async fn off(context: Context) -> Result<()> {
    send(&context, Instruction::Off).await
}

pub async fn toggle(context: Context) -> Result<()> {
    let report = context.fan.status().await?;
    let state = ApplianceState::from(&report);

    let instruction = match state.is_on {
        true => Instruction::Off,
        false => Instruction::On { level: None },
    };

    send(&context, instruction).await
}

pub async fn timer(context: Context, duration: TimerDuration) -> Result<()> {
    send(&context, Instruction::TimerOff(duration)).await
}

pub async fn cancel_timer(context: Context) -> Result<()> {
    send(&context, Instruction::CancelTimer).await
}

async fn send(context: &Context, instruction: Instruction) -> Result<()> {
    context.fan.command(instruction).await?;
    tracing::info!("Sent \"{instruction}\" to {}", context.fan);

    Ok(())
}
