use async_trait::async_trait;

use self::fan::protocol::{Instruction, PollError, StatusReport};

pub mod fan;

pub use fan::Fan;

/// Remote control surface of the appliance.
///
/// `Fan` talks HTTP. The controller only depends on this trait so that it can
/// be driven by an in-memory surface in tests.
#[async_trait]
pub trait ControlSurface: Send + Sync + 'static {
    async fn fetch_status(&self) -> Result<StatusReport, PollError>;

    async fn send(&self, instruction: Instruction) -> Result<(), reqwest::Error>;
}
