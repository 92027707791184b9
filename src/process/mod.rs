// Process module - Worker lifecycle management

mod escalation;
mod spawner;

pub use escalation::{ShutdownEscalator, ShutdownPlan, ShutdownStep};
pub use spawner::{launch, Worker};
