pub mod engine;
pub mod plan;
pub mod runner;
pub mod step_sequence;

pub use crate::domain::model::{CommandOutput, CommandSpec, DeployTarget, StepResult, StepStatus};
pub use crate::domain::ports::CommandRunner;
pub use crate::utils::error::Result;
