//! Conditions that abort the deployment before anything is submitted.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Could not load agent definition. Error: {0}")]
    InvalidAgent(#[from] drive_agent_tools::agent::AgentDefinitionError),

    #[error("{} not found.", .0.display())]
    RequirementsNotFound(PathBuf),
}
