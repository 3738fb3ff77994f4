//! Declarative definition of the Drive agent, as registered with the hosted runtime and
//! packaged by `drive-agent-deploy`.

use crate::descriptor::TOOL_NAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auth configuration id registered with the agent platform. The platform stores the user's
/// token in the turn state under `temp:<AUTH_ID>`.
pub const AUTH_ID: &str = "google-drive-reader-auth";

pub const AGENT_NAME: &str = "GoogleDriveAgent";
pub const AGENT_MODEL: &str = "gemini-2.5-flash";

const INSTRUCTION: &str = "Your goal is to help the user check files in their Google Drive.
Use the `list_drive_files` tool to get a list of files.
Present the list of files returned by the tool as your final answer.";

const DESCRIPTION: &str = "An agent that lists files from a user's Google Drive.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentDefinitionError {
    #[error("agent name must not be empty")]
    EmptyName,
    #[error("agent '{0}' has no model")]
    EmptyModel(String),
    #[error("agent '{0}' registers no tools")]
    NoTools(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub description: String,
    pub tools: Vec<String>,
}

impl AgentDefinition {
    /// The agent shipped by this repository.
    #[must_use]
    pub fn google_drive_agent() -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            model: AGENT_MODEL.to_string(),
            instruction: INSTRUCTION.to_string(),
            description: DESCRIPTION.to_string(),
            tools: vec![TOOL_NAME.to_string()],
        }
    }

    /// # Errors
    ///
    /// Returns an error if the name or model is blank, or no tools are registered.
    pub fn validate(&self) -> Result<(), AgentDefinitionError> {
        if self.name.trim().is_empty() {
            return Err(AgentDefinitionError::EmptyName);
        }
        if self.model.trim().is_empty() {
            return Err(AgentDefinitionError::EmptyModel(self.name.clone()));
        }
        if self.tools.is_empty() {
            return Err(AgentDefinitionError::NoTools(self.name.clone()));
        }
        Ok(())
    }
}
