//! Google Drive listing tool for the Drive agent.
//!
//! This crate is used by:
//! - the hosted agent runtime (tool registration + invocation)
//! - `drive-agent-deploy` (agent definition packaged for managed deployment)
//!
//! It contains **no** deployment logic and **no** token issuance; the bearer token is always
//! supplied by the surrounding platform.

pub mod agent;
pub mod config;
pub mod context;
pub mod credentials;
pub mod descriptor;
pub mod runtime;
pub mod safety;
