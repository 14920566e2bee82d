//! Prepare the Keycloak realm for Gerrit.
//!
//! Waits for Keycloak to come up, registers (or updates) the Gerrit OAuth client, replaces the
//! Gerrit admin user and dumps the client, including its secret, into a file.

pub mod config;
pub mod merge;
pub mod retry;
pub mod stages;
pub mod workflow;

pub use config::{Config, SetupConfig};
pub use workflow::{report, run, Stage, Summary, WorkflowError};
