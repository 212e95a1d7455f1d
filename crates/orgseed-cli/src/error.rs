use orgseed_core::EngineError;
use thiserror::Error;

use crate::org::OrgError;

/// Failures that abort a seeding or splitting run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Org(#[from] OrgError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("project {0} not found")]
    ProjectNotFound(String),
    #[error("project {0} is not linked to an account")]
    ProjectWithoutAccount(String),
    #[error("account {0} not found")]
    AccountNotFound(String),
}
