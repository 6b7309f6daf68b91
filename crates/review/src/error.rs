//! Review pipeline errors.

use engine_session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    /// The supplied game is malformed; nothing was scheduled.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A session command failed.
    #[error("engine session error: {0}")]
    Session(#[from] SessionError),
    /// The session died mid-run.
    #[error("engine session terminated: {0}")]
    SessionLost(String),
}
