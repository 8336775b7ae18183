use std::io;

use thiserror::Error;

/// Errors a [`crate::link::SerialLink`] operation may produce.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The named port could not be acquired.
    #[error("Could not open `{port}`: {detail}")]
    OpenFailed {
        /// The port we tried to open.
        port: String,

        /// What the serial layer had to say about it.
        detail: String,
    },

    /// The operation requires an open link.
    #[error("The link is not open")]
    NotOpen,

    /// The underlying transport failed mid-operation.
    #[error("Underlying IO problem: {0}")]
    Io(#[from] io::Error),
}

/// Errors from [`crate::session::SessionController::send`].
#[derive(Debug, Error)]
pub enum SendError {
    /// There is no open link to send through.
    #[error("Not connected to any port")]
    NotConnected,

    /// The credentials are incomplete.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// The link accepted the command but the write failed.
    #[error("Write failed: {0}")]
    Transport(#[from] LinkError),
}
