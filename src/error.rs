use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    /// User supplied data failed a presence or number check.
    #[error("{0}")]
    InvalidInput(String),
    #[error("persisted slot `{slot}` could not be parsed")]
    PersistedStateCorrupt {
        slot: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage error")]
    Storage(#[from] io::Error),
    #[error("could not encode slot contents")]
    Encode(#[source] serde_json::Error),
}

impl DashError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        DashError::InvalidInput(message.into())
    }
}
