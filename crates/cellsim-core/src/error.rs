//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Location ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: i32,
        col: i32,
        rows: i32,
        cols: i32,
    },

    #[error("Invalid instruction argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),

    #[error("Unknown simulation type: {0}")]
    UnknownSimulation(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
