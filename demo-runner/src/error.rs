use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Runtime not found: {0}")]
    RuntimeNotFound(String),

    #[error("Failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Sandbox error: {0}")]
    Sandbox(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error means the interpreter binary is missing on the host.
    pub fn is_runtime_missing(&self) -> bool {
        match self {
            Error::RuntimeNotFound(_) => true,
            Error::Spawn(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
