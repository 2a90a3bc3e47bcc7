use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Invalid slot id: {0} (expected 1..=127)")]
    InvalidSlotId(u32),

    #[error("Invalid slot id: {0:?} is not a slot number")]
    MalformedSlotId(String),

    #[error("Invalid admin PIN: {0}")]
    InvalidPin(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Display errors
    #[error("Invalid display line: {line} (max: {max})")]
    InvalidLine { line: usize, max: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
