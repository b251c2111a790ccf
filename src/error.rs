use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load program image: {0}")]
    LoadError(#[from] LoadError),

    #[error("CPU execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to program image loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read program file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Malformed word '{token}' at line {line}")]
    MalformedWord { line: usize, token: String },

    #[error("Program of {words} words does not fit memory of {memory_bytes:#x} bytes at base {base:#010x}")]
    ImageTooLarge { words: usize, base: u32, memory_bytes: usize },

    #[error("Program image of {0} bytes is not a whole number of words")]
    RaggedImage(usize),
}

/// Errors related to CPU execution
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Safety cap reached: {0} cycles")]
    SafetyCapReached(u64),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
