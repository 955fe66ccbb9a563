//! Error types for Pathlight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathlightError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Capacity exceeded: scene already holds the maximum of {max} {kind}s")]
    CapacityExceeded { kind: &'static str, max: usize },

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Task queue error: {0}")]
    TaskQueue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PathlightError>;
