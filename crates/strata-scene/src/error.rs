//! Error types for scene graph operations

use crate::node::NodeId;
use thiserror::Error;

/// Scene graph error type
#[derive(Error, Debug)]
pub enum SceneError {
    /// Structural misuse of the tree API (removing a non-child, cycles, ...)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The node was destroyed or never belonged to this scene
    #[error("Node {0} has been destroyed")]
    NodeDestroyed(NodeId),

    /// Error reported by the layout engine
    #[error("Layout error: {0}")]
    Layout(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

impl From<taffy::TaffyError> for SceneError {
    fn from(err: taffy::TaffyError) -> Self {
        Self::Layout(err.to_string())
    }
}
