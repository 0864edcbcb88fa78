//! Error types for the animation engine

use thiserror::Error;

/// Rejected tween registrations.
///
/// A failed `start` registers nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// Duration is zero and the scheduler rejects zero-length tweens
    #[error("tween on `{property}` has a zero duration")]
    ZeroDuration { property: &'static str },

    /// Begin or end value is NaN or infinite
    #[error("tween on `{property}` has a non-finite value {value}")]
    NonFiniteValue { property: &'static str, value: f32 },

    /// The target key does not resolve in the target store
    #[error("tween on `{property}` refers to a target that does not exist")]
    MissingTarget { property: &'static str },
}

/// A change or completion hook that did not succeed.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("hook failed: {0:#}")]
    Failed(anyhow::Error),

    #[error("hook panicked: {0}")]
    Panicked(String),
}

impl HookError {
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HookError::Panicked(message)
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for tween registration
pub type Result<T> = std::result::Result<T, TweenError>;
