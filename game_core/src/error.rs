use thiserror::Error;

/// Invalid tunables handed to the simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("config value `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("field {width}x{height} is too small to fit a ball and paddles")]
    FieldTooSmall { width: f32, height: f32 },
}

/// Failures inside a controller's own state handling.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to encode controller state: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode controller state: {0}")]
    Decode(#[source] postcard::Error),

    #[error("controller `{kind}` cannot accept these parameters: {reason}")]
    IncompatibleParameters { kind: &'static str, reason: String },
}

/// Errors that can occur while saving or restoring a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Snapshot(#[from] proto::ProtoError),

    #[error("no controller registered for kind `{0}`")]
    UnknownController(String),

    #[error("failed to restore {side} controller: {source}")]
    Controller {
        side: crate::Side,
        #[source]
        source: ControllerError,
    },

    #[error("failed to save controller state: {0}")]
    ControllerSave(#[source] ControllerError),

    #[error("saved settings are invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("saved session is corrupt: {0}")]
    Corrupt(String),
}
