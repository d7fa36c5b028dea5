use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Channel is already open")]
    AlreadyOpen,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Channel is not open")]
    NotOpen,

    #[error("Write failed: {0}")]
    IoFailure(String),
}

/// Errors surfaced from the background read loop. Never returned from a
/// synchronous call; delivered through the error observer registered on
/// the channel.
#[derive(Error, Debug, Clone)]
pub enum ReadLoopError {
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    #[error("Read failed: {0}")]
    Io(String),
}
