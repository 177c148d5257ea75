use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("device list has not been built")]
    ListNotBuilt,
    #[error("device list build failed: {0}")]
    ListBuild(String),
    #[error("unknown serial number {0}")]
    UnknownSerial(String),
    #[error("device is not open")]
    NotOpen,
    #[error("wait for message timed out")]
    Timeout,
    #[error("message queue disconnected")]
    Disconnected,
    #[error("channel state lock poisoned")]
    Poisoned,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
