use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RackError {
    #[error("device enumeration failed: {0}")]
    Enumeration(String),
    #[error("stepper module {0} not found")]
    NotFound(String),
    #[error("failed to open device {0}: {1}")]
    Open(String, String),
    #[error("driver error: {0}")]
    Driver(String),
    #[error("driver fault: {0}")]
    Fault(String),
    #[error("timed out waiting for completion message")]
    WaitTimeout,
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed driver-boundary error to a typed `RackError`, with precise
/// handling when the simulator's typed errors are available.
pub fn map_driver_error_dyn(e: &(dyn std::error::Error + 'static)) -> RackError {
    #[cfg(feature = "driver-errors")]
    if let Some(de) = e.downcast_ref::<rack_driver::error::DriverError>() {
        use rack_driver::error::DriverError;
        return match de {
            DriverError::Timeout => RackError::WaitTimeout,
            other => RackError::Fault(other.to_string()),
        };
    }
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        RackError::WaitTimeout
    } else {
        RackError::Driver(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_timeout_falls_back_to_wait_timeout() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(map_driver_error_dyn(&e), RackError::WaitTimeout));
    }

    #[test]
    fn other_errors_map_to_driver() {
        let e = std::io::Error::other("usb gone");
        match map_driver_error_dyn(&e) {
            RackError::Driver(s) => assert!(s.contains("usb gone")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[cfg(feature = "driver-errors")]
    #[test]
    fn typed_driver_timeout_maps_precisely() {
        let e = rack_driver::error::DriverError::Timeout;
        assert!(matches!(map_driver_error_dyn(&e), RackError::WaitTimeout));
        let e = rack_driver::error::DriverError::NotOpen;
        assert!(matches!(map_driver_error_dyn(&e), RackError::Fault(_)));
    }
}
