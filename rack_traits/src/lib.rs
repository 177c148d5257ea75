pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Boxed error type used at the driver boundary.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// One connected device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub serial: String,
    pub description: String,
}

/// Raw status/completion tuple delivered by the driver's message queue.
///
/// The wire shape is (WORD type, WORD id, DWORD data); completions the
/// workflow cares about are type 2 with id 0 (homed) or id 1 (move done).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub msg_type: u16,
    pub msg_id: u16,
    pub data: u32,
}

impl RawMessage {
    /// Message type tag for generic motor completions.
    pub const TYPE_MOTOR: u16 = 2;
    /// Message id for "homing finished".
    pub const ID_HOMED: u16 = 0;
    /// Message id for "move finished".
    pub const ID_MOVE_COMPLETE: u16 = 1;

    pub fn homed(data: u32) -> Self {
        Self {
            msg_type: Self::TYPE_MOTOR,
            msg_id: Self::ID_HOMED,
            data,
        }
    }

    pub fn move_complete(data: u32) -> Self {
        Self {
            msg_type: Self::TYPE_MOTOR,
            msg_id: Self::ID_MOVE_COMPLETE,
            data,
        }
    }
}

/// Module type code for stepper rack modules in the vendor device list.
pub const MODULE_TYPE_STEPPER: u32 = 50;

/// Motion velocity parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VelocityParams {
    pub acceleration: i32,
    pub max_velocity: i32,
}

/// Enumeration side of the driver: builds and queries the connected-device list.
pub trait DeviceManager {
    fn build_device_list(&mut self) -> Result<(), DynError>;
    /// Total number of devices in the built list, across all module types.
    fn device_list_size(&self) -> Result<u32, DynError>;
    fn list_by_type(&self, module_type: u32) -> Result<Vec<String>, DynError>;
    fn device_info(&self, serial: &str) -> Result<DeviceRecord, DynError>;
}

/// Command/status side of the driver for one opened rack device.
///
/// `wait_for_message` blocks until the driver's internal polling loop delivers
/// the next queued message; `timeout: None` blocks indefinitely.
pub trait MotorController {
    fn open(&mut self, serial: &str) -> Result<(), DynError>;
    fn close(&mut self);
    fn start_polling(&mut self, channel: u16, interval: Duration) -> Result<(), DynError>;
    fn stop_polling(&mut self, channel: u16);
    fn clear_message_queue(&mut self, channel: u16);
    fn home(&mut self, channel: u16) -> Result<(), DynError>;
    fn move_to(&mut self, channel: u16, position: i32) -> Result<(), DynError>;
    fn wait_for_message(
        &mut self,
        channel: u16,
        timeout: Option<Duration>,
    ) -> Result<RawMessage, DynError>;
    fn velocity_params(&mut self, channel: u16) -> Result<VelocityParams, DynError>;
    fn set_velocity_params(&mut self, channel: u16, params: VelocityParams) -> Result<(), DynError>;
    fn position(&mut self, channel: u16) -> Result<i32, DynError>;
}
