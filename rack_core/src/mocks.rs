//! Scripted driver mocks for rack_core tests.
//!
//! `ScriptedController` replays a fixed message sequence synchronously and
//! records every boundary call so tests can assert ordering and release
//! behavior without threads.

use rack_traits::{
    DeviceManager, DeviceRecord, DynError, MotorController, RawMessage, VelocityParams,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared call trace; each boundary call appends one line.
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
pub struct ScriptedController {
    /// Messages `wait_for_message` will deliver, in order. The script models
    /// what arrives after commands are issued, so `clear_message_queue` does
    /// not touch it.
    messages: VecDeque<RawMessage>,
    vel: VelocityParams,
    position: i32,
    fail_open: bool,
    log: CallLog,
}

impl Default for ScriptedController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedController {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            vel: VelocityParams {
                acceleration: 2_048,
                max_velocity: 9_000,
            },
            position: 0,
            fail_open: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_messages(mut self, msgs: impl IntoIterator<Item = RawMessage>) -> Self {
        self.messages.extend(msgs);
        self
    }

    pub fn with_velocity_params(mut self, vel: VelocityParams) -> Self {
        self.vel = vel;
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Handle to the call trace; clone before moving the controller into a
    /// session so assertions survive the move.
    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    fn record(&self, entry: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }
}

impl MotorController for ScriptedController {
    fn open(&mut self, serial: &str) -> Result<(), DynError> {
        self.record(format!("open {serial}"));
        if self.fail_open {
            return Err(Box::new(std::io::Error::other("device claim refused")));
        }
        Ok(())
    }

    fn close(&mut self) {
        self.record("close".to_string());
    }

    fn start_polling(&mut self, channel: u16, interval: Duration) -> Result<(), DynError> {
        self.record(format!(
            "start_polling ch={channel} ms={}",
            interval.as_millis()
        ));
        Ok(())
    }

    fn stop_polling(&mut self, channel: u16) {
        self.record(format!("stop_polling ch={channel}"));
    }

    fn clear_message_queue(&mut self, channel: u16) {
        self.record(format!("clear_queue ch={channel}"));
    }

    fn home(&mut self, channel: u16) -> Result<(), DynError> {
        self.record(format!("home ch={channel}"));
        self.position = 0;
        Ok(())
    }

    fn move_to(&mut self, channel: u16, position: i32) -> Result<(), DynError> {
        self.record(format!("move_to ch={channel} pos={position}"));
        self.position = position;
        Ok(())
    }

    fn wait_for_message(
        &mut self,
        _channel: u16,
        timeout: Option<Duration>,
    ) -> Result<RawMessage, DynError> {
        match self.messages.pop_front() {
            Some(msg) => {
                self.record(format!("deliver type={} id={}", msg.msg_type, msg.msg_id));
                Ok(msg)
            }
            // Script exhausted: with a timeout this is the timed-out wait;
            // without one the test forgot to script enough messages.
            None if timeout.is_some() => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "wait for message timed out",
            ))),
            None => Err(Box::new(std::io::Error::other(
                "scripted message queue exhausted",
            ))),
        }
    }

    fn velocity_params(&mut self, channel: u16) -> Result<VelocityParams, DynError> {
        self.record(format!("get_vel ch={channel}"));
        Ok(self.vel)
    }

    fn set_velocity_params(&mut self, channel: u16, params: VelocityParams) -> Result<(), DynError> {
        self.record(format!(
            "set_vel ch={channel} acc={} vel={}",
            params.acceleration, params.max_velocity
        ));
        self.vel = params;
        Ok(())
    }

    fn position(&mut self, channel: u16) -> Result<i32, DynError> {
        self.record(format!("get_position ch={channel}"));
        Ok(self.position)
    }
}

/// Fixed-roster device manager for locator and workflow tests.
#[derive(Debug, Default)]
pub struct ScriptedManager {
    records: Vec<DeviceRecord>,
    fail_build: bool,
}

impl ScriptedManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, serial: &str, description: &str) -> Self {
        self.records.push(DeviceRecord {
            serial: serial.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn fail_build(mut self) -> Self {
        self.fail_build = true;
        self
    }
}

impl DeviceManager for ScriptedManager {
    fn build_device_list(&mut self) -> Result<(), DynError> {
        if self.fail_build {
            return Err(Box::new(std::io::Error::other("bus scan failed")));
        }
        Ok(())
    }

    fn device_list_size(&self) -> Result<u32, DynError> {
        Ok(self.records.len() as u32)
    }

    fn list_by_type(&self, _module_type: u32) -> Result<Vec<String>, DynError> {
        Ok(self.records.iter().map(|r| r.serial.clone()).collect())
    }

    fn device_info(&self, serial: &str) -> Result<DeviceRecord, DynError> {
        self.records
            .iter()
            .find(|r| r.serial == serial)
            .cloned()
            .ok_or_else(|| Box::new(std::io::Error::other("unknown serial")) as DynError)
    }
}
