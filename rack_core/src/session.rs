//! Exclusive session over an opened rack device.
//!
//! A `Session` owns the controller for its lifetime. Motion commands follow
//! the driver's discipline: clear the pending message queue, issue the
//! non-blocking command, then block in `wait_for` until the matching
//! completion tuple arrives, discarding everything else. Polling and the
//! device handle are released on `release()` and unconditionally on drop.

use crate::error::{RackError, Report, Result, map_driver_error_dyn};
use crate::message::{Completion, classify};
use eyre::WrapErr;
use rack_traits::{MotorController, RawMessage, VelocityParams};
use std::time::Duration;

#[derive(Debug)]
pub struct Session<C: MotorController> {
    controller: C,
    serial: String,
    channel: u16,
    /// None reproduces the original blocking wait with no way out.
    wait_timeout: Option<Duration>,
    polling: bool,
    released: bool,
}

impl<C: MotorController> Session<C> {
    /// Claim the device. The original example silently skipped the motion
    /// sequence when the open call failed; here the failure is surfaced.
    pub fn open(mut controller: C, serial: &str, channel: u16) -> Result<Self> {
        if let Err(e) = controller.open(serial) {
            return Err(Report::new(RackError::Open(
                serial.to_string(),
                e.to_string(),
            )));
        }
        Ok(Self {
            controller,
            serial: serial.to_string(),
            channel,
            wait_timeout: None,
            polling: false,
            released: false,
        })
    }

    /// Bound each completion wait; `None` (the default) waits forever.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Begin the driver's background status refresh. Message delivery only
    /// works after this.
    pub fn start_polling(&mut self, interval: Duration) -> Result<()> {
        self.controller
            .start_polling(self.channel, interval)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("start polling")?;
        self.polling = true;
        Ok(())
    }

    /// Issue the home command (non-blocking). Callers must follow with
    /// `wait_for(Completion::Homed)`.
    pub fn home(&mut self) -> Result<()> {
        self.controller.clear_message_queue(self.channel);
        self.controller
            .home(self.channel)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("home command")?;
        tracing::info!(serial = %self.serial, channel = self.channel, "device homing");
        Ok(())
    }

    /// Issue a move command (non-blocking). Callers must follow with
    /// `wait_for(Completion::MoveComplete)`.
    pub fn move_to(&mut self, position: i32) -> Result<()> {
        self.controller.clear_message_queue(self.channel);
        self.controller
            .move_to(self.channel, position)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("move command")?;
        tracing::info!(serial = %self.serial, channel = self.channel, position, "device moving");
        Ok(())
    }

    /// Block until the expected completion arrives, discarding unrelated
    /// messages. With no timeout configured a silent device blocks forever,
    /// exactly like the original workflow.
    pub fn wait_for(&mut self, expected: Completion) -> Result<RawMessage> {
        loop {
            let msg = self
                .controller
                .wait_for_message(self.channel, self.wait_timeout)
                .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
                .wrap_err("waiting for completion message")?;
            if classify(&msg) == Some(expected) {
                return Ok(msg);
            }
            tracing::trace!(
                msg_type = msg.msg_type,
                msg_id = msg.msg_id,
                "unrelated message discarded"
            );
        }
    }

    /// Read current velocity parameters and write them back with the new
    /// maximum velocity, acceleration unchanged.
    pub fn set_velocity(&mut self, max_velocity: i32) -> Result<()> {
        let current = self
            .controller
            .velocity_params(self.channel)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("read velocity params")?;
        let params = VelocityParams {
            acceleration: current.acceleration,
            max_velocity,
        };
        self.controller
            .set_velocity_params(self.channel, params)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("write velocity params")?;
        tracing::debug!(
            serial = %self.serial,
            acceleration = params.acceleration,
            max_velocity,
            "velocity updated"
        );
        Ok(())
    }

    /// Point-in-time read of the actual position.
    pub fn position(&mut self) -> Result<i32> {
        self.controller
            .position(self.channel)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err("read position")
    }

    /// Stop polling and close the device. Idempotent; also runs on drop so
    /// every exit path that opened a session releases it.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.polling {
            self.controller.stop_polling(self.channel);
            self.polling = false;
        }
        self.controller.close();
        self.released = true;
        tracing::debug!(serial = %self.serial, "session released");
    }
}

impl<C: MotorController> Drop for Session<C> {
    fn drop(&mut self) {
        self.release();
    }
}
