//! Simulated motion-control driver.
//!
//! The real rack hardware sits behind a closed vendor SDK whose driver runs
//! its own polling thread and posts completion messages into a per-device
//! queue. This crate reproduces that observable contract in-process: motion
//! commands return immediately and a worker thread delivers the completion
//! tuple into a `crossbeam-channel` queue after a simulated travel time.
//! Message delivery only happens while status polling is active, matching
//! the vendor behavior the workflow depends on.
pub mod error;

use crossbeam_channel as xch;
use error::DriverError;
use rack_traits::{
    DeviceManager, DeviceRecord, DynError, MODULE_TYPE_STEPPER, MotorController, RawMessage,
    VelocityParams,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Serial of the stepper module in the [`SimulatedManager::bench`] roster.
pub const BENCH_STEPPER_SERIAL: &str = "50837825";

/// Simulated device-list side of the driver.
#[derive(Debug, Default)]
pub struct SimulatedManager {
    devices: Vec<(u32, DeviceRecord)>,
    built: bool,
    fail_build: bool,
}

impl SimulatedManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo roster: one stepper rack module plus one module of another type,
    /// so type filtering is observable.
    pub fn bench() -> Self {
        Self::new()
            .with_device(MODULE_TYPE_STEPPER, BENCH_STEPPER_SERIAL, "Stepper Rack Module")
            .with_device(70, "70104321", "Piezo Rack Module")
    }

    pub fn with_device(mut self, module_type: u32, serial: &str, description: &str) -> Self {
        self.devices.push((
            module_type,
            DeviceRecord {
                serial: serial.to_string(),
                description: description.to_string(),
            },
        ));
        self
    }

    /// Force the next `build_device_list` to fail (test hook).
    pub fn fail_build(mut self) -> Self {
        self.fail_build = true;
        self
    }
}

impl DeviceManager for SimulatedManager {
    fn build_device_list(&mut self) -> Result<(), DynError> {
        if self.fail_build {
            return Err(Box::new(DriverError::ListBuild(
                "simulated bus scan failure".into(),
            )));
        }
        self.built = true;
        tracing::debug!(devices = self.devices.len(), "device list built");
        Ok(())
    }

    fn device_list_size(&self) -> Result<u32, DynError> {
        if !self.built {
            return Err(Box::new(DriverError::ListNotBuilt));
        }
        Ok(self.devices.len() as u32)
    }

    fn list_by_type(&self, module_type: u32) -> Result<Vec<String>, DynError> {
        if !self.built {
            return Err(Box::new(DriverError::ListNotBuilt));
        }
        Ok(self
            .devices
            .iter()
            .filter(|(t, _)| *t == module_type)
            .map(|(_, rec)| rec.serial.clone())
            .collect())
    }

    fn device_info(&self, serial: &str) -> Result<DeviceRecord, DynError> {
        self.devices
            .iter()
            .find(|(_, rec)| rec.serial == serial)
            .map(|(_, rec)| rec.clone())
            .ok_or_else(|| Box::new(DriverError::UnknownSerial(serial.to_string())) as DynError)
    }
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    position: i32,
    vel: VelocityParams,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            position: 4200,
            vel: VelocityParams {
                acceleration: 1_000,
                max_velocity: 10_000,
            },
        }
    }
}

/// Simulated opened rack device.
///
/// Commands are non-blocking; each spawns a worker that sleeps for the
/// configured travel time, applies the motion to the channel state, and
/// posts the completion message if polling is active at delivery time.
pub struct SimulatedRack {
    serial: String,
    travel: Duration,
    open: bool,
    polling: Arc<AtomicBool>,
    channels: Arc<Mutex<HashMap<u16, ChannelState>>>,
    tx: xch::Sender<RawMessage>,
    rx: xch::Receiver<RawMessage>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl SimulatedRack {
    pub fn new(serial: &str) -> Self {
        let (tx, rx) = xch::unbounded();
        Self {
            serial: serial.to_string(),
            travel: Duration::from_millis(5),
            open: false,
            polling: Arc::new(AtomicBool::new(false)),
            channels: Arc::new(Mutex::new(HashMap::new())),
            tx,
            rx,
            workers: Vec::new(),
        }
    }

    /// Override the simulated per-command travel time.
    pub fn with_travel(mut self, travel: Duration) -> Self {
        self.travel = travel;
        self
    }

    /// Push an arbitrary message into the queue (test hook for unrelated
    /// status messages the wait loop must discard).
    pub fn inject_message(&self, msg: RawMessage) {
        let _ = self.tx.send(msg);
    }

    fn require_open(&self) -> Result<(), DynError> {
        if self.open {
            Ok(())
        } else {
            Err(Box::new(DriverError::NotOpen))
        }
    }

    fn spawn_motion(&mut self, channel: u16, target: Option<i32>, done: RawMessage) {
        let travel = self.travel;
        let polling = Arc::clone(&self.polling);
        let channels = Arc::clone(&self.channels);
        let tx = self.tx.clone();
        self.workers.push(thread::spawn(move || {
            thread::sleep(travel);
            if let Ok(mut map) = channels.lock() {
                let state = map.entry(channel).or_default();
                // home drives to the reference position, a move to its target
                state.position = target.unwrap_or(0);
            }
            if polling.load(Ordering::Relaxed) {
                if tx.send(done).is_err() {
                    tracing::debug!("completion consumer gone, dropping message");
                }
            } else {
                tracing::trace!(?done, "polling inactive, completion not delivered");
            }
        }));
    }

    fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "simulated motion worker panicked");
            }
        }
    }
}

impl MotorController for SimulatedRack {
    fn open(&mut self, serial: &str) -> Result<(), DynError> {
        if serial != self.serial {
            return Err(Box::new(DriverError::UnknownSerial(serial.to_string())));
        }
        self.open = true;
        tracing::debug!(serial, "device opened");
        Ok(())
    }

    fn close(&mut self) {
        self.polling.store(false, Ordering::Relaxed);
        self.join_workers();
        self.open = false;
        tracing::debug!(serial = %self.serial, "device closed");
    }

    fn start_polling(&mut self, channel: u16, interval: Duration) -> Result<(), DynError> {
        self.require_open()?;
        self.polling.store(true, Ordering::Relaxed);
        tracing::debug!(channel, interval_ms = interval.as_millis() as u64, "polling started");
        Ok(())
    }

    fn stop_polling(&mut self, channel: u16) {
        self.polling.store(false, Ordering::Relaxed);
        tracing::debug!(channel, "polling stopped");
    }

    fn clear_message_queue(&mut self, _channel: u16) {
        let drained = self.rx.try_iter().count();
        if drained > 0 {
            tracing::trace!(drained, "message queue cleared");
        }
    }

    fn home(&mut self, channel: u16) -> Result<(), DynError> {
        self.require_open()?;
        self.spawn_motion(channel, None, RawMessage::homed(u32::from(channel)));
        Ok(())
    }

    fn move_to(&mut self, channel: u16, position: i32) -> Result<(), DynError> {
        self.require_open()?;
        self.spawn_motion(
            channel,
            Some(position),
            RawMessage::move_complete(u32::from(channel)),
        );
        Ok(())
    }

    fn wait_for_message(
        &mut self,
        _channel: u16,
        timeout: Option<Duration>,
    ) -> Result<RawMessage, DynError> {
        self.require_open()?;
        match timeout {
            None => self
                .rx
                .recv()
                .map_err(|_| Box::new(DriverError::Disconnected) as DynError),
            Some(t) => self.rx.recv_timeout(t).map_err(|e| match e {
                xch::RecvTimeoutError::Timeout => Box::new(DriverError::Timeout) as DynError,
                xch::RecvTimeoutError::Disconnected => {
                    Box::new(DriverError::Disconnected) as DynError
                }
            }),
        }
    }

    fn velocity_params(&mut self, channel: u16) -> Result<VelocityParams, DynError> {
        self.require_open()?;
        let mut map = self
            .channels
            .lock()
            .map_err(|_| Box::new(DriverError::Poisoned) as DynError)?;
        Ok(map.entry(channel).or_default().vel)
    }

    fn set_velocity_params(&mut self, channel: u16, params: VelocityParams) -> Result<(), DynError> {
        self.require_open()?;
        let mut map = self
            .channels
            .lock()
            .map_err(|_| Box::new(DriverError::Poisoned) as DynError)?;
        map.entry(channel).or_default().vel = params;
        Ok(())
    }

    fn position(&mut self, channel: u16) -> Result<i32, DynError> {
        self.require_open()?;
        let mut map = self
            .channels
            .lock()
            .map_err(|_| Box::new(DriverError::Poisoned) as DynError)?;
        Ok(map.entry(channel).or_default().position)
    }
}

impl Drop for SimulatedRack {
    fn drop(&mut self) {
        self.polling.store(false, Ordering::Relaxed);
        self.join_workers();
    }
}
