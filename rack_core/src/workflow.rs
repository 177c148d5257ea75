//! The fixed motion sequence: locate → open → poll → settle → home →
//! optional velocity → move → report → release.

use crate::error::{RackError, Report, Result};
use crate::locator;
use crate::message::Completion;
use crate::session::Session;
use rack_traits::{Clock, DeviceManager, MODULE_TYPE_STEPPER, MotorController};
use std::time::Duration;

/// Workflow parameters. Defaults reproduce the constants the original
/// console example compiled in.
#[derive(Debug, Clone)]
pub struct MotionCfg {
    pub serial: String,
    pub channel: u16,
    pub module_type: u32,
    /// Target position in device units.
    pub position: i32,
    /// Max velocity applied before the move; 0 leaves the device setting
    /// untouched.
    pub velocity: i32,
    pub poll_interval_ms: u64,
    /// Delay between starting polling and homing.
    pub settle_ms: u64,
    /// Per-wait upper bound; 0 waits forever.
    pub wait_timeout_ms: u64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            serial: "50837825".to_string(),
            channel: 1,
            module_type: MODULE_TYPE_STEPPER,
            position: 0,
            velocity: 0,
            poll_interval_ms: 200,
            settle_ms: 3_000,
            wait_timeout_ms: 0,
        }
    }
}

/// Outcome of a completed workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionReport {
    pub serial: String,
    pub final_position: i32,
}

/// Run the whole sequence. The session is released on every path that
/// opened it (explicitly on success, via Drop on error).
pub fn run<M, C>(
    manager: &mut M,
    controller: C,
    cfg: &MotionCfg,
    clock: &dyn Clock,
) -> Result<MotionReport>
where
    M: DeviceManager,
    C: MotorController,
{
    let records = locator::enumerate(manager, cfg.module_type)?;
    let serial = locator::match_serial(&records, &cfg.serial)
        .map(|rec| rec.serial.clone())
        .ok_or_else(|| Report::new(RackError::NotFound(cfg.serial.clone())))?;
    tracing::info!(serial = %serial, "requested device found");

    let wait_timeout = match cfg.wait_timeout_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    let mut session =
        Session::open(controller, &serial, cfg.channel)?.with_wait_timeout(wait_timeout);
    session.start_polling(Duration::from_millis(cfg.poll_interval_ms))?;

    // Give the polling loop time to produce an initial status before homing.
    clock.sleep(Duration::from_millis(cfg.settle_ms));

    session.home()?;
    session.wait_for(Completion::Homed)?;
    tracing::info!(serial = %serial, "homing complete");

    if cfg.velocity > 0 {
        session.set_velocity(cfg.velocity)?;
    }

    session.move_to(cfg.position)?;
    session.wait_for(Completion::MoveComplete)?;

    let final_position = session.position()?;
    tracing::info!(serial = %serial, position = final_position, "move complete");

    session.release();
    Ok(MotionReport {
        serial,
        final_position,
    })
}
