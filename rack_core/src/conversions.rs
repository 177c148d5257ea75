//! `From` implementations bridging `rack_config` types to `rack_core` types.

use crate::workflow::MotionCfg;

impl From<&rack_config::Config> for MotionCfg {
    fn from(c: &rack_config::Config) -> Self {
        Self {
            serial: c.device.serial.clone(),
            channel: c.device.channel,
            module_type: c.device.module_type,
            position: c.motion.position,
            velocity: c.motion.velocity,
            poll_interval_ms: c.polling.interval_ms,
            settle_ms: c.motion.settle_ms,
            wait_timeout_ms: c.motion.wait_timeout_ms,
        }
    }
}
