#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core rack motion workflow (driver-agnostic).
//!
//! Everything hardware-facing goes through the `rack_traits::DeviceManager`
//! and `rack_traits::MotorController` boundary; the vendor driver (or the
//! in-tree simulator) lives on the other side.
//!
//! ## Architecture
//!
//! - **Locator**: build the device list and match the target serial
//!   (`locator` module)
//! - **Session**: exclusive ownership of an opened device; command +
//!   wait-for-completion discipline; release on drop (`session` module)
//! - **Workflow**: the fixed locate → open → poll → settle → home → move →
//!   report sequence (`workflow` module)
//! - **Messages**: completion-tuple classification (`message` module)

// Module declarations
pub mod conversions;
pub mod error;
pub mod locator;
pub mod message;
pub mod mocks;
pub mod session;
pub mod workflow;

pub use error::{RackError, Result};
pub use message::Completion;
pub use session::Session;
pub use workflow::{MotionCfg, MotionReport, run};
