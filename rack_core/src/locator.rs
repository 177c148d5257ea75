//! Device discovery: build the vendor device list, collect records for the
//! requested module type, and match the target serial number.

use crate::error::{RackError, Report, Result, map_driver_error_dyn};
use eyre::WrapErr;
use rack_traits::{DeviceManager, DeviceRecord};

/// Build the device list and return one record per connected module of the
/// given type. Fails with `RackError::Enumeration` when the list build or
/// the type listing fails.
pub fn enumerate<M: DeviceManager>(manager: &mut M, module_type: u32) -> Result<Vec<DeviceRecord>> {
    manager
        .build_device_list()
        .map_err(|e| Report::new(RackError::Enumeration(e.to_string())))?;
    // The total count covers every module type; only logged, selection goes
    // through the type filter below.
    let total = manager
        .device_list_size()
        .map_err(|e| Report::new(RackError::Enumeration(e.to_string())))?;
    tracing::debug!(total, "device list built");
    let serials = manager
        .list_by_type(module_type)
        .map_err(|e| Report::new(RackError::Enumeration(e.to_string())))?;

    let mut records = Vec::with_capacity(serials.len());
    for serial in serials {
        let rec = manager
            .device_info(&serial)
            .map_err(|e| Report::new(map_driver_error_dyn(&*e)))
            .wrap_err_with(|| format!("device info for {serial}"))?;
        tracing::info!(serial = %rec.serial, description = %rec.description, "found device");
        records.push(rec);
    }
    Ok(records)
}

/// First record whose 8-character serial prefix equals the target's.
pub fn match_serial<'a>(records: &'a [DeviceRecord], target: &str) -> Option<&'a DeviceRecord> {
    records.iter().find(|r| serial_prefix_eq(&r.serial, target))
}

/// strncmp(a, b, 8) == 0 semantics: compare the first 8 bytes; a string
/// shorter than 8 only matches another of the same length and content.
pub fn serial_prefix_eq(a: &str, b: &str) -> bool {
    let a8 = &a.as_bytes()[..a.len().min(8)];
    let b8 = &b.as_bytes()[..b.len().min(8)];
    a8 == b8
}
