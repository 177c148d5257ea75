//! Human-readable error descriptions and structured JSON error formatting.

use rack_core::RackError;

fn error_name(e: &RackError) -> &'static str {
    match e {
        RackError::Enumeration(_) => "Enumeration",
        RackError::NotFound(_) => "NotFound",
        RackError::Open(..) => "Open",
        RackError::Driver(_) => "Driver",
        RackError::Fault(_) => "Fault",
        RackError::WaitTimeout => "WaitTimeout",
        RackError::State(_) => "State",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(re) = err.downcast_ref::<RackError>() {
        return match re {
            RackError::Enumeration(msg) => format!(
                "What happened: Building the device list failed ({msg}).\nLikely causes: Rack controller unplugged, powered off, or the USB driver is not loaded.\nHow to fix: Check the USB cable and power, then rerun `rack list`."
            ),
            RackError::NotFound(serial) => format!(
                "What happened: No stepper module matching serial {serial} was found.\nLikely causes: Wrong serial in the config, or the module sits in a different rack bay.\nHow to fix: Run `rack list` and copy one of the printed serials into `[device] serial` or pass --serial."
            ),
            RackError::Open(serial, msg) => format!(
                "What happened: Device {serial} was found but could not be opened ({msg}).\nLikely causes: Another process holds the device, or it dropped off the bus after enumeration.\nHow to fix: Close other software talking to the rack and try again."
            ),
            RackError::WaitTimeout => "What happened: The device never reported command completion within the wait timeout.\nLikely causes: Stage obstructed, polling not running, or the timeout is too short for the travel.\nHow to fix: Raise motion.wait_timeout_ms (0 waits forever) or check the stage for obstructions.".to_string(),
            RackError::Driver(msg) | RackError::Fault(msg) => format!(
                "What happened: The motion driver reported an error ({msg}).\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
            RackError::State(msg) => format!(
                "What happened: Command issued in an invalid state ({msg}).\nLikely causes: The session was released or never opened.\nHow to fix: This is a bug worth reporting; rerun with --log-level=debug and keep the log."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid") && lower.contains("config") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [device] serial, zero channel, or out-of-range values.\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed errors (if present) to stable exit codes; untyped errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(re) = err.downcast_ref::<RackError>() {
        return match re {
            RackError::Enumeration(_) => 2,
            RackError::NotFound(_) => 3,
            RackError::Open(..) => 4,
            RackError::WaitTimeout => 5,
            RackError::Driver(_) | RackError::Fault(_) | RackError::State(_) => 6,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    if let Some(re) = err.downcast_ref::<RackError>() {
        return json!({ "reason": error_name(re), "message": msg }).to_string();
    }
    json!({ "reason": "Error", "message": msg }).to_string()
}
