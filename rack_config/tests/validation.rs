use rack_config::{Config, load_path, load_toml};
use rstest::rstest;
use std::io::Write;

const FULL: &str = r#"
[device]
serial = "50837825"
channel = 1
module_type = 50

[motion]
position = 25000
velocity = 1200
settle_ms = 3000
wait_timeout_ms = 0

[polling]
interval_ms = 200

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn full_config_parses_and_validates() {
    let cfg = load_toml(FULL).expect("parse");
    cfg.validate().expect("validate");
    assert_eq!(cfg.motion.position, 25_000);
    assert_eq!(cfg.motion.velocity, 1_200);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case::empty_serial("[device]\nserial = \"\"", "serial")]
#[case::alpha_serial("[device]\nserial = \"SN-12345\"", "numeric")]
#[case::zero_channel("[device]\nserial = \"50837825\"\nchannel = 0", "channel")]
#[case::negative_velocity("[motion]\nvelocity = -5", "velocity")]
#[case::zero_poll("[polling]\ninterval_ms = 0", "interval_ms")]
#[case::bad_rotation("[logging]\nrotation = \"weekly\"", "rotation")]
fn invalid_configs_are_rejected(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse");
    let err = cfg.validate().unwrap_err();
    assert!(
        err.to_string().contains(needle),
        "error {err} should mention {needle}"
    );
}

#[test]
fn unparseable_toml_is_an_error_not_a_panic() {
    assert!(load_toml("[device\nserial=").is_err());
}

#[test]
fn load_path_reads_file() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(FULL.as_bytes()).expect("write");
    let cfg = load_path(f.path()).expect("load");
    assert_eq!(cfg.motion.position, 25_000);
}

#[test]
fn load_path_missing_file_errors() {
    let err = load_path(std::path::Path::new("/nonexistent/rack.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}
