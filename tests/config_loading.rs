use assemblywatch::{ConfigError, ConsensusConfig, LabelClass, LabelPolicy, LogLevel};
use serde_json::json;
use std::io::Write;

#[test]
fn defaults_match_reference_deployment() {
    let config = ConsensusConfig::default();
    assert_eq!(config.state_window, 20);
    assert_eq!(config.part_window, 20);
    assert_eq!(config.total_states, 15);
    assert_eq!(
        config.label,
        LabelPolicy::Prefixed {
            marker: "state".into()
        }
    );
    assert_eq!(config.log.level, LogLevel::Info);
    config.validate().unwrap();
}

#[test]
fn partial_document_keeps_defaults() {
    let config = ConsensusConfig::from_value(json!({
        "state_window": 8,
        "label": {"policy": "first_digit_run"},
        "log": {"level": "debug"}
    }))
    .unwrap();
    assert_eq!(config.state_window, 8);
    assert_eq!(config.part_window, 20);
    assert_eq!(config.label, LabelPolicy::FirstDigitRun);
    assert_eq!(config.log.level, LogLevel::Debug);
    assert_eq!(config.log.retained_lines, 256);

    let estimator = config.build_estimator().unwrap();
    assert_eq!(estimator.state_window().capacity(), 8);
    assert_eq!(estimator.policy().classify("gray_45"), LabelClass::State(45));
    let logger = config.build_logger().unwrap();
    assert_eq!(logger.level(), LogLevel::Debug);
    assert_eq!(logger.retention(), 256);
}

#[test]
fn rejects_unknown_keys() {
    let err = ConsensusConfig::from_value(json!({"buffer_len": 20})).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn rejects_zero_windows_and_empty_marker() {
    let cases = [
        json!({"state_window": 0}),
        json!({"part_window": 0}),
        json!({"total_states": 0}),
        json!({"feed_queue_capacity": 0}),
        json!({"label": {"policy": "prefixed", "marker": ""}}),
        json!({"log": {"retained_lines": 0}}),
    ];
    for case in cases {
        let err = ConsensusConfig::from_value(case.clone()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{case}");
    }
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"part_window": 6, "total_states": 10, "label": {{"policy": "prefixed", "marker": "step"}}}}"#
    )
    .unwrap();
    let config = ConsensusConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.part_window, 6);
    assert_eq!(config.plan().total_states(), 10);
    assert_eq!(config.label.classify("step_4"), LabelClass::State(4));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConsensusConfig::load_from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
