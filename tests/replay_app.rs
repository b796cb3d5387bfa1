use assemblywatch::app::{replay, ReplayArgs};
use assemblywatch::{AssemblyMode, StepView};
use std::io::{self, Write};

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|arg| arg.to_string()).collect()
}

#[test]
fn parses_arguments() {
    let parsed = ReplayArgs::parse(args(&["--input", "feed.jsonl", "--mode", "disassembly"]))
        .unwrap()
        .unwrap();
    assert_eq!(parsed.input.to_str(), Some("feed.jsonl"));
    assert_eq!(parsed.mode, AssemblyMode::Disassembly);
    assert!(parsed.config.is_none());

    assert!(ReplayArgs::parse(args(&["--help"])).unwrap().is_none());
    assert!(ReplayArgs::parse(args(&[])).is_err());
    assert!(ReplayArgs::parse(args(&["--input"])).is_err());
    assert!(ReplayArgs::parse(args(&["--input", "x", "--mode", "sideways"])).is_err());
    assert!(ReplayArgs::parse(args(&["--verbose"])).is_err());
}

#[test]
fn replays_feed_into_final_snapshot() {
    let mut feed = tempfile::NamedTempFile::new().unwrap();
    for line in [
        r#"[{"name": "state_2", "confidence": 0.9}, {"name": "engine", "confidence": 0.8}]"#,
        r#"[{"name": "state_3", "confidence": 0.6}]"#,
        r#"[{"name": "state_3", "confidence": 0.8}, {"name": "wheel", "confidence": 0.7}]"#,
        r#"[{"name": "tire", "confidence": 0.5}]"#,
    ] {
        writeln!(feed, "{line}").unwrap();
    }
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{"state_window": 4, "part_window": 2}}"#).unwrap();

    let replay_args = ReplayArgs {
        input: feed.path().to_path_buf(),
        config: Some(config.path().to_path_buf()),
        mode: AssemblyMode::Assembly,
    };
    let (worker, snapshot) = replay(&replay_args, Box::new(io::sink())).unwrap();
    assert_eq!(snapshot.batch_seq, 4);
    assert_eq!(snapshot.active_state, 3);
    assert!((snapshot.confidence - 0.7).abs() < 1e-9);
    assert_eq!(snapshot.step, StepView::Step(4));
    assert_eq!(snapshot.part_frames.len(), 2);
    assert_eq!(worker.telemetry().active_state_changes_total, 2);
    assert_eq!(worker.telemetry().log_failures_total, 0);
    assert_eq!(worker.logger().retained(), 2);

    let rendered = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(rendered["mode"], "assembly");
    assert_eq!(rendered["step"]["kind"], "step");
    assert_eq!(rendered["part_frames"][1][0]["class_name"], "tire");
}

#[test]
fn missing_feed_is_reported_with_context() {
    let replay_args = ReplayArgs {
        input: "/nonexistent/feed.jsonl".into(),
        config: None,
        mode: AssemblyMode::Assembly,
    };
    let err = replay(&replay_args, Box::new(io::sink())).unwrap_err();
    assert!(format!("{err:#}").contains("loading feed"));
}
