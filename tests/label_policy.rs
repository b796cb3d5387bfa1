use assemblywatch::{first_digit_run, LabelClass, LabelPolicy};

#[test]
fn prefixed_policy_reads_state_suffix() {
    let policy = LabelPolicy::default();
    assert_eq!(policy.classify("state_07"), LabelClass::State(7));
    assert_eq!(policy.classify("state_14"), LabelClass::State(14));
    assert_eq!(policy.classify("engine"), LabelClass::Part);
}

#[test]
fn prefixed_policy_keeps_numbered_parts_as_parts() {
    let policy = LabelPolicy::default();
    for label in ["gray_45", "gray_90", "green_3", "white_45"] {
        assert_eq!(policy.classify(label), LabelClass::Part, "{label}");
    }
}

#[test]
fn marker_without_digits_is_a_part() {
    let policy = LabelPolicy::default();
    assert_eq!(policy.classify("state_"), LabelClass::Part);
    assert_eq!(policy.classify("statement"), LabelClass::Part);
}

#[test]
fn first_digit_run_policy_accepts_any_numbered_label() {
    let policy = LabelPolicy::FirstDigitRun;
    assert_eq!(policy.classify("gray_45"), LabelClass::State(45));
    assert_eq!(policy.classify("step3_v12"), LabelClass::State(3));
    assert_eq!(policy.classify("tire"), LabelClass::Part);
}

#[test]
fn custom_marker_is_honoured() {
    let policy = LabelPolicy::Prefixed {
        marker: "stage-".into(),
    };
    assert_eq!(policy.classify("stage-4"), LabelClass::State(4));
    assert_eq!(policy.classify("state_4"), LabelClass::Part);
}

#[test]
fn zero_and_overflowing_ids_fall_back_to_parts() {
    assert_eq!(first_digit_run("state_0"), None);
    assert_eq!(first_digit_run("state_000"), None);
    assert_eq!(first_digit_run("state_99999999999"), None);
    assert_eq!(first_digit_run("state_4294967295"), Some(u32::MAX));
    assert_eq!(LabelPolicy::default().classify("state_0"), LabelClass::Part);
}
