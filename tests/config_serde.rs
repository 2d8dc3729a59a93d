use evalsplit::{GeneratorConfig, SplitPolicy};

#[test]
fn generator_config_round_trips_through_json() {
    let config = GeneratorConfig {
        seed: -7,
        randomize: false,
        use_view: true,
        relation_template: "@/$N".to_string(),
        allow_empty_partitions: true,
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: GeneratorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn missing_config_fields_take_defaults() {
    let parsed: GeneratorConfig = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
    assert_eq!(
        parsed,
        GeneratorConfig {
            seed: 42,
            ..GeneratorConfig::default()
        }
    );
}

#[test]
fn split_policies_round_trip_through_json() {
    for policy in [
        SplitPolicy::stratified_k_fold(10),
        SplitPolicy::leave_one_out(),
        SplitPolicy::ordered_split(0.66),
    ] {
        let json = serde_json::to_string(&policy).unwrap();
        let parsed: SplitPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
    let parsed: SplitPolicy =
        serde_json::from_str(r#"{"KFold": {"folds": 5, "stratify": false}}"#).unwrap();
    assert_eq!(parsed, SplitPolicy::k_fold(5));
}
