mod common;

use std::fs;

use llama_rng::{
    config::{self, ProviderConfig},
    factory, logger,
    stats::Summary,
    ErrorKind, Provider,
};

fn config_for(vars: &[(&str, &str)]) -> ProviderConfig {
    ProviderConfig::from_vars(vars.iter().copied()).unwrap()
}

#[test]
fn local_normal_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rng_values.txt");
    let path_str = path.to_str().unwrap();

    let config = config_for(&[
        (config::ENV_PROVIDER, "local-normal"),
        (config::ENV_SEED, "42"),
        (config::ENV_DEBUG, "1"),
        (config::ENV_OUTPUT, path_str),
    ]);
    let mut provider = factory::from_config(&config).unwrap();

    let values: Vec<f64> = (0..1000)
        .map(|_| provider.generate().unwrap().value())
        .collect();
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));

    let summary = Summary::from_values(&values).unwrap();
    assert!((0.45..=0.55).contains(&summary.mean), "{summary}");
    assert!((0.10..=0.20).contains(&summary.std_dev), "{summary}");

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1001);
    assert_eq!(contents.lines().next(), Some("# local-normal"));

    let records = logger::read_records(&path).unwrap();
    assert_eq!(records.len(), 1000);
    assert!(records
        .windows(2)
        .all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms));
    for (record, value) in records.iter().zip(&values) {
        assert!((record.value - value).abs() < 1e-6);
    }
}

#[test]
fn logging_disabled_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rng_values.txt");

    let config = config_for(&[
        (config::ENV_PROVIDER, "uniform"),
        (config::ENV_SEED, "1"),
        (config::ENV_OUTPUT, path.to_str().unwrap()),
    ]);
    let mut provider = factory::from_config(&config).unwrap();
    for _ in 0..100 {
        provider.generate().unwrap();
    }

    assert!(!path.exists());
}

#[test]
fn same_seed_same_sequence() {
    let config = config_for(&[(config::ENV_PROVIDER, "uniform"), (config::ENV_SEED, "1234")]);
    let mut a = factory::from_config(&config).unwrap();
    let mut b = factory::from_config(&config).unwrap();

    for _ in 0..50 {
        assert_eq!(a.generate().unwrap().value(), b.generate().unwrap().value());
    }
}

#[test]
fn builds_remote_from_environment_style_config() {
    let url = common::serve("200 OK", r#"{"random": 0.125}"#);
    let config = config_for(&[
        (config::ENV_PROVIDER, "external-api"),
        (config::ENV_API_URL, url.as_str()),
    ]);

    let mut provider = factory::from_config(&config).unwrap();
    assert_eq!(provider.name(), "remote-http");
    assert_eq!(provider.generate().unwrap().value(), 0.125);
}

#[test]
fn remote_failures_are_not_masked_by_fallback() {
    let url = common::refused();
    let config = config_for(&[
        (config::ENV_PROVIDER, "remote-http"),
        (config::ENV_API_URL, url.as_str()),
        (config::ENV_FALLBACK, "1"),
    ]);

    let mut provider = factory::from_config(&config).unwrap();
    assert_eq!(provider.name(), "remote-http");
    assert_eq!(provider.generate().unwrap_err().kind, ErrorKind::Connectivity);
}

#[test]
fn fallback_is_opt_in() {
    let strict = config_for(&[(config::ENV_PROVIDER, "remote-http")]);
    assert_eq!(
        factory::from_config(&strict).err().unwrap().kind,
        ErrorKind::Configuration
    );

    let lenient = config_for(&[
        (config::ENV_PROVIDER, "remote-http"),
        (config::ENV_FALLBACK, "on"),
    ]);
    assert_eq!(factory::from_config(&lenient).unwrap().name(), "local-uniform");
}
