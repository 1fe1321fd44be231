//! Config loading and validation tests.

use pag_core::config::*;
use pag_core::errors::ConfigError;
use pag_core::PagError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = PagConfig::from_toml("").unwrap();

    // Skeleton defaults
    assert_eq!(config.skeleton.depth, -1);
    assert!(config.skeleton.stable);
    assert!(config.skeleton.parallel);
    assert_eq!(config.skeleton.test_timeout_ms, 0);
    assert_eq!(config.skeleton.test_workers, 8);

    // Orientation defaults
    assert_eq!(config.orientation.collider_strategy, ColliderStrategyKind::SepsetBased);
    assert!(config.orientation.complete_rule_set);
    assert!(config.orientation.discriminating_path_rule);
    assert_eq!(config.orientation.max_discriminating_path_length, -1);
    assert!(!config.orientation.guarantee_pag);
    assert!(!config.orientation.edge_markup);

    // Latent defaults
    assert!(!config.latent.enabled);
    assert_eq!(config.latent.check, LatentCheck::Direct);
    assert_eq!(config.latent.latent_prefix, "L");

    // Ensemble defaults
    assert_eq!(config.ensemble.runs, 10);
    assert_eq!(config.ensemble.policy, EnsemblePolicy::Majority);
    assert!(config.ensemble.with_replacement);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[skeleton]
depth = 2
test_timeout_ms = 250

[orientation]
collider_strategy = "max_p"
max_discriminating_path_length = 5

[latent]
enabled = true
check = "minimal"

[ensemble]
policy = "highest"
"#;
    let config = PagConfig::from_toml(toml).unwrap();
    assert_eq!(config.skeleton.depth, 2);
    assert_eq!(config.skeleton.test_timeout_ms, 250);
    // Non-overridden fields keep defaults
    assert!(config.skeleton.stable);
    assert_eq!(config.orientation.collider_strategy, ColliderStrategyKind::MaxP);
    assert_eq!(config.orientation.max_discriminating_path_length, 5);
    assert!(config.latent.enabled);
    assert_eq!(config.latent.check, LatentCheck::Minimal);
    assert_eq!(config.ensemble.policy, EnsemblePolicy::Highest);
    assert_eq!(config.ensemble.runs, 10);
}

#[test]
fn config_rejects_short_discriminating_path_bound() {
    let err = PagConfig::from_toml("[orientation]\nmax_discriminating_path_length = 3\n").unwrap_err();
    match err {
        PagError::ConfigError(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "orientation.max_discriminating_path_length");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_rejects_bad_resample_fraction_without_replacement() {
    let toml = "[ensemble]\nwith_replacement = false\nresample_fraction = 1.5\n";
    assert!(PagConfig::from_toml(toml).is_err());
    let toml = "[ensemble]\nwith_replacement = true\nresample_fraction = 1.5\n";
    assert!(PagConfig::from_toml(toml).is_ok());
}

#[test]
fn config_rejects_timed_tests_without_workers() {
    let toml = "[skeleton]\ntest_timeout_ms = 100\ntest_workers = 0\n";
    assert!(PagConfig::from_toml(toml).is_err());
    let toml = "[skeleton]\ntest_workers = 0\n";
    assert!(PagConfig::from_toml(toml).is_ok());
}

#[test]
fn config_rejects_parallel_without_stable() {
    let toml = "[skeleton]\nstable = false\nparallel = true\n";
    assert!(PagConfig::from_toml(toml).is_err());
}

#[test]
fn config_parse_error_is_reported() {
    let err = PagConfig::from_toml("[skeleton\ndepth = 1").unwrap_err();
    assert!(matches!(err, PagError::ConfigError(ConfigError::Parse { .. })));
}

#[test]
fn config_roundtrips_through_toml() {
    let mut config = PagConfig::default();
    config.orientation.collider_strategy = ColliderStrategyKind::Conservative;
    config.ensemble.seed = 7;
    let text = config.to_toml().unwrap();
    assert_eq!(PagConfig::from_toml(&text).unwrap(), config);
}

#[test]
fn config_loads_from_file_and_reports_missing_file() {
    let path = std::env::temp_dir().join(format!("pag_config_{}.toml", std::process::id()));
    std::fs::write(&path, "[latent]\nenabled = true\nmax_block_size = 3\n").unwrap();
    let config = PagConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(config.latent.enabled);
    assert_eq!(config.latent.max_block_size, 3);

    let err = PagConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, PagError::ConfigError(ConfigError::Parse { .. })));
}
