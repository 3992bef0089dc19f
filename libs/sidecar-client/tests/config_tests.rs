//! Integration tests for sidecar client configuration

use std::time::Duration;

use figment::{Figment, providers::Serialized};
use serde_json::json;
use sidecar_client::{ConfigError, SidecarClientConfig};

#[test]
fn default_config_is_valid() {
    let cfg = SidecarClientConfig::default();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 34904);
    assert_eq!(cfg.pool_size, 1, "a single channel unless pooling is asked for");
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.endpoint_uri(), "http://127.0.0.1:34904");
}

#[test]
fn builder_setters_override_defaults() {
    let cfg = SidecarClientConfig::new("sidecar.local", 50001)
        .with_pool_size(8)
        .with_connect_timeout(Duration::from_secs(3))
        .with_rpc_timeout(Duration::from_millis(500))
        .with_service_name("orders");

    assert_eq!(cfg.endpoint_uri(), "http://sidecar.local:50001");
    assert_eq!(cfg.pool_size, 8);
    assert_eq!(cfg.connect_timeout, Duration::from_secs(3));
    assert_eq!(cfg.rpc_timeout, Duration::from_millis(500));
    assert_eq!(cfg.service_name, "orders");
}

#[test]
fn validate_rejects_unusable_values() {
    let base = SidecarClientConfig::default();

    let blank_host = SidecarClientConfig {
        host: "  ".to_owned(),
        ..base.clone()
    };
    assert!(matches!(blank_host.validate(), Err(ConfigError::InvalidHost)));

    let zero_port = SidecarClientConfig {
        port: 0,
        ..base.clone()
    };
    assert!(matches!(zero_port.validate(), Err(ConfigError::InvalidPort)));

    let zero_pool = base.clone().with_pool_size(0);
    assert!(matches!(
        zero_pool.validate(),
        Err(ConfigError::InvalidPoolSize)
    ));

    let zero_rpc_timeout = base.with_rpc_timeout(Duration::ZERO);
    assert!(matches!(
        zero_rpc_timeout.validate(),
        Err(ConfigError::InvalidTimeout {
            field: "rpc_timeout"
        })
    ));
}

#[test]
fn from_figment_reads_humantime_durations_and_fills_defaults() {
    let figment = Figment::new().merge(Serialized::defaults(json!({
        "host": "10.0.0.7",
        "pool_size": 3,
        "rpc_timeout": "750ms",
    })));

    let cfg = SidecarClientConfig::from_figment(&figment).unwrap();

    assert_eq!(cfg.host, "10.0.0.7");
    assert_eq!(cfg.port, 34904, "missing fields fall back to defaults");
    assert_eq!(cfg.pool_size, 3);
    assert_eq!(cfg.rpc_timeout, Duration::from_millis(750));
    assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
}

#[test]
fn from_figment_rejects_unknown_fields() {
    let figment = Figment::new().merge(Serialized::defaults(json!({
        "host": "10.0.0.7",
        "use_pool": true,
    })));

    let err = SidecarClientConfig::from_figment(&figment).unwrap_err();
    assert!(matches!(err, ConfigError::Extract(_)), "got {err:?}");
}

#[test]
fn from_figment_validates_extracted_values() {
    let figment = Figment::new().merge(Serialized::defaults(json!({
        "pool_size": 0,
    })));

    let err = SidecarClientConfig::from_figment(&figment).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPoolSize), "got {err:?}");
}
