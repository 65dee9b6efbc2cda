#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use assetwatch_core::error::AssetWatchError;
use assetwatch_gateway::config::{self, ReportFormatName};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8000"
rate_limit:
  windw_ms: 100 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8000");
    assert_eq!(cfg.server.assets_dir, "./assets");
    assert!(cfg.metrics.track_clients);
    assert_eq!(cfg.metrics.report_format, ReportFormatName::Html);
    assert_eq!(cfg.rate_limit.window_ms, 100);
    assert_eq!(cfg.rate_limit.max_requests, 30);
    assert_eq!(cfg.rate_limit.burst, 30);
    assert_eq!(cfg.rate_limit.cleanup_interval_ms, 60_000);
}

#[test]
fn full_config_round_trips_fields() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
  assets_dir: "/srv/www"
metrics:
  track_clients: false
  client_header: "x-forwarded-for"
  report_format: minimal
  refresh_secs: 0
rate_limit:
  enabled: true
  window_ms: 1000
  max_requests: 5
  burst: 10
  cleanup_interval_ms: 5000
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
    assert!(!cfg.metrics.track_clients);
    assert_eq!(cfg.metrics.client_header.as_deref(), Some("x-forwarded-for"));
    assert_eq!(cfg.metrics.report_format, ReportFormatName::Minimal);
    assert_eq!(cfg.rate_limit.window().as_millis(), 1000);
}

#[test]
fn rejects_wrong_version_and_bad_values() {
    let err = config::load_from_str("version: 2\n").unwrap_err();
    assert!(matches!(err, AssetWatchError::UnsupportedVersion));

    let err = config::load_from_str("version: 1\nserver:\n  listen: \"nope\"\n").unwrap_err();
    assert!(matches!(err, AssetWatchError::BadConfig(_)));

    let err = config::load_from_str("version: 1\nrate_limit:\n  burst: 0\n").unwrap_err();
    assert!(matches!(err, AssetWatchError::BadConfig(_)));

    let err =
        config::load_from_str("version: 1\nrate_limit:\n  cleanup_interval_ms: 10\n").unwrap_err();
    assert!(matches!(err, AssetWatchError::BadConfig(_)));

    // limits are not checked when the limiter is off
    config::load_from_str("version: 1\nrate_limit:\n  enabled: false\n  burst: 0\n").unwrap();
}

#[test]
fn unknown_report_format_fails() {
    let err = config::load_from_str("version: 1\nmetrics:\n  report_format: xml\n").unwrap_err();
    assert!(matches!(err, AssetWatchError::BadConfig(_)));
}
