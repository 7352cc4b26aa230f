use clap::Parser;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tarpit::cli::Cli;
use tarpit::config::{Config, MAX_DELAY_SECS, TarpitConfig};
use tarpit::error::ConfigError;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("tarpit").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(cfg.server.backlog, 5);
    assert!(!cfg.server.single_client);
    assert_eq!(cfg.tarpit.buffer_capacity, 4096);
    assert_eq!(cfg.tarpit.drain_interval_secs, 10);
}

#[test]
fn test_config_from_positional_args() {
    let cfg = Config::from_cli(&cli(&["8080", "30"])).unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.tarpit.delay_secs, 30);
    assert!(!cfg.server.single_client);
    assert_eq!(cfg.server.listen_addr().to_string(), "0.0.0.0:8080");
}

#[test]
fn test_single_client_flag() {
    let short = Config::from_cli(&cli(&["-1", "8080", "5"])).unwrap();
    let long = Config::from_cli(&cli(&["8080", "5", "--single-client"])).unwrap();

    assert!(short.server.single_client);
    assert!(long.server.single_client);
}

#[test]
fn test_bind_override() {
    let cfg = Config::from_cli(&cli(&["--bind", "127.0.0.1", "9000", "1"])).unwrap();

    assert_eq!(cfg.server.listen_addr().to_string(), "127.0.0.1:9000");
}

#[test]
fn test_missing_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["tarpit"]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "8080"]).is_err());
}

#[test]
fn test_too_many_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["tarpit", "8080", "5", "7"]).is_err());
}

#[test]
fn test_unknown_option_is_rejected() {
    assert!(Cli::try_parse_from(["tarpit", "-x", "8080", "5"]).is_err());
}

#[test]
fn test_non_positive_numbers_are_rejected() {
    assert!(Cli::try_parse_from(["tarpit", "0", "5"]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "8080", "0"]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "http", "5"]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "8080", "soon"]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "70000", "5"]).is_err());
}

#[test]
fn test_log_directive_follows_verbosity() {
    assert_eq!(cli(&["80", "1"]).log_directive(), "tarpit=info");
    assert_eq!(cli(&["-v", "80", "1"]).log_directive(), "tarpit=debug");
    assert_eq!(cli(&["-vvv", "80", "1"]).log_directive(), "tarpit=trace");
}

#[test]
fn test_yaml_partial_sections_keep_defaults() {
    let cfg = Config::from_yaml("tarpit:\n  buffer_capacity: 128\n").unwrap();

    assert_eq!(cfg.tarpit.buffer_capacity, 128);
    assert_eq!(cfg.tarpit.drain_interval_secs, 10);
    assert_eq!(cfg.server.backlog, 5);
}

#[test]
fn test_empty_yaml_is_default() {
    let cfg = Config::from_yaml("").unwrap();

    assert_eq!(cfg.tarpit.buffer_capacity, 4096);
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let err = Config::from_yaml("server: [not, a, map]").unwrap_err();

    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_config_file_merged_with_cli() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  bind_addr: 127.0.0.1\n  backlog: 16\n  single_client: true\ntarpit:\n  delay_secs: 99\n  buffer_capacity: 512"
    )
    .unwrap();

    let path = file.path().to_str().unwrap();
    let cfg = Config::from_cli(&cli(&["--config", path, "7000", "3"])).unwrap();

    assert_eq!(cfg.server.listen_addr().to_string(), "127.0.0.1:7000");
    assert_eq!(cfg.server.backlog, 16);
    assert!(cfg.server.single_client);
    // Positional delay wins over the file.
    assert_eq!(cfg.tarpit.delay_secs, 3);
    assert_eq!(cfg.tarpit.buffer_capacity, 512);
}

#[test]
fn test_missing_config_file() {
    let err = Config::load("/nonexistent/tarpit.yaml").unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_validate_rejects_zero_values() {
    let mut cfg = Config::from_cli(&cli(&["8080", "5"])).unwrap();
    cfg.tarpit.buffer_capacity = 0;
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

    let mut cfg = Config::from_cli(&cli(&["8080", "5"])).unwrap();
    cfg.tarpit.drain_interval_secs = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::from_cli(&cli(&["8080", "5"])).unwrap();
    cfg.server.backlog = 0;
    assert!(cfg.validate().is_err());

    assert!(Config::default().validate().is_err());
}

#[test]
fn test_connection_settings_from_tarpit_config() {
    let settings = TarpitConfig {
        delay_secs: 7,
        buffer_capacity: 100,
        drain_interval_secs: 2,
        resolve_peer_names: false,
    }
    .settings();

    assert_eq!(settings.delay, Duration::from_secs(7));
    assert_eq!(settings.buffer_capacity, 100);
    assert_eq!(settings.drain_interval, Duration::from_secs(2));
    assert!(!settings.resolve_peer_names);
}

#[test]
fn test_peer_names_resolved_by_default() {
    assert!(Config::default().tarpit.resolve_peer_names);

    let cfg = Config::from_yaml("tarpit:\n  resolve_peer_names: false\n").unwrap();
    assert!(!cfg.tarpit.resolve_peer_names);
}

#[test]
fn test_delay_upper_bound_on_command_line() {
    let max = MAX_DELAY_SECS.to_string();
    let over = (MAX_DELAY_SECS + 1).to_string();

    assert!(Cli::try_parse_from(["tarpit", "8080", max.as_str()]).is_ok());
    assert!(Cli::try_parse_from(["tarpit", "8080", over.as_str()]).is_err());
    assert!(Cli::try_parse_from(["tarpit", "8080", "18446744073709551615"]).is_err());
}

#[test]
fn test_delay_upper_bound_in_config_file() {
    let mut cfg = Config::from_cli(&cli(&["8080", "5"])).unwrap();

    cfg.tarpit.delay_secs = MAX_DELAY_SECS;
    assert!(cfg.validate().is_ok());

    cfg.tarpit.delay_secs = u64::MAX;
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

    let mut cfg = Config::from_cli(&cli(&["8080", "5"])).unwrap();
    cfg.tarpit.drain_interval_secs = u64::MAX;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::from_cli(&cli(&["8080", "5"])).unwrap();
    let cfg2 = cfg1.clone();

    assert_eq!(cfg1.server.port, cfg2.server.port);
    assert_eq!(cfg1.tarpit.delay_secs, cfg2.tarpit.delay_secs);
}
