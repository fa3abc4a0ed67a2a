//! From argv to a built config, plus the environment wiring of every flag.

use std::time::Duration;

use clap::{CommandFactory, Parser};
use noco_cli::cli::Cli;
use noco_cli::config::{ConfigError, DEFAULT_BATCH_SIZE, MigrationConfig, REQUIRED};

const CONNECTION: [&str; 13] = [
    "nocodb-clone",
    "--base-url",
    "https://noco.example.com/",
    "--token",
    "from-flag",
    "--source-base-id",
    "p_src",
    "--source-table-id",
    "m_src",
    "--target-base-id",
    "p_dst",
    "--target-table-id",
    "m_dst",
];

fn parse(extra: &[&str]) -> Cli {
    Cli::try_parse_from(CONNECTION.iter().chain(extra)).unwrap()
}

fn env_of(long: &str) -> Option<String> {
    Cli::command()
        .get_arguments()
        .find(|arg| arg.get_long() == Some(long))
        .and_then(|arg| arg.get_env())
        .map(|env| env.to_string_lossy().into_owned())
}

#[test]
fn flags_build_the_run_configuration() {
    let cli = parse(&[
        "--page-size",
        "10",
        "--no-delete-columns",
        "--timeout",
        "5",
        "--sleep",
        "0.5",
    ]);
    let config = MigrationConfig::from_args(&cli.args).unwrap();

    assert_eq!(config.token, "from-flag");
    assert_eq!(config.base_url, "https://noco.example.com");
    assert_eq!(config.source.to_string(), "p_src/m_src");
    assert_eq!(config.target.to_string(), "p_dst/m_dst");
    assert_eq!(config.page_size, 10);
    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    assert!(config.delete_rows);
    assert!(!config.delete_columns);
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.request_delay, Duration::from_millis(500));

    let client = config.client_config();
    assert_eq!(client.timeout, Duration::from_secs(5));
    assert_eq!(client.request_delay, Duration::from_millis(500));
}

#[test]
fn every_setting_falls_back_to_its_environment_variable() {
    let expected = [
        ("base-url", "NOCODB_URL"),
        ("token", "NOCODB_TOKEN"),
        ("source-base-id", "SOURCE_BASE_ID"),
        ("source-table-id", "SOURCE_TABLE_ID"),
        ("target-base-id", "TARGET_BASE_ID"),
        ("target-table-id", "TARGET_TABLE_ID"),
        ("created-at-title", "TARGET_SOURCE_CREATED_AT_TITLE"),
        ("updated-at-title", "TARGET_SOURCE_UPDATED_AT_TITLE"),
        ("batch-size", "BATCH_SIZE"),
        ("page-size", "PAGE_SIZE"),
        ("timeout", "REQUEST_TIMEOUT_SEC"),
        ("sleep", "SLEEP_BETWEEN_REQUESTS_SEC"),
    ];
    for (long, env) in expected {
        assert_eq!(env_of(long).as_deref(), Some(env), "--{long}");
    }
    for flag in ["no-delete-rows", "no-delete-columns", "preserve-source-timestamps"] {
        assert_eq!(env_of(flag), None, "--{flag}");
    }
}

#[test]
fn missing_setting_names_match_the_command_line() {
    for setting in REQUIRED {
        assert_eq!(env_of(setting.flag).as_deref(), Some(setting.env));
    }
}

#[test]
fn token_value_is_hidden_from_help() {
    let command = Cli::command();
    let token = command
        .get_arguments()
        .find(|arg| arg.get_long() == Some("token"))
        .unwrap();
    assert!(token.is_hide_env_values_set());
}

#[test]
fn missing_required_setting_is_named() {
    let mut cli = parse(&[]);
    cli.args.base_url = None;
    let err = MigrationConfig::from_args(&cli.args).unwrap_err();

    assert_eq!(
        err,
        ConfigError::Missing {
            flag: "base-url",
            key: "NOCODB_URL"
        }
    );
}

#[test]
fn zero_batch_size_is_rejected_while_parsing() {
    let err = Cli::try_parse_from(CONNECTION.iter().chain(&["--batch-size", "0"])).unwrap_err();

    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    assert!(err.to_string().contains("at least 1"));
}
