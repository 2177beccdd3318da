//! Tests for layered configuration loading.

use super::*;
use crate::MemoryConfig;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

fn no_env(_: &str) -> Option<String> {
    None
}

/// An empty document yields the documented defaults.
#[test]
fn parse_minimal_config() {
    let config = ParleyConfig::load_from_str("{}").expect("config");
    assert_eq!(config, ParleyConfig::default());
    assert_eq!(config.memory.max_entries, 1000);
    assert_eq!(config.memory.ttl_seconds, 3600);
    assert_eq!(config.chat.max_message_chars, 4000);
    assert_eq!(config.provider.model, "llama3-8b-8192");
    assert_eq!(config.server.bind, "0.0.0.0:8000");
}

/// JSON5 comments and trailing commas are accepted.
#[test]
fn parse_json5_document() {
    let json5 = r#"{
        // shorter sessions for the demo box
        memory: { ttl_seconds: 60, max_entries: 10, },
        chat: { system_prompt: "Be brief." },
    }"#;
    let config = ParleyConfig::load_from_str(json5).expect("config");
    assert_eq!(config.memory.ttl_seconds, 60);
    assert_eq!(config.memory.max_entries, 10);
    assert_eq!(config.chat.system_prompt.as_deref(), Some("Be brief."));
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = ParleyConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject unexpected keys nested inside a section.
#[test]
fn rejects_unknown_section_key() {
    let err = ParleyConfig::load_from_str("{ memory: { ttl: 5 } }").unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("memory.ttl"));
    assert!(msg.contains("unknown key"));
}

/// Negative counts fail schema validation instead of wrapping.
#[test]
fn rejects_negative_limits() {
    let err = ParleyConfig::load_from_str("{ memory: { max_entries: -1 } }").unwrap_err();
    assert!(format!("{err}").contains("memory.max_entries"));
}

/// Zero limits are rejected by cross-field validation.
#[test]
fn rejects_zero_limits() {
    for doc in [
        "{ memory: { max_entries: 0 } }",
        "{ memory: { ttl_seconds: 0 } }",
        "{ memory: { sweep_interval_seconds: 0 } }",
        "{ chat: { max_message_chars: 0 } }",
        "{ provider: { timeout_seconds: 0 } }",
    ] {
        let err = ParleyConfig::load_from_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{doc}: {err}");
    }
}

/// A bind address must parse as a socket address.
#[test]
fn rejects_unparsable_bind() {
    let err = ParleyConfig::load_from_str(r#"{ server: { bind: "localhost" } }"#).unwrap_err();
    assert!(format!("{err}").contains("server.bind"));
}

/// Later layers override earlier ones key by key.
#[test]
fn layered_config_precedence() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("work");
    fs::create_dir_all(&cwd).expect("cwd");

    let system_config = root.join("system.json5");
    write_json5(
        &system_config,
        "{ memory: { ttl_seconds: 10, max_entries: 3 }, provider: { model: \"system\" } }",
    );
    let user_config = root.join("user.json5");
    write_json5(&user_config, "{ provider: { model: \"user\" } }");
    write_json5(&cwd.join("parley.json5"), "{ memory: { ttl_seconds: 20 } }");
    let runtime_config = root.join("runtime.json5");
    write_json5(&runtime_config, "{ server: { bind: \"127.0.0.1:9000\" } }");

    let mut options = LayeredConfigOptions::isolated(&cwd).with_runtime_path(&runtime_config);
    options.system_config_path = Some(system_config.clone());
    options.user_config_path = Some(user_config.clone());

    let layered = ParleyConfig::load_layered_with_env(options, no_env).expect("layered");
    assert_eq!(layered.config.memory.ttl_seconds, 20);
    assert_eq!(layered.config.memory.max_entries, 3);
    assert_eq!(layered.config.provider.model, "user");
    assert_eq!(layered.config.server.bind, "127.0.0.1:9000");

    let sources: Vec<_> = layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::System,
            ConfigLayerSource::User,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Runtime,
        ]
    );
}

/// Environment overrides beat every file layer.
#[test]
fn env_overrides_apply_last() {
    let temp = TempDir::new().expect("tmp");
    write_json5(
        &temp.path().join("parley.json5"),
        "{ memory: { ttl_seconds: 20 }, provider: { max_tokens: 64 } }",
    );
    let mut options = LayeredConfigOptions::isolated(temp.path());
    options.apply_env = true;

    let layered = ParleyConfig::load_layered_with_env(options, |name| match name {
        "MEMORY_TTL_SECONDS" => Some("90".to_string()),
        "PARLEY_BIND" => Some("127.0.0.1:7000".to_string()),
        _ => None,
    })
    .expect("layered");

    assert_eq!(layered.config.memory.ttl_seconds, 90);
    assert_eq!(layered.config.provider.max_tokens, 64);
    assert_eq!(layered.config.server.bind, "127.0.0.1:7000");
    let env_layer = layered.layers.last().expect("env layer");
    assert_eq!(env_layer.source, ConfigLayerSource::Env);
    assert_eq!(env_layer.variables, vec!["MEMORY_TTL_SECONDS", "PARLEY_BIND"]);
}

/// Env overrides are skipped entirely when disabled.
#[test]
fn env_overrides_respect_opt_out() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions::isolated(temp.path());
    let layered = ParleyConfig::load_layered_with_env(options, |_| Some("1".to_string()))
        .expect("layered");
    assert_eq!(layered.config, ParleyConfig::default());
    assert!(layered.layers.is_empty());
}

/// A missing runtime layer is an error, unlike discovered layers.
#[test]
fn missing_runtime_layer_fails() {
    let temp = TempDir::new().expect("tmp");
    let options =
        LayeredConfigOptions::isolated(temp.path()).with_runtime_path(temp.path().join("nope.json5"));
    let err = ParleyConfig::load_layered_with_env(options, no_env).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

/// The same file reached through two layers is only applied once.
#[test]
fn duplicate_layer_paths_are_skipped() {
    let temp = TempDir::new().expect("tmp");
    let local = temp.path().join("parley.json5");
    write_json5(&local, "{ memory: { max_entries: 7 } }");
    let mut options = LayeredConfigOptions::isolated(temp.path());
    options.user_config_path = Some(local);

    let layered = ParleyConfig::load_layered_with_env(options, no_env).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::User);
    assert_eq!(layered.config.memory.max_entries, 7);
}

/// Schema errors name the layer they came from.
#[test]
fn layer_errors_are_labelled() {
    let temp = TempDir::new().expect("tmp");
    write_json5(&temp.path().join("parley.json5"), "{ server: { port: 1 } }");
    let options = LayeredConfigOptions::isolated(temp.path());
    let err = ParleyConfig::load_layered_with_env(options, no_env).unwrap_err();
    match err {
        ConfigError::InvalidField { path, .. } => {
            assert!(path.starts_with("cwd("), "{path}");
            assert!(path.ends_with(":server.port"), "{path}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Builder output round-trips through the loader.
#[test]
fn builder_matches_loaded_config() {
    let built = ParleyConfig::builder()
        .memory(MemoryConfig {
            max_entries: 2,
            ttl_seconds: 5,
            sweep_interval_seconds: Some(1),
        })
        .build();
    let loaded = ParleyConfig::load_from_str(
        "{ memory: { max_entries: 2, ttl_seconds: 5, sweep_interval_seconds: 1 } }",
    )
    .expect("config");
    assert_eq!(built, loaded);
}
