//! Schema validation for Parley JSON5 configuration layers.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "memory", "chat", "provider", "server"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("chat") {
        validate_chat(value, layer, "chat")?;
    }
    if let Some(value) = map.get("provider") {
        validate_provider(value, layer, "provider")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    Ok(())
}

fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["max_entries", "ttl_seconds", "sweep_interval_seconds"],
        layer,
        path,
    )?;
    for key in ["max_entries", "ttl_seconds"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("sweep_interval_seconds") {
        if !value.is_null() {
            expect_u64(value, layer, &join_path(path, "sweep_interval_seconds"))?;
        }
    }
    Ok(())
}

fn validate_chat(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["max_message_chars", "system_prompt"], layer, path)?;
    if let Some(value) = map.get("max_message_chars") {
        expect_u64(value, layer, &join_path(path, "max_message_chars"))?;
    }
    if let Some(value) = map.get("system_prompt") {
        if !value.is_null() {
            expect_string(value, layer, &join_path(path, "system_prompt"))?;
        }
    }
    Ok(())
}

fn validate_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "name",
            "base_url",
            "model",
            "api_key_env",
            "temperature",
            "max_tokens",
            "timeout_seconds",
        ],
        layer,
        path,
    )?;
    for key in ["name", "base_url", "model", "api_key_env"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    for key in ["max_tokens", "timeout_seconds"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["bind"], layer, path)?;
    if let Some(value) = map.get("bind") {
        expect_string(value, layer, &join_path(path, "bind"))?;
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Counts and durations are unsigned.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
