//! Environment variable overrides applied on top of file layers.

use crate::ConfigError;
use serde_json::{Map, Number, Value};

/// How an environment value is decoded before it is written into the tree.
#[derive(Debug, Clone, Copy)]
enum EnvKind {
    Unsigned,
    Float,
    Text,
}

/// Variable name, target section, target key, decoding.
const ENV_OVERRIDES: &[(&str, &str, &str, EnvKind)] = &[
    ("MEMORY_TTL_SECONDS", "memory", "ttl_seconds", EnvKind::Unsigned),
    ("MAX_CACHE_SIZE", "memory", "max_entries", EnvKind::Unsigned),
    ("MODEL_NAME", "provider", "model", EnvKind::Text),
    ("GROQ_BASE_URL", "provider", "base_url", EnvKind::Text),
    ("TEMPERATURE", "provider", "temperature", EnvKind::Float),
    ("MAX_TOKENS", "provider", "max_tokens", EnvKind::Unsigned),
    ("PARLEY_BIND", "server", "bind", EnvKind::Text),
];

/// Apply every known override present in `lookup`, returning the names applied.
pub(super) fn apply_env_overrides<F>(root: &mut Value, lookup: F) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    for (var, section, key, kind) in ENV_OVERRIDES {
        let Some(raw) = lookup(*var) else {
            continue;
        };
        let value = decode(var, raw.trim(), *kind)?;
        section_mut(root, section)?.insert((*key).to_string(), value);
        applied.push((*var).to_string());
    }
    Ok(applied)
}

fn decode(var: &str, raw: &str, kind: EnvKind) -> Result<Value, ConfigError> {
    match kind {
        EnvKind::Text => Ok(Value::String(raw.to_string())),
        EnvKind::Unsigned => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|err| invalid_env(var, err.to_string())),
        EnvKind::Float => {
            let parsed = raw
                .parse::<f64>()
                .map_err(|err| invalid_env(var, err.to_string()))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| invalid_env(var, "not a finite number".to_string()))
        }
    }
}

fn section_mut<'a>(
    root: &'a mut Value,
    section: &str,
) -> Result<&'a mut Map<String, Value>, ConfigError> {
    let Value::Object(root) = root else {
        return Err(ConfigError::Invalid("config root is not an object".to_string()));
    };
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match entry {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::InvalidField {
            path: format!("env:{section}"),
            message: "expected object".to_string(),
        }),
    }
}

fn invalid_env(var: &str, message: String) -> ConfigError {
    ConfigError::InvalidEnv {
        var: var.to_string(),
        message,
    }
}
