//! Config file discovery, table merging, and environment variable overlay.

use crate::{ConfigError, GlanceConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Which files and environment variables produced a config.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Files in the order they were merged
    pub files: Vec<PathBuf>,
    /// Variables that replaced a file or default value
    pub env_overrides: Vec<String>,
}

/// Existing config files, lowest precedence first: system, user, then either
/// `cli_path` or `./glance.toml`.
///
/// An explicit `cli_path` that exists takes the place of `./glance.toml`.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/glance/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("glance/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("glance.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Turn a merged table into a typed config. Missing keys fall back to defaults.
pub fn from_table(table: toml::Table, origin: &Path) -> Result<GlanceConfig, ConfigError> {
    let mut config: GlanceConfig =
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
    config.agent.knowledge_dir = expand_path(&config.agent.knowledge_dir.to_string_lossy());
    Ok(config)
}

/// Overlay `GLANCE_*` and the standard OTel/`RUST_LOG` variables, recording
/// each one that took effect.
pub fn apply_env_overrides(config: &mut GlanceConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("GLANCE_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = v;
        sources.env_overrides.push("GLANCE_OTLP_ENDPOINT".to_string());
    }
    if let Ok(v) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = v;
        sources.env_overrides.push("OTEL_EXPORTER_OTLP_ENDPOINT".to_string());
    }
    if let Ok(v) = env::var("GLANCE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("GLANCE_LOG_LEVEL".to_string());
    }
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Ok(v) = env::var("GLANCE_SAMPLE_INTERVAL_MS") {
        if let Ok(ms) = v.parse() {
            config.capture.sample_interval_ms = ms;
            sources.env_overrides.push("GLANCE_SAMPLE_INTERVAL_MS".to_string());
        }
    }

    if let Ok(v) = env::var("GLANCE_KNOWLEDGE_DIR") {
        config.agent.knowledge_dir = expand_path(&v);
        sources.env_overrides.push("GLANCE_KNOWLEDGE_DIR".to_string());
    }
}

/// Expand a leading `~/` or `$VAR` in `path`. Unknown variables are left as-is.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
        return PathBuf::from(path);
    }

    if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        let (var_name, rest) = match stripped.find('/') {
            Some(slash_pos) => (&stripped[..slash_pos], Some(&stripped[slash_pos + 1..])),
            None => (stripped, None),
        };
        return match (env::var(var_name), rest) {
            (Ok(value), Some(rest)) => PathBuf::from(value).join(rest),
            (Ok(value), None) => PathBuf::from(value),
            (Err(_), _) => PathBuf::from(path),
        };
    }

    PathBuf::from(path)
}
