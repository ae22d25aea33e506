//! Layered configuration loading for glance.
//!
//! Depends only on serde, toml, directories and thiserror; the agent library,
//! its binary and host integrations all link it.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/glance/config.toml` (system)
//! 2. `~/.config/glance/config.toml` (user)
//! 3. `./glance.toml` (local override, or the path given on the command line)
//! 4. Environment variables (`GLANCE_*`, `OTEL_EXPORTER_OTLP_ENDPOINT`, `RUST_LOG`)
//!
//! Files are merged table-by-table before deserializing, so a local file can
//! override a single key without restating the whole section.
//!
//! # Example Config
//!
//! ```toml
//! [telemetry]
//! otlp_endpoint = "127.0.0.1:4317"
//! log_level = "info"
//!
//! [capture]
//! sample_interval_ms = 1000
//! image_detail = "high"
//!
//! [agent]
//! trace_name = "video_agent"
//! knowledge_dir = "~/glance/knowledge"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{AgentConfig, CaptureConfig, ImageDetail, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete glance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlanceConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

impl GlanceConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/glance/config.toml`
    /// 3. `~/.config/glance/config.toml`
    /// 4. `./glance.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file replacing `./glance.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let mut config = loader::from_table(merged, &origin)?;

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render the effective configuration as TOML, sections in a fixed order.
    pub fn to_toml(&self) -> String {
        let mut output = String::from("# glance configuration\n\n");

        output.push_str("[telemetry]\n");
        output.push_str(&format!("otlp_endpoint = {}\n", quote(&self.telemetry.otlp_endpoint)));
        output.push_str(&format!("log_level = {}\n", quote(&self.telemetry.log_level)));
        output.push_str(&format!("service_name = {}\n", quote(&self.telemetry.service_name)));

        output.push_str("\n[capture]\n");
        output.push_str(&format!(
            "sample_interval_ms = {}\n",
            self.capture.sample_interval_ms
        ));
        output.push_str(&format!("image_detail = \"{}\"\n", self.capture.image_detail));

        output.push_str("\n[agent]\n");
        output.push_str(&format!("trace_name = {}\n", quote(&self.agent.trace_name)));
        output.push_str(&format!(
            "knowledge_dir = {}\n",
            quote(&self.agent.knowledge_dir.to_string_lossy())
        ));
        output.push_str(&format!(
            "intro_instructions = {}\n",
            quote(&self.agent.intro_instructions)
        ));
        output.push_str(&format!(
            "farewell_instructions = {}\n",
            quote(&self.agent.farewell_instructions)
        ));

        output
    }
}

/// A TOML basic string, escaped.
fn quote(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}
