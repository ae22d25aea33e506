//! Configuration sections: telemetry export, frame capture, and agent behaviour.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Telemetry and observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint for OpenTelemetry.
    /// Default: 127.0.0.1:4317
    #[serde(default = "TelemetryConfig::default_otlp_endpoint")]
    pub otlp_endpoint: String,

    /// Log level or full `EnvFilter` directive (trace, debug, info, warn, error).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// `service.name` resource attribute attached to every exported signal.
    /// Default: glance
    #[serde(default = "TelemetryConfig::default_service_name")]
    pub service_name: String,
}

impl TelemetryConfig {
    fn default_otlp_endpoint() -> String {
        "127.0.0.1:4317".to_string()
    }

    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_service_name() -> String {
        "glance".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: Self::default_otlp_endpoint(),
            log_level: Self::default_log_level(),
            service_name: Self::default_service_name(),
        }
    }
}

/// How much detail the language model should spend on attached images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    #[default]
    High,
    Auto,
}

impl ImageDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
            ImageDetail::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ImageDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen-share frame capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Minimum spacing between admitted frames, in milliseconds.
    /// Default: 1000
    #[serde(default = "CaptureConfig::default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Detail hint attached to every injected frame.
    /// Default: high
    #[serde(default)]
    pub image_detail: ImageDetail,
}

impl CaptureConfig {
    fn default_sample_interval_ms() -> u64 {
        1_000
    }

    pub fn sample_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: Self::default_sample_interval_ms(),
            image_detail: ImageDetail::default(),
        }
    }
}

/// Conversational agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name given to every per-turn trace.
    /// Default: video_agent
    #[serde(default = "AgentConfig::default_trace_name")]
    pub trace_name: String,

    /// Directory holding the knowledge base markdown files.
    /// Default: ./knowledge
    #[serde(default = "AgentConfig::default_knowledge_dir")]
    pub knowledge_dir: PathBuf,

    /// Instructions for the greeting spoken on entry.
    #[serde(default = "AgentConfig::default_intro_instructions")]
    pub intro_instructions: String,

    /// Instructions for the goodbye spoken on exit.
    #[serde(default = "AgentConfig::default_farewell_instructions")]
    pub farewell_instructions: String,
}

impl AgentConfig {
    fn default_trace_name() -> String {
        "video_agent".to_string()
    }

    fn default_knowledge_dir() -> PathBuf {
        PathBuf::from("knowledge")
    }

    fn default_intro_instructions() -> String {
        "introduce yourself very briefly".to_string()
    }

    fn default_farewell_instructions() -> String {
        "tell the user a friendly goodbye before you exit".to_string()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            trace_name: Self::default_trace_name(),
            knowledge_dir: Self::default_knowledge_dir(),
            intro_instructions: Self::default_intro_instructions(),
            farewell_instructions: Self::default_farewell_instructions(),
        }
    }
}
