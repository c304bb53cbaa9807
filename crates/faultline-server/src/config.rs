use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tracing: TracingConfig,

    #[serde(default)]
    pub faults: FaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append-only log file written alongside stdout, for log shippers that
    /// scrape files. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// OTLP trace endpoint; spans stay unexported when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,

    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
}

/// Initial fault parameters seeded into the controller at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultsConfig {
    #[serde(default)]
    pub error_rate: f64,

    #[serde(default)]
    pub extra_latency_ms: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
            logging: LoggingConfig::default(),
            tracing: TracingConfig::default(),
            faults: FaultsConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: None,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            sampling_rate: default_sampling_rate(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("FAULTLINE_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("FAULTLINE_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("FAULTLINE_SERVICE_NAME") {
            self.service_name = val;
        }

        if let Ok(val) = std::env::var("FAULTLINE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("FAULTLINE_LOG_PATH") {
            self.logging.path = Some(val);
        }

        if let Ok(val) = std::env::var("FAULTLINE_OTLP_ENDPOINT") {
            self.tracing.otlp_endpoint = Some(val);
        }

        if let Ok(val) = std::env::var("FAULTLINE_TRACE_SAMPLING") {
            if let Ok(rate) = val.parse::<f64>() {
                self.tracing.sampling_rate = rate;
            }
        }

        // Initial fault parameters; clamped by the controller at startup
        if let Ok(val) = std::env::var("FAULTLINE_ERROR_RATE") {
            if let Ok(rate) = val.parse::<f64>() {
                self.faults.error_rate = rate;
            }
        }

        if let Ok(val) = std::env::var("FAULTLINE_EXTRA_LATENCY_MS") {
            if let Ok(ms) = val.parse::<i64>() {
                self.faults.extra_latency_ms = ms;
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_service_name() -> String {
    "faultline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sampling_rate() -> f64 {
    1.0
}
