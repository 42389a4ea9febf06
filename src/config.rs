// Application configuration
//
// Layered with the `config` crate: built-in defaults, then an optional TOML file, then
// environment variables prefixed with SITE_WIZARD_ (nested keys separated by `__`, e.g.
// SITE_WIZARD_SERVICE__BASE_URL).

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::models::form::FormDefinition;
use crate::service::http::HttpDataService;
use crate::service::local::LocalDataService;
use crate::service::DataService;
use crate::utils::path_resolver;
use crate::wizard::idle::DEFAULT_IDLE_TIMEOUT;

pub const ENV_PREFIX: &str = "SITE_WIZARD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Http,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub mode: ServiceMode,
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Total save attempts, first try included.
    pub save_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mode: ServiceMode::Local,
            base_url: "http://127.0.0.1:8080/api/".to_string(),
            request_timeout_secs: 30,
            save_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub reference_file: String,
    pub records_file: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            reference_file: "reference.toml".to_string(),
            records_file: "records.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub idle_timeout_secs: u64,
    pub form_file: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
            form_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub local: LocalConfig,
    pub wizard: WizardConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `path` (if given and present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: AppConfig = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to read configuration: {}", e))?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wizard.idle_timeout_secs == 0 {
            return Err(anyhow::anyhow!("wizard.idle_timeout_secs must be greater than 0"));
        }
        if self.service.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "service.request_timeout_secs must be greater than 0"
            ));
        }
        if self.service.mode == ServiceMode::Http && self.service.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("service.base_url is required in http mode"));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.wizard.idle_timeout_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .level
            .trim()
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }

    /// The configured form, or the built-in one.
    pub fn form_definition(&self) -> Result<FormDefinition> {
        match self.wizard.form_file.as_deref().map(str::trim) {
            Some(file) if !file.is_empty() => {
                let path = path_resolver::resolve_data_path(file);
                FormDefinition::load(&path)
                    .map_err(|e| anyhow::anyhow!("Form file {:?}: {}", path, e))
            }
            _ => Ok(FormDefinition::site_visit()),
        }
    }

    pub fn data_service(&self) -> Result<Arc<dyn DataService>> {
        match self.service.mode {
            ServiceMode::Http => Ok(Arc::new(HttpDataService::new(
                &self.service.base_url,
                Duration::from_secs(self.service.request_timeout_secs),
            )?)),
            ServiceMode::Local => Ok(Arc::new(LocalDataService::new(
                path_resolver::resolve_data_path(&self.local.reference_file),
                path_resolver::resolve_data_path(&self.local.records_file),
            ))),
        }
    }
}
