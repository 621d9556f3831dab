//! Service identity and collector configuration
//!
//! A `StellateConfig` is built once at startup and shared read-only for the
//! life of the process. It carries the service name and the two token slots
//! used to authorize log and schema reports.

use crate::error::{Result, StellateError};
use crate::reporter::Endpoint;

/// Default collector domain; reports go to `https://{service}.{domain}/{endpoint}`
pub const DEFAULT_COLLECTOR_DOMAIN: &str = "stellate.sh";

/// Environment variable names read by [`StellateConfig::from_env`]
pub mod env {
    pub const SERVICE_NAME: &str = "STELLATE_SERVICE_NAME";
    pub const TOKEN: &str = "STELLATE_TOKEN";
    pub const SCHEMA_TOKEN: &str = "STELLATE_SCHEMA_TOKEN";
    pub const COLLECTOR_DOMAIN: &str = "STELLATE_COLLECTOR_DOMAIN";
    pub const COLLECTOR_URL: &str = "STELLATE_COLLECTOR_URL";
}

/// Identity of the Stellate service this process reports to
#[derive(Clone, PartialEq, Eq)]
pub struct StellateConfig {
    /// Name of the Stellate service (first DNS label of the collector host)
    pub service_name: String,

    /// Token sent as `Stellate-Logging-Token`
    pub logging_token: String,

    /// Token sent as `Stellate-Schema-Token`; same as the logging token unless set
    pub schema_token: String,

    /// Collector domain appended after the service name
    pub collector_domain: String,

    /// Full base URL replacing `https://{service}.{domain}` (proxies, staging, tests)
    pub collector_url: Option<String>,
}

// Tokens stay out of logs and panics.
impl std::fmt::Debug for StellateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StellateConfig")
            .field("service_name", &self.service_name)
            .field("logging_token", &"<redacted>")
            .field("schema_token", &"<redacted>")
            .field("collector_domain", &self.collector_domain)
            .field("collector_url", &self.collector_url)
            .finish()
    }
}

impl StellateConfig {
    /// Create a config where both token slots share one token
    pub fn new(service_name: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::builder(service_name, token).build()
    }

    /// Create a config builder
    pub fn builder(
        service_name: impl Into<String>,
        token: impl Into<String>,
    ) -> StellateConfigBuilder {
        StellateConfigBuilder::new(service_name, token)
    }

    /// Create config from `STELLATE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (environment, secrets store, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup(env::SERVICE_NAME)
            .ok_or_else(|| StellateError::config(format!("{} is not set", env::SERVICE_NAME)))?;
        let token = lookup(env::TOKEN)
            .ok_or_else(|| StellateError::config(format!("{} is not set", env::TOKEN)))?;

        let mut builder = Self::builder(service_name, token);
        if let Some(schema_token) = lookup(env::SCHEMA_TOKEN) {
            builder = builder.schema_token(schema_token);
        }
        if let Some(domain) = lookup(env::COLLECTOR_DOMAIN) {
            builder = builder.collector_domain(domain);
        }
        if let Some(url) = lookup(env::COLLECTOR_URL) {
            builder = builder.collector_url(url);
        }
        builder.build()
    }

    /// Base URL that endpoint paths are appended to
    pub fn base_url(&self) -> String {
        match &self.collector_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.service_name, self.collector_domain),
        }
    }

    /// Full URL for a report endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url(), endpoint.as_str())
    }

    fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(StellateError::config("service name must not be empty"));
        }
        if !self
            .service_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(StellateError::config(format!(
                "service name '{}' is not a valid host label",
                self.service_name
            )));
        }
        if self.logging_token.is_empty() || self.schema_token.is_empty() {
            return Err(StellateError::config("token must not be empty"));
        }
        if self.collector_domain.is_empty() {
            return Err(StellateError::config("collector domain must not be empty"));
        }
        if let Some(url) = &self.collector_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(StellateError::config(format!(
                    "collector url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        Ok(())
    }
}

/// Builder for StellateConfig
pub struct StellateConfigBuilder {
    service_name: String,
    logging_token: String,
    schema_token: Option<String>,
    collector_domain: String,
    collector_url: Option<String>,
}

impl StellateConfigBuilder {
    /// Create a new builder with the required identity
    pub fn new(service_name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            logging_token: token.into(),
            schema_token: None,
            collector_domain: DEFAULT_COLLECTOR_DOMAIN.to_string(),
            collector_url: None,
        }
    }

    /// Use a distinct token for schema sync
    pub fn schema_token(mut self, token: impl Into<String>) -> Self {
        self.schema_token = Some(token.into());
        self
    }

    /// Set the collector domain
    pub fn collector_domain(mut self, domain: impl Into<String>) -> Self {
        self.collector_domain = domain.into();
        self
    }

    /// Override the collector base URL entirely
    pub fn collector_url(mut self, url: impl Into<String>) -> Self {
        self.collector_url = Some(url.into());
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<StellateConfig> {
        let schema_token = self
            .schema_token
            .unwrap_or_else(|| self.logging_token.clone());

        let config = StellateConfig {
            service_name: self.service_name,
            logging_token: self.logging_token,
            schema_token,
            collector_domain: self.collector_domain,
            collector_url: self.collector_url,
        };
        config.validate()?;
        Ok(config)
    }
}
