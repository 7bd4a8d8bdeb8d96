//! Configuration management for storefront.
//!
//! Configuration is read from environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to the binary's own default.
//! - `BACKEND_URL` - Optional. Store API used by the shopping tools. Defaults to `http://localhost:8000`.
//! - `FRONTEND_URL` - Optional. Storefront UI used in product links. Defaults to `http://localhost:3000`.
//! - `SEED_PRODUCTS` - Optional. Number of mock products generated at startup. Defaults to `150`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations per turn. Defaults to `25`.
//! - `CHECKOUT_APPROVAL` - Optional. Pause for user approval before checkout. Defaults to `true`.
//!
//! Language model settings live in [`LlmConfig`]:
//! - `LLM_API_KEY` (or `OPENAI_API_KEY`) - API key for an OpenAI-compatible endpoint.
//! - `LLM_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `DEFAULT_MODEL` - Optional. Defaults to `gpt-4o`.
//! - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_DEPLOYMENT_NAME`,
//!   `OPENAI_API_VERSION` - Use Azure OpenAI instead when the endpoint is set.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server and agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Base URL of the store API (used by the shopping tools)
    pub backend_url: String,

    /// Base URL of the storefront UI (used in product links)
    pub frontend_url: String,

    /// Number of mock products seeded at startup
    pub seed_products: usize,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Whether approval-gated tools pause the agent
    pub checkout_approval: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `default_port` is used when `PORT` is unset, so the store and the
    /// agent servers can run side by side with no configuration.
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", default_port)?;
        let seed_products = parse_env("SEED_PRODUCTS", 150)?;
        let max_iterations = parse_env("MAX_ITERATIONS", 25)?;

        let backend_url = std::env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let checkout_approval = std::env::var("CHECKOUT_APPROVAL")
            .ok()
            .map(|v| {
                parse_bool(&v)
                    .map_err(|e| ConfigError::InvalidValue("CHECKOUT_APPROVAL".to_string(), e))
            })
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            backend_url,
            frontend_url,
            seed_products,
            max_iterations,
            checkout_approval,
        })
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            backend_url: "http://localhost:8000".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            seed_products: 150,
            max_iterations: 25,
            checkout_approval: true,
        }
    }
}

/// Which chat-completions flavour to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// Any OpenAI-compatible endpoint (OpenAI, OpenRouter, local servers).
    OpenAi { base_url: String },
    /// Azure OpenAI deployment.
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

/// Language model configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,

    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,
}

impl LlmConfig {
    /// Load the model configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no API key is configured for
    /// the selected provider.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model = std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        if let Ok(endpoint) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            let api_key = std::env::var("AZURE_OPENAI_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("AZURE_OPENAI_API_KEY".to_string()))?;
            let deployment = std::env::var("AZURE_OPENAI_DEPLOYMENT_NAME").map_err(|_| {
                ConfigError::MissingEnvVar("AZURE_OPENAI_DEPLOYMENT_NAME".to_string())
            })?;
            let api_version = std::env::var("OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-08-01-preview".to_string());

            return Ok(Self {
                provider: LlmProvider::Azure {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    deployment,
                    api_version,
                },
                api_key,
                model,
            });
        }

        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| ConfigError::MissingEnvVar("LLM_API_KEY".to_string()))?;
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            provider: LlmProvider::OpenAi { base_url },
            api_key,
            model,
        })
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
