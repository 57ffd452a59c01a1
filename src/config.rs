use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const FALLBACK_DOCUMENT_URL_VAR: &str = "FALLBACK_DOCUMENT_URL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid base url {0:?}: must start with http:// or https://")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Shown in the document viewer when a citation cannot be resolved.
    pub fallback_document_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fallback_document_url: None,
        }
    }
}

impl ClientConfig {
    /// Reads the base url from the environment, falling back to
    /// `http://localhost:8000` when unset or invalid.
    ///
    /// The wasm client has no process environment, so there the values are
    /// baked in at compile time.
    pub fn from_env() -> Self {
        #[cfg(target_arch = "wasm32")]
        let (base, fallback) = (
            option_env!("API_BASE_URL").map(str::to_string),
            option_env!("FALLBACK_DOCUMENT_URL").map(str::to_string),
        );

        #[cfg(not(target_arch = "wasm32"))]
        let (base, fallback) = {
            dotenv::dotenv().ok();
            (
                std::env::var(API_BASE_URL_VAR).ok(),
                std::env::var(FALLBACK_DOCUMENT_URL_VAR).ok(),
            )
        };

        Self::from_values(base, fallback)
    }

    pub fn from_values(base: Option<String>, fallback: Option<String>) -> Self {
        let api_base_url = match base {
            Some(raw) => match normalize_base_url(&raw) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("{}, using {}", e, DEFAULT_API_BASE_URL);
                    DEFAULT_API_BASE_URL.to_string()
                }
            },
            None => {
                log::info!("{} not set, using {}", API_BASE_URL_VAR, DEFAULT_API_BASE_URL);
                DEFAULT_API_BASE_URL.to_string()
            }
        };

        Self {
            api_base_url,
            fallback_document_url: fallback.filter(|url| !url.trim().is_empty()),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_string()))
    }
}
