use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(String),

    #[error("Invalid value in '{var}': '{value}' ({reason})")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Orderings that need the ranked search surface. Anything else goes to the list endpoint.
    pub complex_orderings: BTreeSet<String>,
    pub advanced_page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

pub const DEFAULT_COMPLEX_ORDERINGS: &[&str] = &["rating", "popularity"];
pub const DEFAULT_ADVANCED_PAGE_SIZE: u32 = 24;
pub const DEFAULT_STORE_PATH: &str = ".cookbook/state.json";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("Cookbook/", env!("CARGO_PKG_VERSION"));

fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn get_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn invalid(var: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_url(url: &str, var_name: &str) -> Result<String, ConfigError> {
    if url.trim().is_empty() {
        return Err(invalid(var_name, url, "cannot be empty"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(invalid(var_name, url, "must start with http:// or https://"));
    }

    url::Url::parse(url).map_err(|e| invalid(var_name, url, &e.to_string()))?;

    Ok(url.trim_end_matches('/').to_string())
}

fn parse_positive<T>(value: &str, var_name: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(invalid(var_name, value, "must be a positive number")),
    }
}

impl ApiConfig {
    /// Defaults for everything but the base URL, which is taken as given.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_required(lookup, "COOKBOOK_API_URL")?;
        let base_url = validate_url(&base_url, "COOKBOOK_API_URL")?;

        let api_token = lookup("COOKBOOK_API_TOKEN").filter(|token| !token.trim().is_empty());

        let timeout_str = get_optional(
            lookup,
            "COOKBOOK_HTTP_TIMEOUT_SECONDS",
            &DEFAULT_HTTP_TIMEOUT_SECONDS.to_string(),
        );
        let timeout_secs: u64 = parse_positive(&timeout_str, "COOKBOOK_HTTP_TIMEOUT_SECONDS")?;

        let user_agent = get_optional(lookup, "COOKBOOK_USER_AGENT", DEFAULT_USER_AGENT);

        Ok(Self {
            base_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        })
    }
}

impl SearchConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let orderings_str = get_optional(
            lookup,
            "COOKBOOK_COMPLEX_ORDERINGS",
            &DEFAULT_COMPLEX_ORDERINGS.join(","),
        );
        let complex_orderings: BTreeSet<String> = orderings_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let page_size_str = get_optional(
            lookup,
            "COOKBOOK_ADVANCED_PAGE_SIZE",
            &DEFAULT_ADVANCED_PAGE_SIZE.to_string(),
        );
        let advanced_page_size = parse_positive(&page_size_str, "COOKBOOK_ADVANCED_PAGE_SIZE")?;

        Ok(Self {
            complex_orderings,
            advanced_page_size,
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            complex_orderings: DEFAULT_COMPLEX_ORDERINGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            advanced_page_size: DEFAULT_ADVANCED_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_str = get_optional(lookup, "COOKBOOK_STORE_BACKEND", "file").to_lowercase();
        let backend = match backend_str.as_str() {
            "file" => StoreBackend::File,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(invalid(
                    "COOKBOOK_STORE_BACKEND",
                    other,
                    "must be 'file' or 'memory'",
                ))
            }
        };

        let path = PathBuf::from(get_optional(lookup, "COOKBOOK_STORE_PATH", DEFAULT_STORE_PATH));

        Ok(Self { backend, path })
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::from_lookup(lookup)?,
            search: SearchConfig::from_lookup(lookup)?,
            store: StoreConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_api_config_new_matches_env_defaults() {
        let lookup = lookup_from(&[("COOKBOOK_API_URL", "http://localhost:8000/api/v1/")]);
        let from_env = ApiConfig::from_lookup(&lookup).unwrap();
        let direct = ApiConfig::new("http://localhost:8000/api/v1/");

        assert_eq!(direct.base_url, from_env.base_url);
        assert_eq!(direct.timeout, from_env.timeout);
        assert_eq!(direct.user_agent, from_env.user_agent);
        assert_eq!(direct.api_token, None);
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_url() {
        let lookup = lookup_from(&[("COOKBOOK_API_URL", "https://api.example.com/api/v1/")]);
        let config = ClientConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com/api/v1");
        assert_eq!(config.api.api_token, None);
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("Cookbook/"));
        assert_eq!(
            config.search.complex_orderings,
            BTreeSet::from(["popularity".to_string(), "rating".to_string()])
        );
        assert_eq!(config.search.advanced_page_size, 24);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.path, PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_missing_api_url() {
        let lookup = lookup_from(&[]);
        let err = ClientConfig::from_lookup(&lookup).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COOKBOOK_API_URL".to_string()));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let lookup = lookup_from(&[("COOKBOOK_API_URL", "redis://localhost:6379")]);
        let err = ClientConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "COOKBOOK_API_URL"));
    }

    #[test]
    fn test_overrides() {
        let lookup = lookup_from(&[
            ("COOKBOOK_API_URL", "http://localhost:8000/api"),
            ("COOKBOOK_API_TOKEN", "secret"),
            ("COOKBOOK_HTTP_TIMEOUT_SECONDS", "5"),
            ("COOKBOOK_COMPLEX_ORDERINGS", "rating, popularity , trending"),
            ("COOKBOOK_ADVANCED_PAGE_SIZE", "48"),
            ("COOKBOOK_STORE_BACKEND", "Memory"),
        ]);
        let config = ClientConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.api.api_token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.search.complex_orderings.len(), 3);
        assert!(config.search.complex_orderings.contains("trending"));
        assert_eq!(config.search.advanced_page_size, 48);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_invalid_numbers() {
        let lookup = lookup_from(&[
            ("COOKBOOK_API_URL", "http://localhost:8000"),
            ("COOKBOOK_ADVANCED_PAGE_SIZE", "0"),
        ]);
        assert!(ClientConfig::from_lookup(&lookup).is_err());

        let lookup = lookup_from(&[
            ("COOKBOOK_API_URL", "http://localhost:8000"),
            ("COOKBOOK_HTTP_TIMEOUT_SECONDS", "soon"),
        ]);
        assert!(ClientConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_unknown_store_backend() {
        let lookup = lookup_from(&[
            ("COOKBOOK_API_URL", "http://localhost:8000"),
            ("COOKBOOK_STORE_BACKEND", "redis"),
        ]);
        let err = ClientConfig::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("COOKBOOK_STORE_BACKEND"));
    }
}
