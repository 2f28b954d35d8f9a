use std::env;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LANG: &str = "en";

/// Environment-driven client configuration; CLI flags override it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub lang: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("PLENUM_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let lang = env::var("PLENUM_LANG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        Self { api_url, lang }
    }

    pub fn new(api_url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            lang: lang.into(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_LANG)
    }
}
