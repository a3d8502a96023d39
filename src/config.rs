use serde::Deserialize;

pub const DEFAULT_SOLAR_API_BASE_URL: &str = "https://solar.googleapis.com";
pub const DEFAULT_REQUIRED_QUALITY: &str = "HIGH";

const SUPPORTED_QUALITIES: [&str; 4] = ["HIGH", "MEDIUM", "LOW", "BASE"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Missing key is reported per request (HTTP 500), not at startup.
    pub google_solar_api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub solar_api_base_url: String,
    pub required_quality: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            google_solar_api_key: non_empty("GOOGLE_SOLAR_API_KEY")
                .or_else(|| non_empty("GOOGLE_API_KEY")),
            webhook_url: non_empty("WEBHOOK_URL")
                .map(|url| validate_http_url("WEBHOOK_URL", url))
                .transpose()?,
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|raw| parse_allowed_origins(&raw))
                .unwrap_or_default(),
            solar_api_base_url: non_empty("SOLAR_API_BASE_URL")
                .map(|url| validate_http_url("SOLAR_API_BASE_URL", url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_SOLAR_API_BASE_URL.to_string()),
            required_quality: non_empty("SOLAR_REQUIRED_QUALITY")
                .map(|q| q.trim().to_uppercase())
                .map(|q| {
                    if !SUPPORTED_QUALITIES.contains(&q.as_str()) {
                        anyhow::bail!(
                            "SOLAR_REQUIRED_QUALITY must be one of {}",
                            SUPPORTED_QUALITIES.join(", ")
                        );
                    }
                    Ok(q)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_REQUIRED_QUALITY.to_string()),
        };

        // Never log the credential itself
        if config.google_solar_api_key.is_none() {
            tracing::warn!(
                "GOOGLE_SOLAR_API_KEY not set, lead submissions will fail with HTTP 500"
            );
        }
        match config.webhook_url {
            Some(ref url) => tracing::info!("Webhook URL configured: {}", url),
            None => tracing::warn!("WEBHOOK_URL not set, results will not be forwarded"),
        }
        tracing::debug!("Solar API base URL: {}", config.solar_api_base_url);
        tracing::debug!("Required imagery quality: {}", config.required_quality);
        tracing::debug!("Allowed origins: {:?}", config.allowed_origins);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn validate_http_url(key: &str, raw: String) -> anyhow::Result<String> {
    let url = raw.trim().trim_end_matches('/').to_string();
    let parsed = url::Url::parse(&url)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url)
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.google_solar_api_key.is_none());
        assert!(config.webhook_url.is_none());
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.solar_api_base_url, DEFAULT_SOLAR_API_BASE_URL);
        assert_eq!(config.required_quality, "HIGH");
    }

    #[test]
    fn test_api_key_alias_and_blank_values() {
        let config = load(&[("GOOGLE_SOLAR_API_KEY", "  "), ("GOOGLE_API_KEY", "abc")]).unwrap();
        assert_eq!(config.google_solar_api_key.as_deref(), Some("abc"));

        let config = load(&[("WEBHOOK_URL", "")]).unwrap();
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("PORT", "not-a-port")]).is_err());
        assert!(load(&[("WEBHOOK_URL", "ftp://hooks.example.com")]).is_err());
        assert!(load(&[("WEBHOOK_URL", "hooks.example.com")]).is_err());
        assert!(load(&[("SOLAR_REQUIRED_QUALITY", "ULTRA")]).is_err());
    }

    #[test]
    fn test_quality_is_normalized() {
        let config = load(&[("SOLAR_REQUIRED_QUALITY", " medium ")]).unwrap();
        assert_eq!(config.required_quality, "MEDIUM");
    }

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://a.com/, ,http://localhost:5173");
        assert_eq!(origins, vec!["https://a.com", "http://localhost:5173"]);
        assert!(parse_allowed_origins("").is_empty());
    }
}
