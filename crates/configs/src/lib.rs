use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downstreams: DownstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

/// Named downstream endpoints, resolved once at startup and injected into the
/// services that call them. Handlers never look service addresses up from the
/// ambient environment.
#[derive(Debug, Clone, Deserialize)]
pub struct DownstreamConfig {
    pub experience_service_url: String,
    pub review_service_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_side_fetch_timeout")]
    pub side_fetch_timeout_secs: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            experience_service_url: "http://localhost:3002".into(),
            review_service_url: "http://localhost:3004".into(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            side_fetch_timeout_secs: default_side_fetch_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 10 }
fn default_side_fetch_timeout() -> u64 { 10 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`/`config.toml`, falling back to defaults when
    /// no file is present, then overlay env vars and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.downstreams.normalize_from_env();
        self.downstreams.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
    }
}

impl DownstreamConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("EXPERIENCE_SERVICE_URL") {
            self.experience_service_url = url;
        }
        if let Ok(url) = std::env::var("REVIEW_SERVICE_URL") {
            self.review_service_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("downstreams.experience_service_url", &self.experience_service_url),
            ("downstreams.review_service_url", &self.review_service_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("downstreams.request_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn side_fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.side_fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_services() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.downstreams.experience_service_url, "http://localhost:3002");
        assert_eq!(cfg.downstreams.review_service_url, "http://localhost:3004");
        assert_eq!(cfg.downstreams.request_timeout_secs, 10);
    }

    #[test]
    fn parses_toml_with_partial_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [downstreams]
            experience_service_url = "http://exp:3002"
            review_service_url = "http://rev:3004"
            request_timeout_secs = 8
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.downstreams.request_timeout_secs, 8);
        // untouched fields keep their defaults
        assert_eq!(cfg.downstreams.connect_timeout_secs, 5);
    }

    #[test]
    fn rejects_non_http_downstream() {
        let mut cfg = AppConfig::default();
        cfg.downstreams.review_service_url = "ftp://rev".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
