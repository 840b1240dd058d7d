use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_file: PathBuf,
    pub secret: String,
    pub items_per_page: u32,
    pub media_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys fall back to defaults;
    /// set but malformed numeric keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("FINCH_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid FINCH_PORT '{}'", v))?,
            None => 8890,
        };

        let items_per_page: u32 = match lookup("FINCH_ITEMS_PER_PAGE") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid FINCH_ITEMS_PER_PAGE '{}'", v))?,
            None => 20,
        };
        if items_per_page == 0 {
            bail!("FINCH_ITEMS_PER_PAGE must be at least 1");
        }

        let base_url = lookup("FINCH_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            db_file: lookup("FINCH_DB_FILE").unwrap_or_else(|| "finch.db".into()).into(),
            secret: lookup("FINCH_SECRET").unwrap_or_else(|| DEV_SECRET.into()),
            items_per_page,
            media_dir: lookup("FINCH_MEDIA_DIR").unwrap_or_else(|| "media".into()).into(),
            host: lookup("FINCH_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.db_file, PathBuf::from("finch.db"));
        assert_eq!(cfg.items_per_page, 20);
        assert_eq!(cfg.port, 8890);
        assert_eq!(cfg.base_url, "http://localhost:8890");
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.addr().unwrap().port(), 8890);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("FINCH_DB_FILE", "/var/lib/finch/finch.db"),
            ("FINCH_SECRET", "s3cret"),
            ("FINCH_ITEMS_PER_PAGE", "5"),
            ("FINCH_PORT", "9000"),
            ("FINCH_HOST", "127.0.0.1"),
            ("FINCH_BASE_URL", "https://finch.example/"),
        ])
        .unwrap();
        assert_eq!(cfg.db_file, PathBuf::from("/var/lib/finch/finch.db"));
        assert_eq!(cfg.items_per_page, 5);
        assert_eq!(cfg.base_url, "https://finch.example");
        assert!(!cfg.uses_dev_secret());
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(config(&[("FINCH_PORT", "http")]).is_err());
        assert!(config(&[("FINCH_ITEMS_PER_PAGE", "-1")]).is_err());
        assert!(config(&[("FINCH_ITEMS_PER_PAGE", "0")]).is_err());
    }
}
