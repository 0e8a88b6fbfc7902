use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Payment logs and votes.json live here
    pub storage_dir: PathBuf,

    // Rolling app.log files
    pub log_dir: PathBuf,

    pub whitelist: WhitelistConfig,
}

/// Static IP allow-list consulted before every request when enabled.
#[derive(Debug, Clone, Default)]
pub struct WhitelistConfig {
    pub enabled: bool,
    pub addresses: HashSet<IpAddr>,
}

impl WhitelistConfig {
    pub fn allows(&self, addr: IpAddr) -> bool {
        !self.enabled || self.addresses.contains(&addr)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid PORT")?,

            storage_dir: std::env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "payments".to_string())
                .into(),
            log_dir: std::env::var("LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),

            whitelist: WhitelistConfig {
                enabled: Self::parse_flag(
                    &std::env::var("WHITELIST_ENABLED").unwrap_or_else(|_| "false".to_string()),
                )
                .context("Invalid WHITELIST_ENABLED")?,
                addresses: Self::parse_addresses(
                    &std::env::var("WHITELIST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                )
                .context("Invalid WHITELIST")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_flag(value: &str) -> Result<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => bail!("Expected a boolean, got {}", other),
        }
    }

    fn parse_addresses(value: &str) -> Result<HashSet<IpAddr>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpAddr>()
                    .with_context(|| format!("Invalid IP address: {}", s))
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.storage_dir.as_os_str().is_empty() {
            bail!("STORAGE_DIR must not be empty");
        }
        if self.log_dir.as_os_str().is_empty() {
            bail!("LOG_DIR must not be empty");
        }

        if self.whitelist.enabled && self.whitelist.addresses.is_empty() {
            bail!("WHITELIST_ENABLED is set but WHITELIST has no addresses");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(Config::parse_flag("true").unwrap());
        assert!(Config::parse_flag(" TRUE ").unwrap());
        assert!(Config::parse_flag("1").unwrap());
        assert!(!Config::parse_flag("false").unwrap());
        assert!(!Config::parse_flag("").unwrap());
        assert!(Config::parse_flag("maybe").is_err());
    }

    #[test]
    fn test_parse_addresses() {
        let set = Config::parse_addresses("127.0.0.1, ::1,,10.0.0.2").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&"::1".parse::<IpAddr>().unwrap()));
        assert!(Config::parse_addresses("127.0.0.1,localhost").is_err());
    }

    #[test]
    fn test_whitelist_allows() {
        let local: IpAddr = "127.0.0.1".parse().unwrap();
        let remote: IpAddr = "203.0.113.9".parse().unwrap();

        let disabled = WhitelistConfig::default();
        assert!(disabled.allows(remote));

        let enabled = WhitelistConfig {
            enabled: true,
            addresses: [local].into_iter().collect(),
        };
        assert!(enabled.allows(local));
        assert!(!enabled.allows(remote));
    }
}
