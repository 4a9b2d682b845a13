use crate::error::{Result, ResultExt};
use error_chain::bail;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PATH: &str = "data/config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  pub web: WebConfig,
  #[serde(default)]
  pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub bind_addr: String,
  #[serde(default = "default_max_payload_size")]
  pub max_payload_size: usize,
  #[serde(default = "default_static_dir")]
  pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
  pub root_url: String,
  pub secret_key: String,
}

/// Artificial latencies standing in for the missing backend.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
  pub auth_latency_ms: u64,
  pub reply_delay_ms: u64,
}

impl Default for DemoConfig {
  fn default() -> Self {
    DemoConfig {
      auth_latency_ms: 1000,
      reply_delay_ms: 1500,
    }
  }
}

impl DemoConfig {
  pub fn auth_latency(&self) -> Duration {
    Duration::from_millis(self.auth_latency_ms)
  }

  pub fn reply_delay(&self) -> Duration {
    Duration::from_millis(self.reply_delay_ms)
  }
}

fn default_max_payload_size() -> usize {
  262_144
}

fn default_static_dir() -> String {
  "./data/static".into()
}

pub fn path() -> String {
  std::env::var("CRIMEGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string())
}

pub fn load() -> Result<Config> {
  let path = path();
  let file = std::fs::read_to_string(&path).chain_err(|| format!("Unable to load \"{}\"", path))?;
  parse(&file).chain_err(|| format!("Unable to parse \"{}\"", path))
}

pub fn parse(file: &str) -> Result<Config> {
  let config: Config = toml::from_str(file)?;
  // cookie signing key
  if config.web.secret_key.len() < 64 {
    bail!("web.secret_key must be at least 64 bytes long");
  }
  Ok(config)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
  Config {
    server: ServerConfig {
      bind_addr: "127.0.0.1:0".into(),
      max_payload_size: default_max_payload_size(),
      static_dir: default_static_dir(),
    },
    web: WebConfig {
      root_url: "/".into(),
      secret_key: "k".repeat(64),
    },
    demo: DemoConfig {
      auth_latency_ms: 0,
      reply_delay_ms: 20,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_config_with_default_demo_section() {
    let config = parse(&format!(
      r#"
        [server]
        bind_addr = "127.0.0.1:8080"

        [web]
        root_url = "/"
        secret_key = "{}"
      "#,
      "x".repeat(64)
    ))
    .unwrap();

    assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.server.static_dir, "./data/static");
    assert_eq!(config.demo.auth_latency(), Duration::from_millis(1000));
    assert_eq!(config.demo.reply_delay(), Duration::from_millis(1500));
  }

  #[test]
  fn rejects_short_secret_key() {
    let res = parse(
      r#"
        [server]
        bind_addr = "127.0.0.1:8080"

        [web]
        root_url = "/"
        secret_key = "short"
      "#,
    );
    assert!(res.is_err());
  }

  #[test]
  fn shipped_config_parses() {
    let file = include_str!("../data/config.toml");
    let config = parse(file).unwrap();
    assert_eq!(config.web.root_url, "/");
  }
}
