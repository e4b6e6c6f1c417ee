//! Runtime configuration for the HTTP service.
//!
//! Read from environment variables (`MCP_SETTINGS_HOST`,
//! `MCP_SETTINGS_PORT`) with command-line overrides (`--host`, `--port`).

use anyhow::{bail, Context, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Build the config from environment variables and process arguments.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("MCP_SETTINGS_HOST") {
            if !host.trim().is_empty() {
                config.host = host;
            }
        }
        if let Ok(port) = std::env::var("MCP_SETTINGS_PORT") {
            config.port = parse_port(&port)?;
        }

        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    fn apply_args(&mut self, mut args: impl Iterator<Item = String>) -> Result<()> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--port" | "-p" => {
                    let value = args.next().context("--port requires a value")?;
                    self.port = parse_port(&value)?;
                }
                "--host" => {
                    self.host = args.next().context("--host requires a value")?;
                }
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(())
    }
}

/// Ports below 1024 need elevated privileges; refuse them up front.
fn parse_port(value: &str) -> Result<u16> {
    let port: u16 = value
        .parse()
        .with_context(|| format!("invalid port: {value}"))?;
    if port < 1024 {
        bail!("port must be between 1024 and 65535");
    }
    Ok(port)
}
