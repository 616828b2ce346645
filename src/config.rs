use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: \"{value}\"")]
    InvalidVar { var: &'static str, value: String },
}

/// SMTP relay settings. Everything except the port is required; missing
/// values fail at startup, not on the first send.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// From mailbox, either `addr@host` or `Name <addr@host>`.
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            bind_addr: optional("BIND_ADDR", "127.0.0.1"),
            port: port_var("PORT", 3000)?,
            smtp: SmtpConfig {
                host: required("SMTP_HOST")?,
                port: port_var("SMTP_PORT", 465)?,
                user: required("SMTP_USER")?,
                password: required("SMTP_PASSWORD")?,
                from: required("SMTP_FROM")?,
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn optional(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn port_var(var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
    }
}
