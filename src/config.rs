use std::{fs, path::Path, str::FromStr};

use serde::Deserialize;

use crate::compliance::ComplianceMode;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Server {
    pub listen_ip: String,
    pub port: u16,
    pub log_level: LogLevel,
    pub cookie_compliance: ComplianceMode,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            listen_ip: "127.0.0.1".into(),
            port: 8080,
            log_level: LogLevel::Info,
            cookie_compliance: ComplianceMode::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: Server,
}

// What the YAML file looks like. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    listen_ip: Option<String>,
    port: Option<u16>,
    log_level: Option<String>,
    cookie_compliance: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    server: Option<RawServer>,
}

impl Config {
    pub fn from_str(config_str: impl AsRef<str>) -> Result<Self, String> {
        let mut config = Config::default();

        if config_str.as_ref().trim().is_empty() {
            return Ok(config);
        }

        let raw: RawConfig = serde_yaml::from_str(config_str.as_ref())
            .map_err(|e| format!("malformed config: {}", e))?;

        let server = match raw.server {
            Some(server) => server,
            None => return Ok(config),
        };

        if let Some(listen_ip) = server.listen_ip {
            config.server.listen_ip = listen_ip;
        }

        if let Some(port) = server.port {
            config.server.port = port;
        }

        if let Some(log_level) = server.log_level {
            config.server.log_level = match log_level.to_lowercase().as_str() {
                "debug" => LogLevel::Debug,
                "info" => LogLevel::Info,
                "warn" => LogLevel::Warn,
                "error" => LogLevel::Error,
                _ => return Err(format!("unknown log level: {}", log_level)),
            };
        }

        if let Some(mode) = server.cookie_compliance {
            config.server.cookie_compliance =
                ComplianceMode::from_str(&mode).map_err(|e| e.to_string())?;
        }

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
        Config::from_str(contents)
    }
}
