use serde::{Deserialize, Serialize};

use crate::{parse_config_file, CliFields, RelayError};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RelayProperties {
    pub host: String,
    pub port: u16,
    /// Setting for logging
    pub log: LogProperties,
}

impl RelayProperties {
    /// Loads the configuration file, if one is given, and applies the
    /// command line overrides.
    pub fn new(cli_fields: &CliFields) -> Result<Self, RelayError> {
        let mut config = match &cli_fields.config_file {
            Some(path) => parse_config_file(path)?,
            None => RelayProperties::default(),
        };

        if let Some(port) = cli_fields.port {
            config.port = port;
        }
        if let Some(level) = &cli_fields.log_level {
            config.log.level = level.clone();
        }

        Ok(config)
    }

    /// Returns the address to listen on.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogProperties {
    /// Log verbosity level of the default filtering logic, which is
    /// yao_relay=<level>,yao_common=<level>
    /// Must be either of <https://docs.rs/tracing/latest/tracing/struct.Level.html#implementations>
    pub level: String,
    /// Custom filtering logic, overrides `level`
    pub filter: Option<String>,
    /// Log format. Available options are "COMPACT" and "JSON"
    pub format: LogFormat,
}

impl Default for RelayProperties {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log: LogProperties::default(),
        }
    }
}

impl Default for LogProperties {
    fn default() -> Self {
        Self {
            level: "DEBUG".to_string(),
            filter: None,
            format: LogFormat::Compact,
        }
    }
}

impl std::fmt::Display for RelayProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "host: {}", self.host)?;
        writeln!(f, "port: {}", self.port)?;
        write!(f, "log: \n{}", self.log)
    }
}

impl std::fmt::Display for LogProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "   level: {}", self.level)?;
        writeln!(f, "   filter: {:?}", self.filter)?;
        write!(f, "   format: {:?}", self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli_fields = CliFields {
            config_file: None,
            port: Some(4000),
            log_level: Some("INFO".to_string()),
        };

        let config = RelayProperties::new(&cli_fields).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        assert_eq!(config.log.level, "INFO");
        assert_eq!(config.addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_defaults() {
        let config = RelayProperties::new(&CliFields::default()).unwrap();

        assert_eq!(config.port, 3000);
        assert!(config.log.filter.is_none());
        assert!(matches!(config.log.format, LogFormat::Compact));
    }

    #[test]
    fn test_log_properties_from_yaml() {
        let log: LogProperties =
            serde_yaml::from_str("level: INFO\nfilter: yao_relay=trace\nformat: JSON\n").unwrap();

        assert_eq!(log.level, "INFO");
        assert_eq!(log.filter.as_deref(), Some("yao_relay=trace"));
        assert!(matches!(log.format, LogFormat::Json));
    }
}
