use serde::de::DeserializeOwned;

use crate::RelayError;

/// Parse a yaml configuration file into a struct
pub fn parse_config_file<T: DeserializeOwned>(location: &str) -> Result<T, RelayError> {
    let file = std::fs::File::open(location)
        .map_err(|err| RelayError::Config(format!("failed to open {location}: {err}")))?;
    let config: T = serde_yaml::from_reader(file)?;
    Ok(config)
}

#[cfg(test)]
mod test {
    use crate::config::{LogFormat, RelayProperties};

    use super::parse_config_file;

    #[test]
    fn test_parse_config_file() {
        let location = concat!(env!("CARGO_MANIFEST_DIR"), "/config/config.yaml");
        let config: RelayProperties = parse_config_file(location).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log.level, "DEBUG");
        assert!(matches!(config.log.format, LogFormat::Compact));
    }

    #[test]
    fn test_parse_missing_config_file() {
        let result: Result<RelayProperties, _> = parse_config_file("./does/not/exist.yaml");
        assert!(result.is_err());
    }
}
