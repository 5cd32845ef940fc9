//! Configuration loading

use crate::Config;
use faultline_core::{Error, Result};
use std::fs;
use std::path::Path;

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml` / `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Determine format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "unsupported config extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

/// Load configuration from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read config file: {e}")))?;

    let format = ConfigFormat::from_path(path)?;

    load_from_str(&content, format)
}

/// Load configuration from a string
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Config> {
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse YAML: {e}")))?,
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse TOML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse JSON: {e}")))?,
    };

    Ok(config)
}

/// Load and validate configuration from a file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = load_from_file(path)?;

    crate::validator::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML_CONFIG: &str = r#"
server:
  listen: "127.0.0.1:8000"
  api_prefix: "/api"

endpoints:
  - method: POST
    route: /a
    response_status: 201
    response_body: "OK"
  - method: GET
    route: /a
    response_status: 200
    response_body: "A"
  - method: GET
    route: /chain
    targets:
      - method: GET
        url: "http://localhost:9001/api/a"
      - method: GET
        url: "http://localhost:9002/api/b"

faults:
  base_jitter: "5ms"

metrics:
  latency_histogram_buckets: [0.01, 0.1, 1.0]
"#;

    #[test]
    fn test_load_yaml() {
        let config = load_from_str(YAML_CONFIG, ConfigFormat::Yaml).unwrap();

        assert_eq!(config.endpoints.len(), 3);
        assert_eq!(config.endpoints[0].response_status, Some(201));
        assert_eq!(
            config.endpoints[2].targets.as_ref().unwrap().len(),
            2
        );
        assert_eq!(config.metrics.latency_histogram_buckets.len(), 3);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = load_from_str("endpoints: [bad", ConfigFormat::Yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("faultline.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("faultline.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("faultline.ini")).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(YAML_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.endpoints.len(), 3);
    }

    #[test]
    fn test_load_config_rejects_invalid_endpoint() {
        let yaml = r#"
endpoints:
  - method: GET
    route: /a
    response_status: 9999
"#;
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("response_status"));
    }
}
