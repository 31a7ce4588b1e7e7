use crate::domain::units::{IMPERIAL, METRIC, UnitSystem};
use crate::infrastructure::api_v2::BASE_URI;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    #[serde(default = "default_station_units")]
    pub station_units: UnitSystem,
    #[serde(default = "default_desired_units")]
    pub desired_units: UnitSystem,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default, deserialize_with = "host_list")]
    pub local_hosts: Vec<String>,
}

fn default_base_uri() -> String {
    BASE_URI.to_string()
}

fn default_station_units() -> UnitSystem {
    IMPERIAL
}

fn default_desired_units() -> UnitSystem {
    METRIC
}

/// Accepts a list or a comma-joined string, as environment variables arrive
fn host_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hosts {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Hosts::deserialize(deserializer)? {
        Hosts::List(hosts) => hosts,
        Hosts::Joined(hosts) => hosts
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Load `config/weatherlink.*` (optional) overlaid with `WEATHERLINK_*` environment variables
pub fn load_settings() -> Result<Settings, config::ConfigError> {
    load_settings_from("config/weatherlink")
}

pub fn load_settings_from(path: &str) -> Result<Settings, config::ConfigError> {
    load(path, None)
}

// Values stay strings: credentials such as `00712345` must not be read as numbers
fn load(
    path: &str,
    env: Option<config::Map<String, String>>,
) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("WEATHERLINK").source(env))
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantity::QuantityKind;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(r#"api_key = "k""#);
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.api_secret, "");
        assert_eq!(settings.base_uri, BASE_URI);
        assert_eq!(settings.station_units, IMPERIAL);
        assert_eq!(settings.desired_units, METRIC);
        assert!(settings.local_hosts.is_empty());
    }

    #[test]
    fn test_unit_presets_and_overrides() {
        let settings = parse(
            r#"
            station_units = "metric"
            local_hosts = ["10.0.0.5"]

            [desired_units]
            temperature = "K"
            rain_quantity = "mm"
            "#,
        );

        assert_eq!(settings.station_units, METRIC);
        assert_eq!(settings.desired_units.fetch(QuantityKind::Temperature), Some("K"));
        assert_eq!(settings.desired_units.fetch(QuantityKind::RainQuantity), Some("mm"));
        assert_eq!(settings.desired_units.fetch(QuantityKind::Pressure), None);
        assert_eq!(settings.local_hosts, ["10.0.0.5"]);
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_env_credentials_are_kept_verbatim() {
        let settings = load(
            "config/does-not-exist",
            env(&[
                ("WEATHERLINK_API_KEY", "00712345"),
                ("WEATHERLINK_API_SECRET", "1e3"),
                ("WEATHERLINK_TIMEOUT_SECS", "10"),
                ("WEATHERLINK_LOCAL_HOSTS", "10.0.0.5, 10.0.0.6"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.api_key, "00712345");
        assert_eq!(settings.api_secret, "1e3");
        assert_eq!(settings.timeout_secs, Some(10));
        assert_eq!(settings.local_hosts, ["10.0.0.5", "10.0.0.6"]);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let settings = load_settings_from("config/does-not-exist").unwrap();
        assert_eq!(settings.base_uri, BASE_URI);
    }
}
