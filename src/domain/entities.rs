// Station, node and sensor metadata as returned by the cloud API
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// A weather station (gateway device)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    pub station_id: i64,
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub gateway_id_hex: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Station {
    /// Any other field from the API response
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Station station_id={} gateway_id_hex={} ({})",
            self.station_id,
            self.gateway_id_hex.as_deref().unwrap_or("-"),
            self.station_name
        )
    }
}

/// A node attached to a station (EnviroMonitor consoles)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub device_id_hex: Option<String>,
    #[serde(default)]
    pub station_id: Option<i64>,
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Node {
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn description(&self) -> String {
        format!("{} - {}", self.station_name, self.node_name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node device_id_hex={} ({})",
            self.device_id_hex.as_deref().unwrap_or("-"),
            self.description()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sensor {
    pub lsid: i64,
    #[serde(default)]
    pub station_id: Option<i64>,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub parent_device_id_hex: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Sensor {
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn description(&self) -> String {
        format!("{} - {}", self.manufacturer, self.product_name)
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensor lsid={} ({})", self.lsid, self.description())
    }
}

/// The device a locally reachable sensor hangs off
#[derive(Debug, Clone, PartialEq)]
pub enum Device {
    Station(Station),
    Node(Node),
}

/// A sensor whose device answers the local API on `host`
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSensor {
    pub device: Option<Device>,
    pub host: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_known_and_raw_fields() {
        let station: Station = serde_json::from_value(json!({
            "station_id": 1234,
            "station_name": "Backyard",
            "gateway_id_hex": "001D0A71ABCD",
            "time_zone": "America/Chicago"
        }))
        .unwrap();

        assert_eq!(station.station_id, 1234);
        assert_eq!(station.gateway_id_hex.as_deref(), Some("001D0A71ABCD"));
        assert_eq!(station.raw("time_zone"), Some(&json!("America/Chicago")));
        assert_eq!(station.raw("station_name"), None);
        assert_eq!(
            station.to_string(),
            "Station station_id=1234 gateway_id_hex=001D0A71ABCD (Backyard)"
        );
    }

    #[test]
    fn test_sensor_description() {
        let sensor: Sensor = serde_json::from_value(json!({
            "lsid": 7,
            "manufacturer": "Davis Instruments",
            "product_name": "Vantage Pro2",
            "sensor_type": 45
        }))
        .unwrap();

        assert_eq!(sensor.description(), "Davis Instruments - Vantage Pro2");
        assert_eq!(sensor.raw("sensor_type"), Some(&json!(45)));
        assert_eq!(sensor.parent_device_id_hex, None);
    }

    #[test]
    fn test_node_description() {
        let node: Node = serde_json::from_value(json!({
            "device_id_hex": "ABC",
            "station_name": "Farm",
            "node_name": "North field"
        }))
        .unwrap();

        assert_eq!(node.description(), "Farm - North field");
        assert_eq!(node.to_string(), "Node device_id_hex=ABC (Farm - North field)");
    }
}
