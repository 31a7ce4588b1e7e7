// Local client - current conditions straight from a device on the LAN
use crate::domain::conversion::{Reading, UnitConverter};
use crate::domain::entities::LocalSensor;
use crate::domain::quantity::ConversionError;
use crate::domain::sensor_data::{SensorDataCollection, SensorDataset};
use crate::domain::units::UnitSystem;
use crate::error::{Error, Result};
use crate::infrastructure::local_api_v1::{LOCAL_RECORD_TYPES, LocalApiV1};
use crate::infrastructure::transport::{ReqwestTransport, Transport};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Keys that describe the sensor rather than a reading
const META_KEYS: [&str; 3] = ["lsid", "data_structure_type", "txid"];

pub struct LocalClient {
    api: LocalApiV1,
    converter: UnitConverter,
}

impl LocalClient {
    pub fn new(host: impl Into<String>, station_units: UnitSystem, desired_units: UnitSystem) -> Self {
        Self::with_transport(
            host,
            Arc::new(ReqwestTransport::new()),
            UnitConverter::new(station_units, desired_units),
        )
    }

    pub fn with_transport(
        host: impl Into<String>,
        transport: Arc<dyn Transport>,
        converter: UnitConverter,
    ) -> Self {
        Self {
            api: LocalApiV1::new(host, transport),
            converter,
        }
    }

    pub fn api(&self) -> &LocalApiV1 {
        &self.api
    }

    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    pub fn unit_for(&self, field: &str) -> Option<&str> {
        self.converter.unit_for(field)
    }

    pub fn desired_unit_for(&self, field: &str) -> Option<&str> {
        self.converter.desired_unit_for(field)
    }

    pub fn attach(&self, field: &str, value: Value) -> Reading {
        self.converter.attach(field, value)
    }

    pub fn convert(&self, field: &str, reading: Reading) -> std::result::Result<Reading, ConversionError> {
        self.converter.convert(field, reading)
    }

    pub async fn current_conditions(&self) -> Result<SensorDataCollection> {
        let mut data = self.api.current_conditions().await?;
        let Some(Value::Array(conditions)) = data.get_mut("conditions").map(Value::take) else {
            return Err(Error::UnexpectedResponse("missing conditions array".to_string()));
        };

        let now = chrono::Utc::now().timestamp();
        conditions
            .into_iter()
            .map(|c| match c {
                Value::Object(map) => SensorDataset::from_group(
                    transform_like_api_v2(map, now),
                    &LOCAL_RECORD_TYPES,
                    &self.converter,
                ),
                other => Err(Error::UnexpectedResponse(format!(
                    "conditions entry is not an object: {other}"
                ))),
            })
            .collect()
    }
}

/// Reshape a local `conditions` entry into the cloud layout: meta keys stay at
/// group level, everything else becomes a single record stamped `ts`
pub fn transform_like_api_v2(conditions: Map<String, Value>, timestamp: i64) -> Map<String, Value> {
    let mut group = Map::new();
    let mut record = Map::new();
    record.insert("ts".to_string(), json!(timestamp));

    for (key, value) in conditions {
        if META_KEYS.contains(&key.as_str()) {
            group.insert(key, value);
        } else {
            record.insert(key, value);
        }
    }

    group.insert("data".to_string(), Value::Array(vec![Value::Object(record)]));
    group
}

impl LocalSensor {
    /// Client for the device behind this sensor
    pub fn client(&self, station_units: UnitSystem, desired_units: UnitSystem) -> LocalClient {
        LocalClient::new(self.host.clone(), station_units, desired_units)
    }
}
