// Cloud client - memoized station/node/sensor lists and classified readings
use crate::domain::conversion::{Reading, UnitConverter};
use crate::domain::entities::{Device, LocalSensor, Node, Sensor, Station};
use crate::domain::quantity::ConversionError;
use crate::domain::sensor_data::{SensorDataCollection, SensorDataset};
use crate::domain::units::UnitSystem;
use crate::error::{Error, Result};
use crate::infrastructure::api_v2::{ApiV2, CLOUD_RECORD_TYPES};
use crate::infrastructure::config::Settings;
use crate::infrastructure::signer::RequestSigner;
use crate::infrastructure::transport::{ReqwestTransport, Transport};
use crate::application::local_client::LocalClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

pub struct Client {
    api: ApiV2,
    converter: UnitConverter,
    stations: OnceCell<Vec<Station>>,
    nodes: OnceCell<Vec<Node>>,
    sensors: OnceCell<Vec<Sensor>>,
    local_clients: Mutex<HashMap<String, Arc<LocalClient>>>,
}

impl Client {
    /// Fails immediately if the key or secret is missing
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        station_units: UnitSystem,
        desired_units: UnitSystem,
    ) -> Result<Self> {
        let signer = RequestSigner::new(api_key, api_secret)?;
        Ok(Self::with_api(
            ApiV2::new(signer, Arc::new(ReqwestTransport::new())),
            UnitConverter::new(station_units, desired_units),
        ))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let signer = RequestSigner::new(settings.api_key.clone(), settings.api_secret.clone())?;
        let transport = match settings.timeout_secs {
            Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))?,
            None => ReqwestTransport::new(),
        };
        let api = ApiV2::new(signer, Arc::new(transport)).with_base_uri(settings.base_uri.clone());

        Ok(Self::with_api(
            api,
            UnitConverter::new(settings.station_units.clone(), settings.desired_units.clone()),
        ))
    }

    pub fn with_api(api: ApiV2, converter: UnitConverter) -> Self {
        Self {
            api,
            converter,
            stations: OnceCell::new(),
            nodes: OnceCell::new(),
            sensors: OnceCell::new(),
            local_clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_transport(
        signer: RequestSigner,
        transport: Arc<dyn Transport>,
        converter: UnitConverter,
    ) -> Self {
        Self::with_api(ApiV2::new(signer, transport), converter)
    }

    pub fn api(&self) -> &ApiV2 {
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

    /// All stations, fetched once per client
    pub async fn stations(&self) -> Result<&[Station]> {
        self.stations
            .get_or_try_init(|| async {
                tracing::debug!("Fetching stations");
                decode_list(self.api.stations(&[]).await?, "stations")
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn station(&self) -> Result<Option<&Station>> {
        Ok(self.stations().await?.first())
    }

    pub async fn station_by_gateway_id_hex(&self, gateway_id_hex: &str) -> Result<Option<&Station>> {
        Ok(self
            .stations()
            .await?
            .iter()
            .find(|s| s.gateway_id_hex.as_deref() == Some(gateway_id_hex)))
    }

    pub async fn nodes(&self) -> Result<&[Node]> {
        self.nodes
            .get_or_try_init(|| async {
                tracing::debug!("Fetching nodes");
                decode_list(self.api.nodes(&[]).await?, "nodes")
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn node_by_device_id_hex(&self, device_id_hex: &str) -> Result<Option<&Node>> {
        Ok(self
            .nodes()
            .await?
            .iter()
            .find(|n| n.device_id_hex.as_deref() == Some(device_id_hex)))
    }

    pub async fn sensors(&self) -> Result<&[Sensor]> {
        self.sensors
            .get_or_try_init(|| async {
                tracing::debug!("Fetching sensors");
                decode_list(self.api.sensors(&[]).await?, "sensors")
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn sensor_by_lsid(&self, lsid: i64) -> Result<Option<&Sensor>> {
        Ok(self.sensors().await?.iter().find(|s| s.lsid == lsid))
    }

    /// Sensor that produced `dataset`
    pub async fn sensor_for(&self, dataset: &SensorDataset) -> Result<Option<&Sensor>> {
        match dataset.lsid() {
            Some(lsid) => self.sensor_by_lsid(lsid).await,
            None => Ok(None),
        }
    }

    pub async fn sensors_for_station(&self, station: &Station) -> Result<Vec<&Sensor>> {
        Ok(self
            .sensors()
            .await?
            .iter()
            .filter(|s| s.station_id == Some(station.station_id))
            .collect())
    }

    pub async fn current(&self, station_id: i64) -> Result<SensorDataCollection> {
        let body = self.api.current(station_id).await?;
        self.collect_datasets(body)
    }

    pub async fn last_seconds(&self, station_id: i64, seconds: i64) -> Result<SensorDataCollection> {
        let body = self.api.last_seconds(station_id, seconds).await?;
        self.collect_datasets(body)
    }

    pub async fn last_hour(&self, station_id: i64) -> Result<SensorDataCollection> {
        self.last_seconds(station_id, 3600).await
    }

    pub async fn last_day(&self, station_id: i64) -> Result<SensorDataCollection> {
        self.last_seconds(station_id, 86_400).await
    }

    /// Devices of this station that report an address on the local network
    pub async fn local_sensors(&self, station: &Station) -> Result<Vec<LocalSensor>> {
        let health = self.current(station.station_id).await?.health();

        let mut local = Vec::new();
        for dataset in health.iter().filter(|d| d.contains("ip_v4_address")) {
            let Some(host) = ip_address(dataset) else {
                continue;
            };

            let device = match dataset.lsid() {
                Some(lsid) => self.parent_device(lsid).await?,
                None => None,
            };
            local.push(LocalSensor { device, host });
        }

        tracing::debug!("Station {} has {} local sensors", station.station_id, local.len());
        Ok(local)
    }

    /// One client per host, sharing this client's transport and units
    pub fn local_client(&self, sensor: &LocalSensor) -> Arc<LocalClient> {
        let mut clients = self.local_clients.lock().unwrap_or_else(PoisonError::into_inner);
        clients
            .entry(sensor.host.clone())
            .or_insert_with(|| {
                Arc::new(LocalClient::with_transport(
                    sensor.host.clone(),
                    self.api.transport(),
                    self.converter.clone(),
                ))
            })
            .clone()
    }

    pub async fn local_current_conditions(&self, sensor: &LocalSensor) -> Result<SensorDataCollection> {
        self.local_client(sensor).current_conditions().await
    }

    async fn parent_device(&self, lsid: i64) -> Result<Option<Device>> {
        let Some(device_id_hex) = self
            .sensor_by_lsid(lsid)
            .await?
            .and_then(|s| s.parent_device_id_hex.clone())
        else {
            return Ok(None);
        };

        if let Some(node) = self.node_by_device_id_hex(&device_id_hex).await? {
            return Ok(Some(Device::Node(node.clone())));
        }
        Ok(self
            .station_by_gateway_id_hex(&device_id_hex)
            .await?
            .map(|s| Device::Station(s.clone())))
    }

    fn collect_datasets(&self, mut body: Value) -> Result<SensorDataCollection> {
        let Some(Value::Array(groups)) = body.get_mut("sensors").map(Value::take) else {
            return Err(Error::UnexpectedResponse("missing sensors array".to_string()));
        };

        groups
            .into_iter()
            .map(|group| match group {
                Value::Object(map) => {
                    SensorDataset::from_group(map, &CLOUD_RECORD_TYPES, &self.converter)
                }
                other => Err(Error::UnexpectedResponse(format!(
                    "sensor group is not an object: {other}"
                ))),
            })
            .collect()
    }
}

fn ip_address(dataset: &SensorDataset) -> Option<String> {
    let value = dataset
        .first_record()
        .and_then(|r| r.get("ip_v4_address"))
        .and_then(Reading::as_raw)
        .or_else(|| dataset.raw("ip_v4_address"))?;
    value.as_str().map(str::to_string)
}

/// Decode `body[key]` as a list, skipping null entries
fn decode_list<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<Vec<T>> {
    let list = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| Error::UnexpectedResponse(format!("missing {key} list")))?;
    let items: Vec<Option<T>> = serde_json::from_value(list)?;
    Ok(items.into_iter().flatten().collect())
}
