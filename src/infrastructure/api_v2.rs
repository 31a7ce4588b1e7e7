// Cloud API v2: signed requests and the cloud record catalog
use crate::domain::record_type::{Classification, RecordCatalog, RecordType, SystemType};
use crate::error::Result;
use crate::infrastructure::signer::RequestSigner;
use crate::infrastructure::transport::Transport;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;

pub const BASE_URI: &str = "https://api.weatherlink.com/v2";

static LEGACY: SystemType = SystemType { name: "Legacy" };
static ENVIRO_MONITOR: SystemType = SystemType { name: "EnviroMonitor" };
static WEATHERLINK_LIVE: SystemType = SystemType { name: "WeatherLink Live" };
static AIRLINK: SystemType = SystemType { name: "AirLink" };

const fn record(
    id: u32,
    system: &'static SystemType,
    name: &'static str,
    classification: Classification,
) -> RecordType {
    RecordType {
        id,
        system,
        name,
        classification,
    }
}

static CLOUD_TYPES: [RecordType; 18] = [
    record(1, &LEGACY, "Current Conditions Record - Revision A", Classification::CurrentConditions),
    record(2, &LEGACY, "Current Conditions Record - Revision B", Classification::CurrentConditions),
    record(3, &LEGACY, "Archive Record - Revision A", Classification::Archive),
    record(4, &LEGACY, "Archive Record - Revision B", Classification::Archive),
    record(5, &LEGACY, "High/Low Record (deprecated)", Classification::HighLow),
    record(6, &ENVIRO_MONITOR, "ISS Current Conditions Record", Classification::CurrentConditions),
    record(7, &ENVIRO_MONITOR, "ISS Archive Record", Classification::Archive),
    // Upstream files the deprecated ISS high/low record with the archive records
    record(8, &ENVIRO_MONITOR, "ISS High/Low Record (deprecated)", Classification::Archive),
    record(9, &ENVIRO_MONITOR, "non-ISS Record", Classification::Unknown),
    record(10, &WEATHERLINK_LIVE, "ISS Current Conditions Record", Classification::CurrentConditions),
    record(11, &WEATHERLINK_LIVE, "ISS Archive Record", Classification::Archive),
    record(12, &WEATHERLINK_LIVE, "non-ISS Current Conditions Record", Classification::CurrentConditions),
    record(13, &WEATHERLINK_LIVE, "non-ISS Archive Record", Classification::Archive),
    record(14, &ENVIRO_MONITOR, "Health Record", Classification::Health),
    record(15, &WEATHERLINK_LIVE, "Health Record", Classification::Health),
    record(16, &AIRLINK, "Current Conditions Record", Classification::CurrentConditions),
    record(17, &AIRLINK, "Archive Record", Classification::Archive),
    record(18, &AIRLINK, "Health Record", Classification::Health),
];

pub static CLOUD_RECORD_TYPES: Lazy<RecordCatalog> =
    Lazy::new(|| RecordCatalog::new("cloud", &CLOUD_TYPES));

/// Path param bound to an optional list of ids
fn optional_ids(ids: &[i64]) -> Option<String> {
    if ids.is_empty() {
        None
    } else {
        Some(ids.iter().map(i64::to_string).collect::<Vec<_>>().join(","))
    }
}

pub(crate) fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Clone)]
pub struct ApiV2 {
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
    base_uri: String,
}

impl ApiV2 {
    pub fn new(signer: RequestSigner, transport: Arc<dyn Transport>) -> Self {
        Self {
            signer,
            transport,
            base_uri: BASE_URI.to_string(),
        }
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub fn record_type(id: u32) -> Option<&'static RecordType> {
        CLOUD_RECORD_TYPES.record_type(id)
    }

    pub async fn sensor_catalog(&self) -> Result<Value> {
        self.request("sensor-catalog", &[], &[]).await
    }

    pub async fn stations(&self, ids: &[i64]) -> Result<Value> {
        self.request("stations", &[("station-ids", optional_ids(ids))], &[])
            .await
    }

    pub async fn nodes(&self, ids: &[i64]) -> Result<Value> {
        self.request("nodes", &[("node-ids", optional_ids(ids))], &[])
            .await
    }

    pub async fn sensors(&self, ids: &[i64]) -> Result<Value> {
        self.request("sensors", &[("sensor-ids", optional_ids(ids))], &[])
            .await
    }

    pub async fn sensor_activity(&self, ids: &[i64]) -> Result<Value> {
        self.request("sensor-activity", &[("sensor-ids", optional_ids(ids))], &[])
            .await
    }

    pub async fn current(&self, station_id: i64) -> Result<Value> {
        self.request("current", &[("station-id", Some(station_id.to_string()))], &[])
            .await
    }

    pub async fn historic(&self, station_id: i64, start_timestamp: i64, end_timestamp: i64) -> Result<Value> {
        self.request(
            "historic",
            &[("station-id", Some(station_id.to_string()))],
            &[
                ("start-timestamp", start_timestamp.to_string()),
                ("end-timestamp", end_timestamp.to_string()),
            ],
        )
        .await
    }

    pub async fn last_seconds(&self, station_id: i64, seconds: i64) -> Result<Value> {
        let now = chrono::Utc::now().timestamp();
        self.historic(station_id, now - seconds, now).await
    }

    pub async fn last_hour(&self, station_id: i64) -> Result<Value> {
        self.last_seconds(station_id, 3600).await
    }

    pub async fn last_day(&self, station_id: i64) -> Result<Value> {
        self.last_seconds(station_id, 86_400).await
    }

    pub async fn request(
        &self,
        path: &str,
        path_params: &[(&str, Option<String>)],
        query_params: &[(&str, String)],
    ) -> Result<Value> {
        let timestamp = chrono::Utc::now().timestamp();
        let uri = self.request_uri(path, path_params, query_params, timestamp);

        tracing::debug!("GET {}/{}", self.base_uri, path);
        let response = self.transport.get(&uri).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// `BASE/<path>[/<path-param values>]?<query + t + api-key + api-signature>`
    pub fn request_uri(
        &self,
        path: &str,
        path_params: &[(&str, Option<String>)],
        query_params: &[(&str, String)],
        timestamp: i64,
    ) -> String {
        let query = self.signer.sign(path_params, query_params, timestamp);

        let mut uri = format!("{}/{}", self.base_uri, path);
        for value in path_params.iter().filter_map(|(_, v)| v.as_deref()) {
            uri.push('/');
            uri.push_str(value);
        }

        format!("{}?{}", uri, encode_query(&query))
    }
}
