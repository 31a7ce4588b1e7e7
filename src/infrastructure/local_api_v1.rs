// Local API v1: unsigned requests to a device on the LAN
use crate::domain::record_type::{Classification, RecordCatalog, RecordType, SystemType};
use crate::error::{Error, Result};
use crate::infrastructure::api_v2::encode_query;
use crate::infrastructure::transport::Transport;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

static LOCAL_API: SystemType = SystemType { name: "Local API" };

static LOCAL_TYPES: [RecordType; 5] = [
    RecordType {
        id: 1,
        system: &LOCAL_API,
        name: "ISS Record",
        classification: Classification::CurrentConditions,
    },
    RecordType {
        id: 2,
        system: &LOCAL_API,
        name: "Leaf/Soil Moisture Record",
        classification: Classification::CurrentConditions,
    },
    RecordType {
        id: 3,
        system: &LOCAL_API,
        name: "LSS Barometric Pressure Record",
        classification: Classification::CurrentConditions,
    },
    RecordType {
        id: 4,
        system: &LOCAL_API,
        name: "LSS Temperature/Humidity Record",
        classification: Classification::CurrentConditions,
    },
    RecordType {
        id: 6,
        system: &LOCAL_API,
        name: "AirLink Record",
        classification: Classification::CurrentConditions,
    },
];

pub static LOCAL_RECORD_TYPES: Lazy<RecordCatalog> =
    Lazy::new(|| RecordCatalog::new("local", &LOCAL_TYPES));

/// Every local response is wrapped as `{"error": ..., "data": ...}`
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    data: Value,
}

#[derive(Clone)]
pub struct LocalApiV1 {
    host: String,
    transport: Arc<dyn Transport>,
}

impl LocalApiV1 {
    pub fn new(host: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            host: host.into(),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_uri(&self) -> String {
        format!("http://{}/v1", self.host)
    }

    pub fn record_type(id: u32) -> Option<&'static RecordType> {
        LOCAL_RECORD_TYPES.record_type(id)
    }

    pub async fn current_conditions(&self) -> Result<Value> {
        self.request("current_conditions", &[], &[]).await
    }

    /// Unwraps the envelope: a non-null `error` fails the request, otherwise `data` is returned as is
    pub async fn request(
        &self,
        path: &str,
        path_params: &[(&str, String)],
        query_params: &[(String, String)],
    ) -> Result<Value> {
        let uri = self.request_uri(path, path_params, query_params);

        tracing::debug!("GET {}", uri);
        let response = self.transport.get(&uri).await?;
        let envelope: Envelope = serde_json::from_str(&response.body)?;

        match envelope.error {
            None | Some(Value::Null) => Ok(envelope.data),
            Some(Value::String(message)) => Err(Error::LocalApiRequest(message)),
            Some(other) => Err(Error::LocalApiRequest(other.to_string())),
        }
    }

    pub fn request_uri(
        &self,
        path: &str,
        path_params: &[(&str, String)],
        query_params: &[(String, String)],
    ) -> String {
        let mut uri = format!("{}/{}", self.base_uri(), path);
        for (_, value) in path_params {
            uri.push('/');
            uri.push_str(value);
        }

        if query_params.is_empty() {
            uri
        } else {
            format!("{}?{}", uri, encode_query(query_params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::MockTransport;
    use serde_json::json;

    fn local_api(body: &str) -> LocalApiV1 {
        let transport = MockTransport::new().route("/v1/", body);
        LocalApiV1::new("192.168.1.50", Arc::new(transport))
    }

    #[test]
    fn test_request_uri() {
        let api = local_api("{}");
        assert_eq!(
            api.request_uri("current_conditions", &[], &[]),
            "http://192.168.1.50/v1/current_conditions"
        );
        assert_eq!(
            api.request_uri(
                "real_time",
                &[("duration", "60".to_string())],
                &[("format".to_string(), "json".to_string())]
            ),
            "http://192.168.1.50/v1/real_time/60?format=json"
        );
    }

    #[tokio::test]
    async fn test_error_envelope_fails_with_message() {
        let api = local_api(r#"{"error": "boom", "data": null}"#);
        let err = api.current_conditions().await.unwrap_err();
        match err {
            Error::LocalApiRequest(message) => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_success_envelope_returns_data() {
        let api = local_api(r#"{"error": null, "data": {"x": 1}}"#);
        assert_eq!(api.current_conditions().await.unwrap(), json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_structured_error_is_stringified() {
        let api = local_api(r#"{"error": {"code": 409}, "data": null}"#);
        let err = api.current_conditions().await.unwrap_err();
        assert!(matches!(err, Error::LocalApiRequest(m) if m.contains("409")));
    }

    #[test]
    fn test_local_catalog_is_independent() {
        for id in [1, 2, 3, 4, 6] {
            let record = LocalApiV1::record_type(id).unwrap();
            assert!(record.is_current_conditions());
            assert_eq!(record.system.name, "Local API");
        }
        assert_eq!(LocalApiV1::record_type(5), None);

        // Same id, different meaning in the cloud catalog
        let cloud = crate::infrastructure::api_v2::ApiV2::record_type(1).unwrap();
        let local = LocalApiV1::record_type(1).unwrap();
        assert_ne!(cloud, local);
        assert_eq!(local.description(), "Local API - ISS Record");
    }
}
