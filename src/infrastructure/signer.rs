// HMAC-SHA256 request signing for the cloud API
use crate::error::SigningConfigurationError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_PARAM: &str = "t";
pub const API_KEY_PARAM: &str = "api-key";
pub const SIGNATURE_PARAM: &str = "api-signature";

#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
    api_secret: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, SigningConfigurationError> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.trim().is_empty() {
            return Err(SigningConfigurationError::MissingApiKey);
        }
        if api_secret.trim().is_empty() {
            return Err(SigningConfigurationError::MissingApiSecret);
        }

        Ok(Self { api_key, api_secret })
    }

    /// Build the signed query: the endpoint's query params plus `t`, `api-key`
    /// and `api-signature`. Path params bound to `None` are dropped; the rest
    /// take part in the signature but are not emitted as query params.
    pub fn sign(
        &self,
        path_params: &[(&str, Option<String>)],
        query_params: &[(&str, String)],
        timestamp: i64,
    ) -> Vec<(String, String)> {
        let mut request_params: Vec<(String, String)> = query_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        request_params.push((TIMESTAMP_PARAM.to_string(), timestamp.to_string()));
        request_params.push((API_KEY_PARAM.to_string(), self.api_key.clone()));

        let used_path_params = path_params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)));
        let signed = request_params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let signature = self.signature(used_path_params.chain(signed));

        request_params.push((SIGNATURE_PARAM.to_string(), signature));
        request_params
    }

    /// Hex HMAC-SHA256 of the canonical form of `params`
    pub fn signature<'a>(&self, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        let mut mac = match HmacSha256::new_from_slice(self.api_secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(canonicalize(params).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Sort by key and concatenate `key` + `value` with no delimiter.
/// A later duplicate key replaces an earlier one.
pub fn canonicalize<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    params
        .into_iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(k, v)| format!("{k}{v}"))
        .collect()
}
