use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{error::ApiError, Api, Params};

pub const DEFAULT_BASE_URL: &str = "https://api.vk.com/method/";

#[derive(Deserialize)]
struct Envelope {
    response: Option<Value>,
    error: Option<RemoteError>,
}

#[derive(Deserialize)]
struct RemoteError {
    error_code: i64,
    error_msg: String,
}

/// Blocking client for the `method/<name>` HTTP API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    version: Option<String>,
}

impl HttpApi {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            version: None,
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    #[must_use]
    pub fn version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    fn decode(data: &str) -> Result<Value, ApiError> {
        let envelope = serde_json::from_str::<Envelope>(data)?;

        if let Some(err) = envelope.error {
            return Err(ApiError::Remote {
                code: err.error_code,
                message: err.error_msg,
            });
        }

        envelope.response.ok_or(ApiError::InvalidServerResponse)
    }
}

impl Api for HttpApi {
    fn request(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, method);
        debug!("API call {} {:?}", method, params);

        let mut req = self.client.get(url).query(params);
        if let Some(token) = &self.access_token {
            req = req.query(&[("access_token", token)]);
        }
        if let Some(v) = &self.version {
            req = req.query(&[("v", v)]);
        }

        let body = req.send()?.error_for_status()?.text()?;
        Self::decode(&body)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::HttpApi;
    use crate::api::error::ApiError;

    #[test]
    fn unwraps_response_envelope() {
        let value = HttpApi::decode(r#"{"response": [3, {"pid": 1}]}"#).unwrap();
        assert_eq!(value, json!([3, {"pid": 1}]));
    }

    #[test]
    fn maps_error_object() {
        let err = HttpApi::decode(
            r#"{"error": {"error_code": 15, "error_msg": "Access denied"}}"#,
        )
        .unwrap_err();

        assert!(matches!(err, ApiError::Remote { code: 15, ref message } if message == "Access denied"));
    }

    #[test]
    fn rejects_empty_envelope() {
        assert!(matches!(
            HttpApi::decode("{}"),
            Err(ApiError::InvalidServerResponse)
        ));
        assert!(matches!(
            HttpApi::decode("not json"),
            Err(ApiError::JsonSerializeFail(_))
        ));
    }
}
