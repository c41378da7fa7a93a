//! HTTPS transport speaking the Tencent Cloud API 3.0 JSON protocol

use super::signer::{self, Credential, SigningInput};
use super::{ApiRequest, ApiTransport};
use crate::error::SdkError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Endpoint settings of a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    /// `https` or `http`
    pub protocol: String,
    /// Domain appended to the service name, e.g. `tencentcloudapi.com`
    pub domain: String,
    /// Full base URL used for every service instead of `{protocol}://{service}.{domain}`
    pub endpoint: Option<String>,
    pub request_timeout: Duration,
}

impl ClientProfile {
    pub const DEFAULT_DOMAIN: &'static str = "tencentcloudapi.com";
    pub const DEFAULT_PROTOCOL: &'static str = "https";

    /// Base URL for a service
    pub fn service_url(&self, service: &str) -> Result<Url, SdkError> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("{}://{}.{}/", self.protocol, service, self.domain),
        };
        Url::parse(&raw).map_err(|e| {
            SdkError::client(SdkError::NETWORK_ERROR, format!("invalid endpoint `{raw}`: {e}"))
        })
    }
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            protocol: Self::DEFAULT_PROTOCOL.to_string(),
            domain: Self::DEFAULT_DOMAIN.to_string(),
            endpoint: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Production [`ApiTransport`] over reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    credential: Credential,
    profile: ClientProfile,
}

impl HttpTransport {
    pub fn new(credential: Credential, profile: ClientProfile) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(profile.request_timeout)
            .user_agent(concat!("tencentcloud-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdkError::client(SdkError::NETWORK_ERROR, e.to_string()))?;
        Ok(Self {
            http,
            credential,
            profile,
        })
    }

    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value, SdkError> {
        let url = self.profile.service_url(request.service.name)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(SdkError::client(
                    SdkError::NETWORK_ERROR,
                    format!("endpoint `{url}` has no host"),
                ));
            }
        };
        let payload = request.payload.to_string();
        let timestamp = chrono::Utc::now().timestamp();
        let authorization = signer::authorization(
            &self.credential,
            &SigningInput {
                service: request.service.name,
                host: &host,
                timestamp,
                payload: &payload,
            },
        );

        let mut builder = self
            .http
            .post(url)
            .header("Authorization", authorization)
            .header("Content-Type", signer::CONTENT_TYPE)
            .header("X-TC-Action", &request.action)
            .header("X-TC-Version", request.service.version)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &request.region);
        if let Some(token) = &self.credential.token {
            builder = builder.header("X-TC-Token", token);
        }

        let response = builder
            .body(payload)
            .send()
            .await
            .map_err(|e| SdkError::client(SdkError::NETWORK_ERROR, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::client(SdkError::NETWORK_ERROR, e.to_string()))?;
        if !status.is_success() {
            return Err(SdkError::client(
                SdkError::HTTP_STATUS_CODE_ERROR,
                format!("{status}: {body}"),
            ));
        }

        parse_response(&body)
    }
}

/// Unwrap the `Response` envelope, turning an embedded `Error` into an [`SdkError`]
pub(crate) fn parse_response(body: &str) -> Result<Value, SdkError> {
    let mut envelope: Value = serde_json::from_str(body)
        .map_err(|e| SdkError::client(SdkError::PARSE_JSON_ERROR, e.to_string()))?;
    let response = envelope
        .get_mut("Response")
        .map(Value::take)
        .filter(Value::is_object)
        .ok_or_else(|| {
            SdkError::client(SdkError::PARSE_JSON_ERROR, "missing `Response` object")
        })?;

    if let Some(error) = response.get("Error") {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let request_id = response
            .get("RequestId")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(SdkError::new(field("Code"), field("Message"), request_id));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_url() {
        let profile = ClientProfile::default();
        assert_eq!(
            profile.service_url("cfs").unwrap().as_str(),
            "https://cfs.tencentcloudapi.com/"
        );

        let profile = ClientProfile {
            endpoint: Some("http://127.0.0.1:9000".into()),
            ..ClientProfile::default()
        };
        assert_eq!(profile.service_url("cfs").unwrap().as_str(), "http://127.0.0.1:9000/");

        let profile = ClientProfile {
            endpoint: Some("not a url".into()),
            ..ClientProfile::default()
        };
        assert!(profile.service_url("cfs").is_err());
    }

    #[test]
    fn test_parse_success() {
        let value = parse_response(r#"{"Response":{"FlowId":12,"RequestId":"abc"}}"#).unwrap();
        assert_eq!(value["FlowId"], 12);
    }

    #[test]
    fn test_parse_error_envelope() {
        let err = parse_response(
            r#"{"Response":{"Error":{"Code":"ResourceNotFound","Message":"gone"},"RequestId":"abc"}}"#,
        )
        .unwrap_err();
        assert_eq!(err, SdkError::new("ResourceNotFound", "gone", "abc"));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_response("<html>").unwrap_err();
        assert_eq!(err.code, SdkError::PARSE_JSON_ERROR);
        let err = parse_response(r#"{"data":1}"#).unwrap_err();
        assert_eq!(err.code, SdkError::PARSE_JSON_ERROR);
    }
}
