//! Tencent Cloud API client
//!
//! [`CloudClient`] is the one place requests leave the process. It is cheap to
//! clone and shared by every service facade. The wire work is delegated to an
//! [`ApiTransport`]; [`HttpTransport`] is the production implementation.

mod http;
mod ratelimit;
mod signer;
#[cfg(test)]
pub(crate) mod stub;

pub use http::{ClientProfile, HttpTransport};
pub use ratelimit::RateLimiter;
pub use signer::{Credential, SigningInput, authorization};

use crate::error::{CoreError, Result, SdkError};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// A cloud service endpoint and the API version spoken with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Service {
    pub name: &'static str,
    pub version: &'static str,
}

impl Service {
    pub const CFS: Service = Service::new("cfs", "2019-07-19");
    pub const SQLSERVER: Service = Service::new("sqlserver", "2018-03-28");
    pub const POSTGRES: Service = Service::new("postgres", "2017-03-12");
    /// Direct Connect gateways are managed through the VPC API
    pub const VPC: Service = Service::new("vpc", "2017-03-12");
    pub const TKE: Service = Service::new("tke", "2018-05-25");
    pub const BI: Service = Service::new("bi", "2022-01-05");

    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }
}

/// One API call, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: Service,
    pub action: String,
    pub region: String,
    pub payload: Value,
}

/// Sends one request and returns the `Response` object of the reply
///
/// Implementations map every failure, including transport failures, to an
/// [`SdkError`] with a classifiable code.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> std::result::Result<Value, SdkError>;
}

/// Shared, cloneable API client
#[derive(Clone)]
pub struct CloudClient {
    transport: Arc<dyn ApiTransport>,
    region: String,
    rate_limiter: Option<RateLimiter>,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("region", &self.region)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

impl CloudClient {
    pub fn new(transport: Arc<dyn ApiTransport>, region: impl Into<String>) -> Self {
        Self {
            transport,
            region: region.into(),
            rate_limiter: None,
        }
    }

    /// Pace requests per action; `None` disables pacing
    pub fn with_rate_limit(mut self, requests_per_second: Option<u32>) -> Self {
        self.rate_limiter = requests_per_second.map(RateLimiter::new);
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Call `action` on `service` and decode the response
    pub async fn call<Req, Resp>(&self, service: Service, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = ApiRequest {
            service,
            action: action.to_string(),
            region: self.region.clone(),
            payload: serde_json::to_value(request)?,
        };

        if let Some(limiter) = &self.rate_limiter {
            limiter.check(action).await;
        }

        match self.transport.send(&request).await {
            Ok(response) => {
                debug!(
                    service = service.name,
                    action,
                    request = %request.payload,
                    response = %response,
                    "API call succeeded"
                );
                serde_json::from_value(response).map_err(|e| {
                    CoreError::Sdk(SdkError::client(
                        SdkError::PARSE_JSON_ERROR,
                        format!("failed to decode {action} response: {e}"),
                    ))
                })
            }
            Err(e) => {
                error!(
                    service = service.name,
                    action,
                    request = %request.payload,
                    error = %e,
                    "API call failed"
                );
                Err(e.into())
            }
        }
    }
}

/// Joins the parts of a composite resource id
pub fn build_id(parts: &[&str]) -> String {
    parts.join(crate::ID_SEPARATOR)
}

/// Splits a composite resource id into exactly `expected` parts
pub fn split_id(id: &str, expected: usize) -> Result<Vec<&str>> {
    let parts: Vec<&str> = id.split(crate::ID_SEPARATOR).collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return Err(CoreError::Validation(format!(
            "id `{id}` must have {expected} parts separated by `{}`",
            crate::ID_SEPARATOR
        )));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::stub::StubTransport;
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Echo {
        total_count: u64,
    }

    #[test]
    fn test_composite_ids() {
        assert_eq!(build_id(&["mssql-1", "orders"]), "mssql-1#orders");
        assert_eq!(split_id("mssql-1#orders", 2).unwrap(), vec!["mssql-1", "orders"]);
        assert!(split_id("mssql-1", 2).is_err());
        assert!(split_id("mssql-1#", 2).is_err());
        assert!(split_id("a#b#c", 2).is_err());
    }

    #[tokio::test]
    async fn test_call_sends_region_and_payload() {
        let stub = StubTransport::new();
        stub.ok("DescribeDBs", json!({"TotalCount": 3, "RequestId": "r"}));
        let client = CloudClient::new(stub.clone(), "ap-guangzhou");

        let echo: Echo = client
            .call(Service::SQLSERVER, "DescribeDBs", &json!({"InstanceIdSet": ["mssql-1"]}))
            .await
            .unwrap();

        assert_eq!(echo.total_count, 3);
        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].region, "ap-guangzhou");
        assert_eq!(calls[0].service, Service::SQLSERVER);
        assert_eq!(calls[0].payload["InstanceIdSet"][0], "mssql-1");
    }

    #[tokio::test]
    async fn test_undecodable_response_is_parse_error() {
        let stub = StubTransport::new();
        stub.ok("DescribeDBs", json!({"TotalCount": "many"}));
        let client = CloudClient::new(stub, "ap-guangzhou");

        let err = client
            .call::<_, Echo>(Service::SQLSERVER, "DescribeDBs", &json!({}))
            .await
            .unwrap_err();
        assert!(err.has_code(&[SdkError::PARSE_JSON_ERROR]));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_sdk_errors_pass_through() {
        let stub = StubTransport::new();
        stub.err("DeleteDB", "ResourceNotFound.InstanceNotFound");
        let client = CloudClient::new(stub, "ap-guangzhou");

        let err = client
            .call::<_, Value>(Service::SQLSERVER, "DeleteDB", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
