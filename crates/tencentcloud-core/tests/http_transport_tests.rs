//! HTTP transport tests against a mock Tencent Cloud endpoint

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tencentcloud_core::client::{ClientProfile, Credential, HttpTransport};
use tencentcloud_core::resource::lookup_resource;
use tencentcloud_core::{CloudClient, CoreError, Provider, Service, Timeouts};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> CloudClient {
    let credential =
        Credential::new("AKIDtest", "secret").with_token(token.map(|t| t.to_string()));
    let profile = ClientProfile {
        endpoint: Some(server.uri()),
        request_timeout: Duration::from_secs(5),
        ..ClientProfile::default()
    };
    let transport = HttpTransport::new(credential, profile).unwrap();
    CloudClient::new(Arc::new(transport), "ap-guangzhou")
}

fn fast_timeouts() -> Timeouts {
    Timeouts {
        read: Duration::from_secs(2),
        write: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(20),
        ..Timeouts::default()
    }
}

fn ok(response: Value) -> ResponseTemplate {
    let mut body = response;
    body["RequestId"] = json!("req-test");
    ResponseTemplate::new(200).set_body_json(json!({ "Response": body }))
}

fn api_error(code: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Response": {
            "Error": {"Code": code, "Message": "mocked"},
            "RequestId": "req-err",
        }
    }))
}

fn header_value<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_request_carries_protocol_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-TC-Action", "DescribeCfsFileSystems"))
        .and(header("X-TC-Version", "2019-07-19"))
        .and(header("X-TC-Region", "ap-guangzhou"))
        .and(header("X-TC-Token", "session"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .and(header_exists("X-TC-Timestamp"))
        .and(body_json(json!({"FileSystemId": "cfs-1"})))
        .respond_with(ok(json!({"TotalCount": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let response: Value = client(&server, Some("session"))
        .call(Service::CFS, "DescribeCfsFileSystems", &json!({"FileSystemId": "cfs-1"}))
        .await
        .unwrap();
    assert_eq!(response["TotalCount"], 0);
    assert_eq!(response["RequestId"], "req-test");

    let requests = server.received_requests().await.unwrap();
    let authorization = header_value(&requests[0], "Authorization");
    assert!(authorization.starts_with("TC3-HMAC-SHA256 Credential=AKIDtest/"));
    assert!(authorization.contains("/cfs/tc3_request, SignedHeaders=content-type;host, Signature="));
    let signature = authorization.rsplit('=').next().unwrap();
    assert_eq!(signature.len(), 64);
}

#[tokio::test]
async fn test_api_error_maps_to_sdk_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(api_error("InvalidParameterValue.ZoneNotFound"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .call::<_, Value>(Service::CFS, "CreateCfsFileSystem", &json!({}))
        .await
        .unwrap_err();

    let sdk = err.sdk_error().unwrap();
    assert_eq!(sdk.code, "InvalidParameterValue.ZoneNotFound");
    assert_eq!(sdk.request_id, "req-err");
    assert!(err.is_bad_request());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_http_status_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .call::<_, Value>(Service::TKE, "DescribeEKSClusters", &json!({}))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .call::<_, Value>(Service::CFS, "DescribeCfsFileSystems", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.sdk_error().unwrap().code, "ClientError.ParseJsonError");
}

#[tokio::test]
async fn test_file_system_lifecycle_over_http() {
    let server = MockServer::start().await;
    let described = |state: &str| {
        ok(json!({"FileSystems": [{
            "FileSystemId": "cfs-1",
            "FsName": "shared",
            "Zone": "ap-guangzhou-3",
            "LifeCycleState": state,
            "Protocol": "NFS",
            "StorageType": "SD",
            "PGroup": {"PGroupId": "pgroup-1"},
        }], "TotalCount": 1}))
    };

    Mock::given(header("X-TC-Action", "CreateCfsFileSystem"))
        .respond_with(ok(json!({"FileSystemId": "cfs-1"})))
        .expect(1)
        .mount(&server)
        .await;
    // first a throttled describe, then one still creating
    Mock::given(header("X-TC-Action", "DescribeCfsFileSystems"))
        .respond_with(api_error("RequestLimitExceeded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(header("X-TC-Action", "DescribeCfsFileSystems"))
        .respond_with(described("creating"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(header("X-TC-Action", "DescribeCfsFileSystems"))
        .respond_with(described("available"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    // gone once deleted
    Mock::given(header("X-TC-Action", "DescribeCfsFileSystems"))
        .respond_with(ok(json!({"FileSystems": [], "TotalCount": 0})))
        .mount(&server)
        .await;
    Mock::given(header("X-TC-Action", "DescribeMountTargets"))
        .respond_with(ok(json!({"MountTargets": [{
            "IpAddress": "10.0.0.8",
            "FSID": "abcd",
            "VpcId": "vpc-1",
            "SubnetId": "subnet-1",
        }]})))
        .mount(&server)
        .await;
    Mock::given(header("X-TC-Action", "DeleteCfsFileSystem"))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Provider::new(client(&server, None)).with_timeouts(fast_timeouts());
    let resource = lookup_resource("tencentcloud_cfs_file_system").unwrap();
    let data = resource
        .create(
            &provider,
            json!({
                "name": "shared",
                "availability_zone": "ap-guangzhou-3",
                "access_group_id": "pgroup-1",
                "vpc_id": "vpc-1",
                "subnet_id": "subnet-1",
            }),
        )
        .await
        .unwrap();

    assert_eq!(data.id, "cfs-1");
    let state = data.state.clone().unwrap();
    assert_eq!(state["status"], "available");
    assert_eq!(state["mount_ip"], "10.0.0.8");

    resource.delete(&provider, data).await.unwrap();
}

#[tokio::test]
async fn test_not_found_on_refresh_clears_state() {
    let server = MockServer::start().await;
    Mock::given(header("X-TC-Action", "DescribeEKSClusters"))
        .respond_with(api_error("ResourceNotFound"))
        .mount(&server)
        .await;

    let provider = Provider::new(client(&server, None)).with_timeouts(fast_timeouts());
    let resource = lookup_resource("tencentcloud_eks_cluster").unwrap();
    let data = serde_json::from_value(json!({
        "id": "cls-1",
        "config": {
            "cluster_name": "web",
            "k8s_version": "1.18.4",
            "vpc_id": "vpc-1",
            "subnet_ids": ["subnet-1"],
        },
    }))
    .unwrap();

    assert!(resource.refresh(&provider, data).await.unwrap().is_none());
}

#[tokio::test]
async fn test_retry_disabled_surfaces_first_error() {
    let server = MockServer::start().await;
    Mock::given(header("X-TC-Action", "DescribeProjectInfo"))
        .respond_with(api_error("InternalError"))
        .expect(1)
        .mount(&server)
        .await;

    let timeouts = Timeouts {
        retry_enabled: false,
        ..fast_timeouts()
    };
    let provider = Provider::new(client(&server, None)).with_timeouts(timeouts);
    let resource = lookup_resource("tencentcloud_bi_project").unwrap();
    let data = serde_json::from_value(json!({
        "id": "11",
        "config": {"name": "sales", "color_code": "#7BD936"},
    }))
    .unwrap();

    let err = resource.refresh(&provider, data).await.unwrap_err();
    match err.root() {
        CoreError::RetryExhausted { last, .. } => assert!(last.is_retryable()),
        other => panic!("unexpected error: {other}"),
    }
}
