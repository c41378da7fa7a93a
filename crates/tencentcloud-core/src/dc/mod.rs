//! Direct Connect gateways
//!
//! All calls are synchronous; nothing here needs polling.

mod data_source;
mod gateway;

pub use data_source::{DcGatewayItem, DcGateways, DcGatewaysFilter};
pub use gateway::{DcGateway, DcGatewayConfig, DcGatewayState};

use crate::client::{CloudClient, Service};
use crate::error::Result;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GatewayInfo {
    pub direct_connect_gateway_id: String,
    pub direct_connect_gateway_name: String,
    pub network_type: String,
    pub network_instance_id: String,
    pub gateway_type: String,
    pub direct_connect_gateway_ip: String,
    pub ccn_route_type: String,
    #[serde(rename = "EnableBGP")]
    pub enable_bgp: bool,
    pub create_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGatewayRequest {
    pub direct_connect_gateway_name: String,
    pub network_type: String,
    pub network_instance_id: String,
    pub gateway_type: String,
}

/// Query for `DescribeDirectConnectGateways`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayQuery {
    pub gateway_ids: Vec<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateGatewayResponse {
    direct_connect_gateway: GatewayInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeGatewaysResponse {
    #[serde(default)]
    direct_connect_gateway_set: Vec<GatewayInfo>,
    #[serde(default)]
    total_count: u64,
}

/// Direct Connect gateway API facade
#[derive(Debug, Clone)]
pub struct DcService {
    client: CloudClient,
}

impl DcService {
    pub const PAGE_SIZE: u64 = 100;

    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    pub async fn create_gateway(&self, request: &CreateGatewayRequest) -> Result<GatewayInfo> {
        let response: CreateGatewayResponse = self
            .client
            .call(Service::VPC, "CreateDirectConnectGateway", request)
            .await?;
        Ok(response.direct_connect_gateway)
    }

    /// All gateways matching the query, walking pages
    pub async fn describe_gateways(&self, query: &GatewayQuery) -> Result<Vec<GatewayInfo>> {
        let mut gateways = Vec::new();
        let mut offset = 0;
        loop {
            let mut request = json!({ "Offset": offset, "Limit": Self::PAGE_SIZE });
            if !query.gateway_ids.is_empty() {
                request["DirectConnectGatewayIds"] = json!(query.gateway_ids);
            }
            if let Some(name) = &query.name {
                request["Filters"] = json!([
                    { "Name": "direct-connect-gateway-name", "Values": [name] }
                ]);
            }

            let response: DescribeGatewaysResponse = self
                .client
                .call(Service::VPC, "DescribeDirectConnectGateways", &request)
                .await?;
            let page_len = response.direct_connect_gateway_set.len() as u64;
            gateways.extend(response.direct_connect_gateway_set);
            if page_len < Self::PAGE_SIZE || gateways.len() as u64 >= response.total_count {
                return Ok(gateways);
            }
            offset += Self::PAGE_SIZE;
        }
    }

    pub async fn describe_gateway(&self, gateway_id: &str) -> Result<Option<GatewayInfo>> {
        let query = GatewayQuery {
            gateway_ids: vec![gateway_id.to_string()],
            ..Default::default()
        };
        let gateways = self.describe_gateways(&query).await?;
        Ok(gateways
            .into_iter()
            .find(|g| g.direct_connect_gateway_id == gateway_id))
    }

    pub async fn modify_gateway_name(&self, gateway_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::VPC,
                "ModifyDirectConnectGatewayAttribute",
                &json!({
                    "DirectConnectGatewayId": gateway_id,
                    "DirectConnectGatewayName": name,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_gateway(&self, gateway_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::VPC,
                "DeleteDirectConnectGateway",
                &json!({ "DirectConnectGatewayId": gateway_id }),
            )
            .await?;
        Ok(())
    }
}
