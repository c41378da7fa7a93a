//! `tencentcloud_dc_gateway`

use super::CreateGatewayRequest;
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcGatewayConfig {
    pub name: String,
    /// `VPC` or `CCN`
    pub network_type: String,
    pub network_instance_id: String,
    /// `NORMAL` or `NAT`; only VPC gateways may be `NAT`
    #[serde(default = "default_gateway_type")]
    pub gateway_type: String,
}

fn default_gateway_type() -> String {
    "NORMAL".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcGatewayState {
    pub name: String,
    pub network_type: String,
    pub network_instance_id: String,
    pub gateway_type: String,
    pub ccn_route_type: String,
    pub enable_bgp: bool,
    pub create_time: String,
}

pub struct DcGateway;

#[async_trait]
impl Resource for DcGateway {
    const TYPE_NAME: &'static str = "tencentcloud_dc_gateway";
    const IMMUTABLE: &'static [&'static str] =
        &["network_type", "network_instance_id", "gateway_type"];

    type Config = DcGatewayConfig;
    type State = DcGatewayState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let dc = &provider.dc();
        let request = CreateGatewayRequest {
            direct_connect_gateway_name: config.name.clone(),
            network_type: config.network_type.clone(),
            network_instance_id: config.network_instance_id.clone(),
            gateway_type: config.gateway_type.clone(),
        };
        let gateway = retry_call(provider.timeouts().write_policy(), || {
            dc.create_gateway(&request)
        })
        .await?;
        Ok(gateway.direct_connect_gateway_id)
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let dc = &provider.dc();
        let gateway = or_absent(
            retry_call(provider.timeouts().read_policy(), || dc.describe_gateway(id)).await,
        )?;

        Ok(gateway.map(|g| DcGatewayState {
            name: g.direct_connect_gateway_name,
            network_type: g.network_type,
            network_instance_id: g.network_instance_id,
            gateway_type: g.gateway_type,
            ccn_route_type: g.ccn_route_type,
            enable_bgp: g.enable_bgp,
            create_time: g.create_time,
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        if old.name == new.name {
            return Ok(());
        }
        let dc = &provider.dc();
        retry_call(provider.timeouts().write_policy(), || {
            dc.modify_gateway_name(id, &new.name)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let dc = &provider.dc();
        retry_call(provider.timeouts().write_policy(), || dc.delete_gateway(id)).await
    }
}
