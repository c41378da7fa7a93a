//! `tencentcloud_dc_gateways`

use super::GatewayQuery;
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::DataSource;
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DcGatewaysFilter {
    pub dcg_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcGatewayItem {
    pub dcg_id: String,
    pub name: String,
    pub dcg_ip: String,
    pub network_type: String,
    pub network_instance_id: String,
    pub gateway_type: String,
    pub ccn_route_type: String,
    pub enable_bgp: bool,
    pub create_time: String,
}

pub struct DcGateways;

#[async_trait]
impl DataSource for DcGateways {
    const TYPE_NAME: &'static str = "tencentcloud_dc_gateways";

    type Filter = DcGatewaysFilter;
    type Item = DcGatewayItem;

    async fn read(&self, provider: &Provider, filter: &Self::Filter) -> Result<Vec<Self::Item>> {
        let dc = &provider.dc();
        let query = GatewayQuery {
            gateway_ids: filter.dcg_id.iter().cloned().collect(),
            name: filter.name.clone(),
        };
        let gateways = retry_call(provider.timeouts().read_policy(), || {
            dc.describe_gateways(&query)
        })
        .await?;

        Ok(gateways
            .into_iter()
            .map(|g| DcGatewayItem {
                dcg_id: g.direct_connect_gateway_id,
                name: g.direct_connect_gateway_name,
                dcg_ip: g.direct_connect_gateway_ip,
                network_type: g.network_type,
                network_instance_id: g.network_instance_id,
                gateway_type: g.gateway_type,
                ccn_route_type: g.ccn_route_type,
                enable_bgp: g.enable_bgp,
                create_time: g.create_time,
            })
            .collect())
    }
}
