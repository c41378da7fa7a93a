//! `tencentcloud_eks_clusters`

use super::DnsServer;
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::DataSource;
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EksClustersFilter {
    pub cluster_id: Option<String>,
    pub cluster_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EksClusterItem {
    pub cluster_id: String,
    pub cluster_name: String,
    pub k8s_version: String,
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub cluster_desc: String,
    pub service_subnet_id: String,
    pub dns_servers: Vec<DnsServer>,
    pub enable_vpc_core_dns: bool,
    pub need_delete_cbs: bool,
    pub status: String,
    pub created_time: String,
}

pub struct EksClusters;

#[async_trait]
impl DataSource for EksClusters {
    const TYPE_NAME: &'static str = "tencentcloud_eks_clusters";

    type Filter = EksClustersFilter;
    type Item = EksClusterItem;

    async fn read(&self, provider: &Provider, filter: &Self::Filter) -> Result<Vec<Self::Item>> {
        let eks = &provider.eks();
        let ids: Vec<&str> = filter.cluster_id.as_deref().into_iter().collect();
        let clusters = retry_call(provider.timeouts().read_policy(), || {
            eks.describe_clusters(&ids)
        })
        .await?;

        Ok(clusters
            .into_iter()
            .filter(|c| {
                filter
                    .cluster_name
                    .as_ref()
                    .is_none_or(|name| &c.cluster_name == name)
            })
            .map(|c| EksClusterItem {
                cluster_id: c.cluster_id,
                cluster_name: c.cluster_name,
                k8s_version: c.k8s_version,
                vpc_id: c.vpc_id,
                subnet_ids: c.subnet_ids,
                cluster_desc: c.cluster_desc,
                service_subnet_id: c.service_subnet_id,
                dns_servers: c.dns_servers.into_iter().map(Into::into).collect(),
                enable_vpc_core_dns: c.enable_vpc_core_dns,
                need_delete_cbs: c.need_delete_cbs,
                status: c.status,
                created_time: c.created_time,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CloudClient;
    use crate::client::stub::StubTransport;
    use crate::resource::lookup_data_source;
    use serde_json::json;

    #[tokio::test]
    async fn test_filter_by_name_through_registry() {
        let stub = StubTransport::new();
        stub.ok(
            "DescribeEKSClusters",
            json!({"Clusters": [
                {"ClusterId": "cls-1", "ClusterName": "web", "Status": "Running"},
                {"ClusterId": "cls-2", "ClusterName": "batch", "Status": "Running"},
            ]}),
        );
        let provider = Provider::new(CloudClient::new(stub.clone(), "ap-guangzhou"));

        let source = lookup_data_source("tencentcloud_eks_clusters").unwrap();
        let result = source
            .read(&provider, json!({"cluster_name": "batch"}), None)
            .await
            .unwrap();

        assert_eq!(result.as_array().unwrap().len(), 1);
        assert_eq!(result[0]["cluster_id"], "cls-2");
        assert_eq!(stub.last_payload("DescribeEKSClusters").unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_filter_by_id() {
        let stub = StubTransport::new();
        stub.ok(
            "DescribeEKSClusters",
            json!({"Clusters": [{"ClusterId": "cls-1", "ClusterName": "web"}]}),
        );
        let provider = Provider::new(CloudClient::new(stub.clone(), "ap-guangzhou"));
        let filter = EksClustersFilter {
            cluster_id: Some("cls-1".into()),
            ..Default::default()
        };

        let items = EksClusters.read(&provider, &filter).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            stub.last_payload("DescribeEKSClusters").unwrap(),
            json!({"ClusterIds": ["cls-1"]})
        );
    }
}
