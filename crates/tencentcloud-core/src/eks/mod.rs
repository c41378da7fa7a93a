//! Elastic Kubernetes Service clusters (TKE API)

mod cluster;
mod data_source;

pub use cluster::{DnsServer, EksCluster, EksClusterConfig, EksClusterState};
pub use data_source::{EksClusterItem, EksClusters, EksClustersFilter};

use crate::client::{CloudClient, Service};
use crate::error::Result;
use crate::progress::OperationStatus;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const STATUS_INITIALIZING: &str = "Initializing";
pub const STATUS_FAILED: &str = "Failed";
pub const STATUS_TERMINATING: &str = "Terminating";

/// Statuses of a cluster that finished initializing
pub const READY_STATUSES: &[&str] = &["Running", "Idling"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DnsServerConf {
    pub domain: String,
    pub dns_servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClusterInfo {
    pub cluster_id: String,
    pub cluster_name: String,
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    #[serde(rename = "K8SVersion")]
    pub k8s_version: String,
    pub status: String,
    pub cluster_desc: String,
    pub created_time: String,
    pub service_subnet_id: String,
    pub dns_servers: Vec<DnsServerConf>,
    pub need_delete_cbs: bool,
    #[serde(rename = "EnableVpcCoreDNS")]
    pub enable_vpc_core_dns: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateClusterRequest {
    #[serde(rename = "K8SVersion")]
    pub k8s_version: String,
    pub vpc_id: String,
    pub cluster_name: String,
    pub subnet_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<DnsServerConf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_param: Option<String>,
    #[serde(rename = "EnableVpcCoreDNS")]
    pub enable_vpc_core_dns: bool,
}

/// Only the fields that are set are changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateClusterRequest {
    pub cluster_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<Vec<DnsServerConf>>,
    /// `"1"` removes all DNS servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_dns_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_delete_cbs: Option<bool>,
}

impl UpdateClusterRequest {
    pub fn new(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            ..Default::default()
        }
    }

    /// Whether anything besides the id is set
    pub fn has_changes(&self) -> bool {
        *self != Self::new(self.cluster_id.clone())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateClusterResponse {
    cluster_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeClustersResponse {
    #[serde(default)]
    clusters: Vec<ClusterInfo>,
}

/// EKS API facade
#[derive(Debug, Clone)]
pub struct EksService {
    client: CloudClient,
}

impl EksService {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    pub async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<String> {
        let response: CreateClusterResponse = self
            .client
            .call(Service::TKE, "CreateEKSCluster", request)
            .await?;
        Ok(response.cluster_id)
    }

    /// Clusters by id; all clusters of the region when `cluster_ids` is empty
    pub async fn describe_clusters(&self, cluster_ids: &[&str]) -> Result<Vec<ClusterInfo>> {
        let request = if cluster_ids.is_empty() {
            json!({})
        } else {
            json!({ "ClusterIds": cluster_ids })
        };
        let response: DescribeClustersResponse = self
            .client
            .call(Service::TKE, "DescribeEKSClusters", &request)
            .await?;
        Ok(response.clusters)
    }

    pub async fn describe_cluster(&self, cluster_id: &str) -> Result<Option<ClusterInfo>> {
        let clusters = self.describe_clusters(&[cluster_id]).await?;
        Ok(clusters.into_iter().find(|c| c.cluster_id == cluster_id))
    }

    /// Creation progress: `Initializing` is running, `Running`/`Idling` done,
    /// `Failed` terminal, anything else illegal
    pub async fn creation_status(&self, cluster_id: &str) -> Result<OperationStatus> {
        Ok(match self.describe_cluster(cluster_id).await? {
            None => OperationStatus::Running,
            Some(c) if c.status == STATUS_INITIALIZING => OperationStatus::Running,
            Some(c) if c.status == STATUS_FAILED => {
                OperationStatus::Fail(format!("cluster {cluster_id} failed to initialize"))
            }
            Some(c) if READY_STATUSES.contains(&c.status.as_str()) => OperationStatus::Success,
            Some(c) => OperationStatus::Unknown(c.status),
        })
    }

    /// Whether the cluster is still shutting down
    pub async fn is_terminating(&self, cluster_id: &str) -> Result<bool> {
        let cluster = self.describe_cluster(cluster_id).await?;
        Ok(cluster.is_some_and(|c| c.status == STATUS_TERMINATING))
    }

    pub async fn update_cluster(&self, request: &UpdateClusterRequest) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(Service::TKE, "UpdateEKSCluster", request)
            .await?;
        Ok(())
    }

    pub async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::TKE,
                "DeleteEKSCluster",
                &json!({ "ClusterId": cluster_id }),
            )
            .await?;
        Ok(())
    }
}
