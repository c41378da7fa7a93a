//! `tencentcloud_eks_cluster`

use super::{CreateClusterRequest, DnsServerConf, UpdateClusterRequest};
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsServer {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub servers: Vec<String>,
}

impl From<&DnsServer> for DnsServerConf {
    fn from(d: &DnsServer) -> Self {
        DnsServerConf {
            domain: d.domain.clone(),
            dns_servers: d.servers.clone(),
        }
    }
}

impl From<DnsServerConf> for DnsServer {
    fn from(d: DnsServerConf) -> Self {
        DnsServer {
            domain: d.domain,
            servers: d.dns_servers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EksClusterConfig {
    pub cluster_name: String,
    pub k8s_version: String,
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub cluster_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_subnet_id: Option<String>,
    #[serde(default)]
    pub dns_servers: Vec<DnsServer>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_param: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub enable_vpc_core_dns: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_delete_cbs: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EksClusterState {
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

pub struct EksCluster;

#[async_trait]
impl Resource for EksCluster {
    const TYPE_NAME: &'static str = "tencentcloud_eks_cluster";
    const IMMUTABLE: &'static [&'static str] = &[
        "k8s_version",
        "vpc_id",
        "service_subnet_id",
        "extra_param",
        "enable_vpc_core_dns",
    ];

    type Config = EksClusterConfig;
    type State = EksClusterState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let eks = &provider.eks();
        let extra_param = if config.extra_param.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&config.extra_param)?)
        };
        let request = CreateClusterRequest {
            k8s_version: config.k8s_version.clone(),
            vpc_id: config.vpc_id.clone(),
            cluster_name: config.cluster_name.clone(),
            subnet_ids: config.subnet_ids.clone(),
            cluster_desc: Some(config.cluster_desc.clone()).filter(|d| !d.is_empty()),
            service_subnet_id: config.service_subnet_id.clone(),
            dns_servers: config.dns_servers.iter().map(Into::into).collect(),
            extra_param,
            enable_vpc_core_dns: config.enable_vpc_core_dns,
        };

        let id = retry_call(provider.timeouts().write_policy(), || {
            eks.create_cluster(&request)
        })
        .await?;

        provider
            .wait_for(id.as_str(), provider.timeouts().read.saturating_mul(3), |_| {
                eks.creation_status(&id)
            })
            .await?;

        // only settable once the cluster is up
        if let Some(need_delete_cbs) = config.need_delete_cbs {
            let update = UpdateClusterRequest {
                need_delete_cbs: Some(need_delete_cbs),
                ..UpdateClusterRequest::new(id.as_str())
            };
            retry_call(provider.timeouts().write_policy(), || {
                eks.update_cluster(&update)
            })
            .await?;
        }
        Ok(id)
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let eks = &provider.eks();
        let cluster = or_absent(
            retry_call(provider.timeouts().read_policy(), || eks.describe_cluster(id)).await,
        )?;

        Ok(cluster.map(|c| EksClusterState {
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
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        let mut request = UpdateClusterRequest::new(id);
        if old.cluster_name != new.cluster_name {
            request.cluster_name = Some(new.cluster_name.clone());
        }
        if old.cluster_desc != new.cluster_desc {
            request.cluster_desc = Some(new.cluster_desc.clone());
        }
        if old.subnet_ids != new.subnet_ids {
            request.subnet_ids = Some(new.subnet_ids.clone());
        }
        if old.dns_servers != new.dns_servers {
            if new.dns_servers.is_empty() {
                request.clear_dns_server = Some("1".to_string());
            } else {
                request.dns_servers = Some(new.dns_servers.iter().map(Into::into).collect());
            }
        }
        if old.need_delete_cbs != new.need_delete_cbs {
            request.need_delete_cbs = Some(new.need_delete_cbs.unwrap_or_default());
        }

        if !request.has_changes() {
            return Ok(());
        }
        let eks = &provider.eks();
        retry_call(provider.timeouts().write_policy(), || {
            eks.update_cluster(&request)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let eks = &provider.eks();
        retry_call(provider.timeouts().write_policy(), || eks.delete_cluster(id)).await?;

        provider
            .wait_gone(id, provider.timeouts().read.saturating_mul(10), |_| eks.is_terminating(id))
            .await?;
        Ok(())
    }
}
