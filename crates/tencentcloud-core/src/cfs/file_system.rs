//! `tencentcloud_cfs_file_system`

use super::CreateFileSystemRequest;
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfsFileSystemConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub availability_zone: String,
    pub access_group_id: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_storage_type")]
    pub storage_type: String,
    pub vpc_id: String,
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_ip: Option<String>,
    #[serde(default = "default_net_interface")]
    pub net_interface: String,
}

fn default_protocol() -> String {
    "NFS".to_string()
}

fn default_storage_type() -> String {
    "SD".to_string()
}

fn default_net_interface() -> String {
    "VPC".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfsFileSystemState {
    pub name: String,
    pub availability_zone: String,
    pub access_group_id: String,
    pub protocol: String,
    pub storage_type: String,
    pub status: String,
    pub create_time: String,
    pub size_limit: u64,
    pub mount_ip: Option<String>,
    pub fs_id: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
}

pub struct CfsFileSystem;

#[async_trait]
impl Resource for CfsFileSystem {
    const TYPE_NAME: &'static str = "tencentcloud_cfs_file_system";
    const IMMUTABLE: &'static [&'static str] = &[
        "availability_zone",
        "protocol",
        "storage_type",
        "vpc_id",
        "subnet_id",
        "mount_ip",
        "net_interface",
    ];

    type Config = CfsFileSystemConfig;
    type State = CfsFileSystemState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let cfs = &provider.cfs();
        let request = CreateFileSystemRequest {
            zone: config.availability_zone.clone(),
            net_interface: config.net_interface.clone(),
            p_group_id: config.access_group_id.clone(),
            protocol: config.protocol.clone(),
            storage_type: config.storage_type.clone(),
            vpc_id: Some(config.vpc_id.clone()),
            subnet_id: Some(config.subnet_id.clone()),
            mount_ip: config.mount_ip.clone(),
            fs_name: config.name.clone(),
        };

        let id = retry_call(provider.timeouts().write_policy(), || {
            cfs.create_file_system(&request)
        })
        .await?;

        provider
            .wait_for(id.as_str(), provider.timeouts().write, |_| {
                cfs.file_system_status(&id)
            })
            .await?;
        Ok(id)
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let cfs = &provider.cfs();
        let policy = provider.timeouts().read_policy();

        let Some(fs) = or_absent(retry_call(policy, || cfs.describe_file_system(id)).await)? else {
            return Ok(None);
        };
        let targets = retry_call(policy, || cfs.describe_mount_targets(id)).await?;
        let target = targets.into_iter().next();

        Ok(Some(CfsFileSystemState {
            name: fs.fs_name,
            availability_zone: fs.zone,
            access_group_id: fs.p_group.p_group_id,
            protocol: fs.protocol,
            storage_type: fs.storage_type,
            status: fs.life_cycle_state,
            create_time: fs.creation_time,
            size_limit: fs.size_limit,
            mount_ip: target.as_ref().map(|t| t.ip_address.clone()),
            fs_id: target.as_ref().map(|t| t.fsid.clone()),
            vpc_id: target.as_ref().map(|t| t.vpc_id.clone()),
            subnet_id: target.map(|t| t.subnet_id),
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        let cfs = &provider.cfs();
        let policy = provider.timeouts().write_policy();

        if old.name != new.name {
            let name = new.name.as_deref().unwrap_or_default();
            retry_call(policy, || cfs.update_file_system_name(id, name)).await?;
        }
        if old.access_group_id != new.access_group_id {
            retry_call(policy, || {
                cfs.update_file_system_access_group(id, &new.access_group_id)
            })
            .await?;
        }
        Ok(())
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let cfs = &provider.cfs();
        retry_call(provider.timeouts().write_policy(), || cfs.delete_file_system(id)).await?;

        provider
            .wait_gone(id, provider.timeouts().write, |_| async move {
                cfs.describe_file_system(id).await.map(|fs| fs.is_some())
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CloudClient;
    use crate::client::stub::StubTransport;
    use crate::error::CoreError;
    use crate::resource::{ResourceData, create, delete, refresh, update};
    use crate::timeouts::Timeouts;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn provider(stub: &Arc<StubTransport>) -> Provider {
        Provider::new(CloudClient::new(stub.clone(), "ap-guangzhou")).with_timeouts(Timeouts {
            poll_interval: Duration::from_millis(10),
            ..Timeouts::default()
        })
    }

    fn config() -> CfsFileSystemConfig {
        serde_json::from_value(json!({
            "name": "data",
            "availability_zone": "ap-guangzhou-3",
            "access_group_id": "pgroupbasic",
            "vpc_id": "vpc-1",
            "subnet_id": "subnet-1",
        }))
        .unwrap()
    }

    fn file_system(state: &str, name: &str) -> serde_json::Value {
        json!({"FileSystems": [{
            "FileSystemId": "cfs-1",
            "FsName": name,
            "LifeCycleState": state,
            "Zone": "ap-guangzhou-3",
            "Protocol": "NFS",
            "StorageType": "SD",
            "PGroup": {"PGroupId": "pgroupbasic", "Name": "basic"},
        }]})
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_until_available() {
        let stub = StubTransport::new();
        stub.ok("CreateCfsFileSystem", json!({"FileSystemId": "cfs-1"}));
        stub.ok("DescribeCfsFileSystems", file_system("creating", "data"));
        stub.ok("DescribeCfsFileSystems", file_system("creating", "data"));
        stub.ok("DescribeCfsFileSystems", file_system("available", "data"));
        stub.ok(
            "DescribeMountTargets",
            json!({"MountTargets": [{"IpAddress": "10.0.0.8", "FSID": "abcd", "VpcId": "vpc-1", "SubnetId": "subnet-1"}]}),
        );

        let data = create(&CfsFileSystem, &provider(&stub), config()).await.unwrap();

        assert_eq!(data.id, "cfs-1");
        let state = data.state.unwrap();
        assert_eq!(state.status, "available");
        assert_eq!(state.mount_ip.as_deref(), Some("10.0.0.8"));
        assert_eq!(state.fs_id.as_deref(), Some("abcd"));

        let request = stub.last_payload("CreateCfsFileSystem").unwrap();
        assert_eq!(request["Protocol"], "NFS");
        assert_eq!(request["NetInterface"], "VPC");
        assert_eq!(request["PGroupId"], "pgroupbasic");
        assert!(request.get("MountIP").is_none());
        // two polls while creating, one success, one read back
        assert_eq!(stub.count("DescribeCfsFileSystems"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failed_is_fatal() {
        let stub = StubTransport::new();
        stub.ok("CreateCfsFileSystem", json!({"FileSystemId": "cfs-1"}));
        stub.ok("DescribeCfsFileSystems", file_system("create_failed", "data"));

        let err = create(&CfsFileSystem, &provider(&stub), config()).await.unwrap_err();
        assert!(matches!(err.root(), CoreError::TaskFailed { .. }));
        assert_eq!(stub.count("DescribeCfsFileSystems"), 1);
    }

    #[tokio::test]
    async fn test_update_renames_only() {
        let stub = StubTransport::new();
        stub.ok("UpdateCfsFileSystemName", json!({}));
        stub.ok("DescribeCfsFileSystems", file_system("available", "renamed"));
        stub.ok("DescribeMountTargets", json!({"MountTargets": []}));

        let data = ResourceData::new("cfs-1", config());
        let mut planned = config();
        planned.name = Some("renamed".into());

        let updated = update(&CfsFileSystem, &provider(&stub), &data, planned).await.unwrap();
        assert_eq!(updated.state.unwrap().name, "renamed");
        assert_eq!(stub.count("UpdateCfsFileSystemPGroup"), 0);
        assert_eq!(
            stub.last_payload("UpdateCfsFileSystemName").unwrap()["FsName"],
            "renamed"
        );
    }

    #[tokio::test]
    async fn test_update_zone_rejected_without_api_call() {
        let stub = StubTransport::new();
        let data = ResourceData::new("cfs-1", config());
        let mut planned = config();
        planned.availability_zone = "ap-guangzhou-4".into();

        let err = update(&CfsFileSystem, &provider(&stub), &data, planned).await.unwrap_err();
        assert_eq!(err.to_string(), "argument `availability_zone` cannot be changed");
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_clears_missing() {
        let stub = StubTransport::new();
        stub.ok("DescribeCfsFileSystems", json!({"FileSystems": []}));

        let data = ResourceData::new("cfs-1", config());
        assert!(refresh(&CfsFileSystem, &provider(&stub), &data).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_until_gone() {
        let stub = StubTransport::new();
        stub.ok("DeleteCfsFileSystem", json!({}));
        stub.ok("DescribeCfsFileSystems", file_system("deleting", "data"));
        stub.ok("DescribeCfsFileSystems", json!({"FileSystems": []}));

        let data = ResourceData::new("cfs-1", config());
        delete(&CfsFileSystem, &provider(&stub), &data).await.unwrap();
        assert_eq!(stub.count("DescribeCfsFileSystems"), 2);
    }
}
