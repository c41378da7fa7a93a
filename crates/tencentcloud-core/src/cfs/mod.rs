//! Cloud File Storage (CFS)

mod data_source;
mod file_system;
mod snapshot;

pub use data_source::{CfsFileSystemItem, CfsFileSystems, CfsFileSystemsFilter};
pub use file_system::{CfsFileSystem, CfsFileSystemConfig, CfsFileSystemState};
pub use snapshot::{CfsSnapshot, CfsSnapshotConfig, CfsSnapshotState};

use crate::client::{CloudClient, Service};
use crate::error::Result;
use crate::progress::OperationStatus;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateFileSystemRequest {
    pub zone: String,
    pub net_interface: String,
    pub p_group_id: String,
    pub protocol: String,
    pub storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(rename = "MountIP", skip_serializing_if = "Option::is_none")]
    pub mount_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeFileSystemsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PGroup {
    pub p_group_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FileSystemInfo {
    pub file_system_id: String,
    pub fs_name: String,
    pub creation_time: String,
    pub life_cycle_state: String,
    pub size_byte: u64,
    pub size_limit: u64,
    pub zone: String,
    pub protocol: String,
    pub storage_type: String,
    #[serde(rename = "PGroup")]
    pub p_group: PGroup,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MountInfo {
    pub file_system_id: String,
    pub mount_target_id: String,
    pub ip_address: String,
    #[serde(rename = "FSID")]
    pub fsid: String,
    pub life_cycle_state: String,
    pub network_interface: String,
    pub vpc_id: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SnapshotInfo {
    pub snapshot_id: String,
    pub snapshot_name: String,
    pub file_system_id: String,
    pub creation_time: String,
    pub status: String,
    pub size: u64,
    pub alive_day: u64,
    pub percent: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateFileSystemResponse {
    file_system_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeFileSystemsResponse {
    #[serde(default)]
    file_systems: Vec<FileSystemInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeMountTargetsResponse {
    #[serde(default)]
    mount_targets: Vec<MountInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSnapshotResponse {
    snapshot_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSnapshotsResponse {
    #[serde(default)]
    snapshots: Vec<SnapshotInfo>,
}

/// CFS API facade
#[derive(Debug, Clone)]
pub struct CfsService {
    client: CloudClient,
}

impl CfsService {
    pub const SNAPSHOT_PAGE_SIZE: u64 = 20;

    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    pub async fn create_file_system(&self, request: &CreateFileSystemRequest) -> Result<String> {
        let response: CreateFileSystemResponse = self
            .client
            .call(Service::CFS, "CreateCfsFileSystem", request)
            .await?;
        Ok(response.file_system_id)
    }

    pub async fn describe_file_systems(
        &self,
        request: &DescribeFileSystemsRequest,
    ) -> Result<Vec<FileSystemInfo>> {
        let response: DescribeFileSystemsResponse = self
            .client
            .call(Service::CFS, "DescribeCfsFileSystems", request)
            .await?;
        Ok(response.file_systems)
    }

    pub async fn describe_file_system(&self, file_system_id: &str) -> Result<Option<FileSystemInfo>> {
        let request = DescribeFileSystemsRequest {
            file_system_id: Some(file_system_id.to_string()),
            ..Default::default()
        };
        let file_systems = self.describe_file_systems(&request).await?;
        Ok(file_systems
            .into_iter()
            .find(|fs| fs.file_system_id == file_system_id))
    }

    /// Creation status from `LifeCycleState`
    pub async fn file_system_status(&self, file_system_id: &str) -> Result<OperationStatus> {
        let status = match self.describe_file_system(file_system_id).await? {
            // Not yet visible
            None => OperationStatus::Running,
            Some(fs) => match fs.life_cycle_state.as_str() {
                "creating" => OperationStatus::Running,
                "available" => OperationStatus::Success,
                "create_failed" => {
                    OperationStatus::Fail(format!("file system {file_system_id} create_failed"))
                }
                other => OperationStatus::Unknown(other.to_string()),
            },
        };
        Ok(status)
    }

    pub async fn describe_mount_targets(&self, file_system_id: &str) -> Result<Vec<MountInfo>> {
        let response: DescribeMountTargetsResponse = self
            .client
            .call(
                Service::CFS,
                "DescribeMountTargets",
                &json!({ "FileSystemId": file_system_id }),
            )
            .await?;
        Ok(response.mount_targets)
    }

    pub async fn update_file_system_name(&self, file_system_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::CFS,
                "UpdateCfsFileSystemName",
                &json!({ "FileSystemId": file_system_id, "FsName": name }),
            )
            .await?;
        Ok(())
    }

    pub async fn update_file_system_access_group(
        &self,
        file_system_id: &str,
        access_group_id: &str,
    ) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::CFS,
                "UpdateCfsFileSystemPGroup",
                &json!({ "FileSystemId": file_system_id, "PGroupId": access_group_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_file_system(&self, file_system_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::CFS,
                "DeleteCfsFileSystem",
                &json!({ "FileSystemId": file_system_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn create_snapshot(&self, file_system_id: &str, name: Option<&str>) -> Result<String> {
        let mut request = json!({ "FileSystemId": file_system_id });
        if let Some(name) = name {
            request["SnapshotName"] = json!(name);
        }
        let response: CreateSnapshotResponse = self
            .client
            .call(Service::CFS, "CreateCfsSnapshot", &request)
            .await?;
        Ok(response.snapshot_id)
    }

    /// Look up one snapshot, walking pages until it is found
    pub async fn describe_snapshot(&self, snapshot_id: &str) -> Result<Option<SnapshotInfo>> {
        let mut offset = 0;
        loop {
            let response: DescribeSnapshotsResponse = self
                .client
                .call(
                    Service::CFS,
                    "DescribeCfsSnapshots",
                    &json!({
                        "SnapshotId": snapshot_id,
                        "Offset": offset,
                        "Limit": Self::SNAPSHOT_PAGE_SIZE,
                    }),
                )
                .await?;
            let page_len = response.snapshots.len() as u64;
            if let Some(found) = response
                .snapshots
                .into_iter()
                .find(|s| s.snapshot_id == snapshot_id)
            {
                return Ok(Some(found));
            }
            if page_len < Self::SNAPSHOT_PAGE_SIZE {
                return Ok(None);
            }
            offset += Self::SNAPSHOT_PAGE_SIZE;
        }
    }

    /// Creation status from the snapshot `Status`
    pub async fn snapshot_status(&self, snapshot_id: &str) -> Result<OperationStatus> {
        let status = match self.describe_snapshot(snapshot_id).await? {
            None => OperationStatus::Running,
            Some(snapshot) => match snapshot.status.as_str() {
                "creating" => OperationStatus::Running,
                "available" => OperationStatus::Success,
                "failed" => OperationStatus::Fail(format!("snapshot {snapshot_id} failed")),
                other => OperationStatus::Unknown(other.to_string()),
            },
        };
        Ok(status)
    }

    pub async fn update_snapshot_name(&self, snapshot_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::CFS,
                "UpdateCfsSnapshotAttribute",
                &json!({ "SnapshotId": snapshot_id, "SnapshotName": name }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::CFS,
                "DeleteCfsSnapshot",
                &json!({ "SnapshotId": snapshot_id }),
            )
            .await?;
        Ok(())
    }
}
