//! `tencentcloud_cfs_file_systems`

use super::DescribeFileSystemsRequest;
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::DataSource;
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CfsFileSystemsFilter {
    pub file_system_id: Option<String>,
    pub name: Option<String>,
    pub availability_zone: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CfsFileSystemItem {
    pub file_system_id: String,
    pub name: String,
    pub availability_zone: String,
    pub access_group_id: String,
    pub protocol: String,
    pub storage_type: String,
    pub status: String,
    pub size_limit: u64,
    pub size_used: u64,
    pub create_time: String,
}

pub struct CfsFileSystems;

#[async_trait]
impl DataSource for CfsFileSystems {
    const TYPE_NAME: &'static str = "tencentcloud_cfs_file_systems";

    type Filter = CfsFileSystemsFilter;
    type Item = CfsFileSystemItem;

    async fn read(&self, provider: &Provider, filter: &Self::Filter) -> Result<Vec<Self::Item>> {
        let cfs = &provider.cfs();
        let request = DescribeFileSystemsRequest {
            file_system_id: filter.file_system_id.clone(),
            vpc_id: filter.vpc_id.clone(),
            subnet_id: filter.subnet_id.clone(),
        };
        let file_systems = retry_call(provider.timeouts().read_policy(), || {
            cfs.describe_file_systems(&request)
        })
        .await?;

        // name and zone are not API filters
        Ok(file_systems
            .into_iter()
            .filter(|fs| filter.name.as_ref().is_none_or(|name| &fs.fs_name == name))
            .filter(|fs| {
                filter
                    .availability_zone
                    .as_ref()
                    .is_none_or(|zone| &fs.zone == zone)
            })
            .map(|fs| CfsFileSystemItem {
                file_system_id: fs.file_system_id,
                name: fs.fs_name,
                availability_zone: fs.zone,
                access_group_id: fs.p_group.p_group_id,
                protocol: fs.protocol,
                storage_type: fs.storage_type,
                status: fs.life_cycle_state,
                size_limit: fs.size_limit,
                size_used: fs.size_byte,
                create_time: fs.creation_time,
            })
            .collect())
    }
}
