//! `tencentcloud_cfs_snapshot`

use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfsSnapshotConfig {
    pub file_system_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfsSnapshotState {
    pub file_system_id: String,
    pub snapshot_name: String,
    pub status: String,
    pub size: u64,
    pub alive_day: u64,
    pub create_time: String,
}

pub struct CfsSnapshot;

#[async_trait]
impl Resource for CfsSnapshot {
    const TYPE_NAME: &'static str = "tencentcloud_cfs_snapshot";
    const IMMUTABLE: &'static [&'static str] = &["file_system_id"];

    type Config = CfsSnapshotConfig;
    type State = CfsSnapshotState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let cfs = &provider.cfs();
        let id = retry_call(provider.timeouts().write_policy(), || {
            cfs.create_snapshot(&config.file_system_id, config.snapshot_name.as_deref())
        })
        .await?;

        provider
            .wait_for(id.as_str(), provider.timeouts().write, |_| {
                cfs.snapshot_status(&id)
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
        let snapshot = or_absent(
            retry_call(provider.timeouts().read_policy(), || cfs.describe_snapshot(id)).await,
        )?;

        Ok(snapshot.map(|s| CfsSnapshotState {
            file_system_id: s.file_system_id,
            snapshot_name: s.snapshot_name,
            status: s.status,
            size: s.size,
            alive_day: s.alive_day,
            create_time: s.creation_time,
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        if old.snapshot_name == new.snapshot_name {
            return Ok(());
        }
        let cfs = &provider.cfs();
        let name = new.snapshot_name.as_deref().unwrap_or_default();
        retry_call(provider.timeouts().write_policy(), || {
            cfs.update_snapshot_name(id, name)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let cfs = &provider.cfs();
        retry_call(provider.timeouts().write_policy(), || cfs.delete_snapshot(id)).await?;

        provider
            .wait_gone(id, provider.timeouts().write, |_| async move {
                cfs.describe_snapshot(id).await.map(|s| s.is_some())
            })
            .await?;
        Ok(())
    }
}
