//! `tencentcloud_sqlserver_db`
//!
//! The id is `<instance_id>#<name>`.

use super::SqlserverService;
use crate::client::{build_id, split_id};
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlserverDbConfig {
    pub instance_id: String,
    pub name: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub remark: String,
}

fn default_charset() -> String {
    "Chinese_PRC_CI_AS".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlserverDbState {
    pub instance_id: String,
    pub name: String,
    pub charset: String,
    pub remark: String,
    pub status: i64,
    pub create_time: String,
}

pub struct SqlserverDb;

impl SqlserverDb {
    /// Wait for a database flow with the long-flow budget; flow 0 means done
    async fn wait_flow(provider: &Provider, sqlserver: &SqlserverService, flow_id: i64) -> Result<()> {
        if flow_id == 0 {
            return Ok(());
        }
        provider
            .wait_for(flow_id, provider.timeouts().long_flow(), |_| {
                sqlserver.flow_status(flow_id)
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for SqlserverDb {
    const TYPE_NAME: &'static str = "tencentcloud_sqlserver_db";
    const IMMUTABLE: &'static [&'static str] = &["instance_id", "name", "charset"];

    type Config = SqlserverDbConfig;
    type State = SqlserverDbState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let sqlserver = &provider.sqlserver();
        let flow_id = retry_call(provider.timeouts().write_policy(), || {
            sqlserver.create_db(
                &config.instance_id,
                &config.name,
                &config.charset,
                &config.remark,
            )
        })
        .await?;

        Self::wait_flow(provider, sqlserver, flow_id).await?;
        Ok(build_id(&[&config.instance_id, &config.name]))
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let parts = split_id(id, 2)?;
        let (instance_id, name) = (parts[0], parts[1]);
        let sqlserver = &provider.sqlserver();

        let db = or_absent(
            retry_call(provider.timeouts().read_policy(), || {
                sqlserver.describe_db(instance_id, name)
            })
            .await,
        )?;

        Ok(db.map(|db| SqlserverDbState {
            instance_id: instance_id.to_string(),
            name: db.name,
            charset: db.charset,
            remark: db.remark,
            status: db.status,
            create_time: db.create_time,
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        if old.remark == new.remark {
            return Ok(());
        }
        let parts = split_id(id, 2)?;
        let sqlserver = &provider.sqlserver();
        retry_call(provider.timeouts().write_policy(), || {
            sqlserver.modify_db_remark(parts[0], parts[1], &new.remark)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let parts = split_id(id, 2)?;
        let sqlserver = &provider.sqlserver();
        let flow_id = retry_call(provider.timeouts().write_policy(), || {
            sqlserver.delete_db(parts[0], parts[1])
        })
        .await?;

        Self::wait_flow(provider, sqlserver, flow_id).await
    }
}
