//! `tencentcloud_postgresql_readonly_instance`

use super::{
    CHARGE_TYPE_POSTPAID, CreateReadOnlyInstanceRequest, PostgresqlService, find_spec_code,
};
use crate::error::Result;
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresqlReadonlyInstanceConfig {
    pub db_version: String,
    /// GiB
    pub storage: u64,
    /// GiB
    pub memory: u64,
    pub master_db_instance_id: String,
    pub zone: String,
    #[serde(default)]
    pub project_id: u64,
    pub vpc_id: String,
    pub subnet_id: String,
    pub name: String,
    #[serde(default)]
    pub security_groups_ids: Vec<String>,
    #[serde(default = "default_charge_type")]
    pub instance_charge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,
    #[serde(default)]
    pub auto_renew_flag: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_voucher: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voucher_ids: Vec<String>,
    #[serde(default)]
    pub need_support_ipv6: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_group_id: Option<String>,
}

fn default_charge_type() -> String {
    CHARGE_TYPE_POSTPAID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresqlReadonlyInstanceState {
    pub instance_id: String,
    pub name: String,
    pub status: String,
    pub db_version: String,
    pub storage: u64,
    pub memory: u64,
    pub master_db_instance_id: String,
    pub zone: String,
    pub project_id: u64,
    pub instance_charge_type: String,
    pub auto_renew_flag: u64,
    pub vpc_id: String,
    pub subnet_id: String,
    pub need_support_ipv6: u64,
    pub create_time: String,
    pub private_access_ip: Option<String>,
    pub private_access_port: Option<u64>,
}

pub struct PostgresqlReadonlyInstance;

impl PostgresqlReadonlyInstance {
    /// Budget for an instance to come up after creation
    fn create_timeout(provider: &Provider) -> Duration {
        provider.timeouts().read.saturating_mul(5)
    }

    /// Budget for an instance to settle after a modification
    fn settle_timeout(provider: &Provider) -> Duration {
        provider.timeouts().read.saturating_mul(2)
    }

    async fn wait_running(
        provider: &Provider,
        postgres: &PostgresqlService,
        id: &str,
        timeout: Duration,
    ) -> Result<()> {
        provider
            .wait_for(id, timeout, |_| postgres.running_status(id))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for PostgresqlReadonlyInstance {
    const TYPE_NAME: &'static str = "tencentcloud_postgresql_readonly_instance";
    const IMMUTABLE: &'static [&'static str] = &[
        "db_version",
        "master_db_instance_id",
        "zone",
        "vpc_id",
        "subnet_id",
        "instance_charge_type",
        "period",
        "auto_renew_flag",
        "auto_voucher",
        "voucher_ids",
        "need_support_ipv6",
        "security_groups_ids",
        "read_only_group_id",
    ];

    type Config = PostgresqlReadonlyInstanceConfig;
    type State = PostgresqlReadonlyInstanceState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let postgres = &provider.postgresql();

        let specs = retry_call(provider.timeouts().read_policy(), || {
            postgres.describe_spec_infos(&config.zone)
        })
        .await?;
        let spec_code = find_spec_code(&specs, &config.db_version, config.memory)?;

        let request = CreateReadOnlyInstanceRequest {
            spec_code,
            db_version: config.db_version.clone(),
            storage: config.storage,
            instance_count: 1,
            period: config.period.unwrap_or(1),
            master_db_instance_id: config.master_db_instance_id.clone(),
            zone: config.zone.clone(),
            project_id: config.project_id,
            instance_charge_type: config.instance_charge_type.clone(),
            auto_renew_flag: config.auto_renew_flag,
            auto_voucher: config.auto_voucher,
            voucher_ids: config.voucher_ids.clone(),
            vpc_id: config.vpc_id.clone(),
            subnet_id: config.subnet_id.clone(),
            name: config.name.clone(),
            need_support_ipv6: config.need_support_ipv6,
            read_only_group_id: config.read_only_group_id.clone(),
            security_group_ids: config.security_groups_ids.clone(),
        };

        let id = retry_call(provider.timeouts().write_policy(), || {
            postgres.create_readonly_instance(&request)
        })
        .await?;

        Self::wait_running(provider, postgres, &id, Self::create_timeout(provider)).await?;
        Ok(id)
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let postgres = &provider.postgresql();
        let instance = or_absent(
            retry_call(provider.timeouts().read_policy(), || {
                postgres.describe_instance(id)
            })
            .await,
        )?;
        let Some(instance) = instance.filter(|i| !i.is_gone()) else {
            return Ok(None);
        };

        let access = instance.private_access().cloned();
        Ok(Some(PostgresqlReadonlyInstanceState {
            instance_id: id.to_string(),
            instance_charge_type: instance.charge_type().to_string(),
            name: instance.name,
            status: instance.status,
            db_version: instance.version,
            storage: instance.storage,
            memory: instance.memory,
            master_db_instance_id: instance.master_id,
            zone: instance.zone,
            project_id: instance.project_id,
            auto_renew_flag: instance.auto_renew,
            vpc_id: instance.vpc_id,
            subnet_id: instance.subnet_id,
            need_support_ipv6: instance.support_ipv6,
            create_time: instance.create_time,
            private_access_ip: access.as_ref().map(|a| a.ip.clone()),
            private_access_port: access.map(|a| a.port),
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        let postgres = &provider.postgresql();
        let policy = provider.timeouts().write_policy();
        let settle = Self::settle_timeout(provider);

        if old.name != new.name {
            retry_call(policy, || postgres.modify_instance_name(id, &new.name)).await?;
            Self::wait_running(provider, postgres, id, settle).await?;
        }
        if old.memory != new.memory || old.storage != new.storage {
            retry_call(policy, || {
                postgres.upgrade_instance(id, new.memory, new.storage)
            })
            .await?;
            Self::wait_running(provider, postgres, id, settle).await?;
        }
        if old.project_id != new.project_id {
            retry_call(policy, || {
                postgres.modify_instance_project(id, new.project_id)
            })
            .await?;
            Self::wait_running(provider, postgres, id, settle).await?;
        }
        Ok(())
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let postgres = &provider.postgresql();
        let policy = provider.timeouts().write_policy();

        retry_call(policy, || postgres.isolate_instance(id)).await?;
        provider
            .wait_for(id, provider.timeouts().write, |_| {
                postgres.isolation_status(id)
            })
            .await?;
        retry_call(policy, || postgres.destroy_instance(id)).await
    }
}
