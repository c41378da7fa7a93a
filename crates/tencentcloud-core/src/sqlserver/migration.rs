//! `tencentcloud_sqlserver_migration`

use super::{
    CreateMigrationRequest, MigrateDb, MigrateSource, MigrateTarget, MigrationDetail,
    ModifyMigrationRequest, RenameRestoreDatabase,
};
use crate::error::{CoreError, Result};
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub url: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_password: Option<String>,
}

impl From<&MigrationSource> for MigrateSource {
    fn from(s: &MigrationSource) -> Self {
        MigrateSource {
            instance_id: s.instance_id.clone(),
            cvm_id: s.cvm_id.clone(),
            vpc_id: s.vpc_id.clone(),
            subnet_id: s.subnet_id.clone(),
            user_name: s.user_name.clone(),
            password: s.password.clone(),
            ip: s.ip.clone(),
            port: s.port,
            url: s.url.clone(),
            url_password: s.url_password.clone(),
        }
    }
}

impl From<MigrateSource> for MigrationSource {
    fn from(s: MigrateSource) -> Self {
        MigrationSource {
            instance_id: s.instance_id,
            cvm_id: s.cvm_id,
            vpc_id: s.vpc_id,
            subnet_id: s.subnet_id,
            user_name: s.user_name,
            password: s.password,
            ip: s.ip,
            port: s.port,
            url: s.url,
            url_password: s.url_password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<&MigrationTarget> for MigrateTarget {
    fn from(t: &MigrationTarget) -> Self {
        MigrateTarget {
            instance_id: t.instance_id.clone(),
            user_name: t.user_name.clone(),
            password: t.password.clone(),
        }
    }
}

impl From<MigrateTarget> for MigrationTarget {
    fn from(t: MigrateTarget) -> Self {
        MigrationTarget {
            instance_id: t.instance_id,
            user_name: t.user_name,
            password: t.password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenameRestore {
    #[serde(default)]
    pub old_name: String,
    #[serde(default)]
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlserverMigrationConfig {
    pub migrate_name: String,
    /// 1 structure, 2 data, 3 structure and data
    pub migrate_type: u64,
    /// 1 TencentDB, 2 self-built on CVM, 4 offline from COS, 5 offline from URL
    pub source_type: u64,
    pub source: MigrationSource,
    pub target: MigrationTarget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub migrate_db_set: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rename_restore: Vec<RenameRestore>,
}

impl SqlserverMigrationConfig {
    fn migrate_dbs(&self) -> Vec<MigrateDb> {
        self.migrate_db_set
            .iter()
            .map(|name| MigrateDb {
                db_name: name.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlserverMigrationState {
    pub migrate_name: String,
    pub migrate_type: u64,
    pub source_type: u64,
    pub source: MigrationSource,
    pub target: MigrationTarget,
    pub migrate_db_set: Vec<String>,
    /// Not returned by the API; carried over from the configuration
    pub rename_restore: Vec<RenameRestore>,
    pub status: i64,
    pub create_time: String,
}

pub struct SqlserverMigration;

fn migrate_id(id: &str) -> Result<u64> {
    id.parse()
        .map_err(|_| CoreError::Validation(format!("migration id `{id}` is not numeric")))
}

#[async_trait]
impl Resource for SqlserverMigration {
    const TYPE_NAME: &'static str = "tencentcloud_sqlserver_migration";
    const IMMUTABLE: &'static [&'static str] = &["rename_restore"];

    type Config = SqlserverMigrationConfig;
    type State = SqlserverMigrationState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let sqlserver = &provider.sqlserver();
        let request = CreateMigrationRequest {
            migrate_name: config.migrate_name.clone(),
            migrate_type: config.migrate_type,
            source_type: config.source_type,
            source: (&config.source).into(),
            target: (&config.target).into(),
            migrate_db_set: config.migrate_dbs(),
            rename_restore: config
                .rename_restore
                .iter()
                .map(|r| RenameRestoreDatabase {
                    old_name: r.old_name.clone(),
                    new_name: r.new_name.clone(),
                })
                .collect(),
        };

        let id = retry_call(provider.timeouts().write_policy(), || {
            sqlserver.create_migration(&request)
        })
        .await?;
        Ok(id.to_string())
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let migrate_id = migrate_id(id)?;
        let sqlserver = &provider.sqlserver();
        let detail = or_absent(
            retry_call(provider.timeouts().read_policy(), || {
                sqlserver.describe_migration(migrate_id)
            })
            .await,
        )?;

        Ok(detail.map(|d: MigrationDetail| SqlserverMigrationState {
            migrate_name: d.migrate_name,
            migrate_type: d.migrate_type,
            source_type: d.source_type,
            source: d.source.into(),
            target: d.target.into(),
            migrate_db_set: d.migrate_db_set.into_iter().map(|db| db.db_name).collect(),
            rename_restore: config.rename_restore.clone(),
            status: d.status,
            create_time: d.create_time,
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        // a changed migrate_type is sent together with the source type
        let type_changed = old.migrate_type != new.migrate_type;
        let request = ModifyMigrationRequest {
            migrate_id: migrate_id(id)?,
            migrate_name: (old.migrate_name != new.migrate_name).then(|| new.migrate_name.clone()),
            migrate_type: type_changed.then_some(new.migrate_type),
            source_type: (type_changed || old.source_type != new.source_type)
                .then_some(new.source_type),
            source: (&new.source).into(),
            target: (&new.target).into(),
            migrate_db_set: new.migrate_dbs(),
        };

        let sqlserver = &provider.sqlserver();
        retry_call(provider.timeouts().write_policy(), || {
            sqlserver.modify_migration(&request)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let migrate_id = migrate_id(id)?;
        let sqlserver = &provider.sqlserver();
        retry_call(provider.timeouts().write_policy(), || {
            sqlserver.delete_migration(migrate_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CloudClient;
    use crate::client::stub::StubTransport;
    use crate::resource::{ResourceData, create, delete, refresh, update};
    use serde_json::json;
    use std::sync::Arc;

    fn provider(stub: &Arc<StubTransport>) -> Provider {
        Provider::new(CloudClient::new(stub.clone(), "ap-guangzhou"))
    }

    fn config() -> SqlserverMigrationConfig {
        serde_json::from_value(json!({
            "migrate_name": "nightly",
            "migrate_type": 1,
            "source_type": 1,
            "source": {"instance_id": "mssql-src", "user_name": "sa", "password": "pw"},
            "target": {"instance_id": "mssql-dst", "user_name": "sa", "password": "pw"},
            "migrate_db_set": ["orders"],
            "rename_restore": [{"old_name": "orders", "new_name": "orders_copy"}],
        }))
        .unwrap()
    }

    fn detail(name: &str) -> serde_json::Value {
        json!({
            "MigrateId": 42,
            "MigrateName": name,
            "MigrateType": 1,
            "SourceType": 1,
            "Source": {"InstanceId": "mssql-src", "UserName": "sa", "Password": "pw"},
            "Target": {"InstanceId": "mssql-dst", "UserName": "sa", "Password": "pw"},
            "MigrateDBSet": [{"DBName": "orders"}],
            "Status": 1,
        })
    }

    #[tokio::test]
    async fn test_create_keeps_rename_restore_from_config() {
        let stub = StubTransport::new();
        stub.ok("CreateMigration", json!({"MigrateId": 42}));
        stub.ok("DescribeMigrationDetail", detail("nightly"));

        let data = create(&SqlserverMigration, &provider(&stub), config()).await.unwrap();

        assert_eq!(data.id, "42");
        let state = data.state.unwrap();
        assert_eq!(state.source.instance_id.as_deref(), Some("mssql-src"));
        assert_eq!(state.migrate_db_set, vec!["orders".to_string()]);
        assert_eq!(state.rename_restore[0].new_name, "orders_copy");

        let request = stub.last_payload("CreateMigration").unwrap();
        assert_eq!(request["MigrateDBSet"], json!([{"DBName": "orders"}]));
        assert_eq!(
            request["RenameRestore"],
            json!([{"OldName": "orders", "NewName": "orders_copy"}])
        );
        assert!(request["Source"].get("Url").is_none());
    }

    #[tokio::test]
    async fn test_update_sends_changed_name_only() {
        let stub = StubTransport::new();
        stub.ok("ModifyMigration", json!({}));
        stub.ok("DescribeMigrationDetail", detail("weekly"));

        let data = ResourceData::new("42", config());
        let mut planned = config();
        planned.migrate_name = "weekly".into();

        update(&SqlserverMigration, &provider(&stub), &data, planned).await.unwrap();
        let request = stub.last_payload("ModifyMigration").unwrap();
        assert_eq!(request["MigrateId"], 42);
        assert_eq!(request["MigrateName"], "weekly");
        assert!(request.get("MigrateType").is_none());
        assert!(request.get("SourceType").is_none());
    }

    #[tokio::test]
    async fn test_update_migrate_type_sends_source_type() {
        let stub = StubTransport::new();
        stub.ok("ModifyMigration", json!({}));
        stub.ok("DescribeMigrationDetail", detail("nightly"));

        let data = ResourceData::new("42", config());
        let mut planned = config();
        planned.migrate_type = 3;

        update(&SqlserverMigration, &provider(&stub), &data, planned).await.unwrap();
        let request = stub.last_payload("ModifyMigration").unwrap();
        assert_eq!(request["MigrateType"], 3);
        assert_eq!(request["SourceType"], 1);
    }

    #[tokio::test]
    async fn test_rename_restore_is_immutable() {
        let stub = StubTransport::new();
        let data = ResourceData::new("42", config());
        let mut planned = config();
        planned.rename_restore.clear();

        let err = update(&SqlserverMigration, &provider(&stub), &data, planned)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "argument `rename_restore` cannot be changed");
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_missing_migration_clears_state() {
        let stub = StubTransport::new();
        stub.err("DescribeMigrationDetail", "ResourceNotFound.MigrationNotFound");

        let data = ResourceData::new("42", config());
        assert!(refresh(&SqlserverMigration, &provider(&stub), &data).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let stub = StubTransport::new();
        stub.ok("DeleteMigration", json!({}));

        let data = ResourceData::new("42", config());
        delete(&SqlserverMigration, &provider(&stub), &data).await.unwrap();
        assert_eq!(stub.last_payload("DeleteMigration").unwrap(), json!({"MigrateId": 42}));
    }
}
