//! SQL Server databases and migrations
//!
//! Database mutations are asynchronous: `CreateDB` and `DeleteDB` hand back a
//! flow id that is tracked with `DescribeFlowStatus`.

mod db;
mod migration;

pub use db::{SqlserverDb, SqlserverDbConfig, SqlserverDbState};
pub use migration::{
    MigrationSource, MigrationTarget, RenameRestore, SqlserverMigration, SqlserverMigrationConfig,
    SqlserverMigrationState,
};

use crate::client::{CloudClient, Service};
use crate::error::{CoreError, Result};
use crate::progress::OperationStatus;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// `DBDetail.Status` of a database that is being dropped
pub const DB_STATUS_DELETING: i64 = -1;

/// `DescribeFlowStatus` values
pub mod flow {
    pub const SUCCESS: i64 = 0;
    pub const FAIL: i64 = 1;
    pub const RUNNING: i64 = 2;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DbDetail {
    pub name: String,
    pub charset: String,
    pub remark: String,
    pub create_time: String,
    pub status: i64,
}

impl DbDetail {
    pub fn is_deleting(&self) -> bool {
        self.status == DB_STATUS_DELETING
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MigrateSource {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MigrateTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrateDb {
    #[serde(rename = "DBName")]
    pub db_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenameRestoreDatabase {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateMigrationRequest {
    pub migrate_name: String,
    pub migrate_type: u64,
    pub source_type: u64,
    pub source: MigrateSource,
    pub target: MigrateTarget,
    #[serde(rename = "MigrateDBSet", skip_serializing_if = "Vec::is_empty")]
    pub migrate_db_set: Vec<MigrateDb>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rename_restore: Vec<RenameRestoreDatabase>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyMigrationRequest {
    pub migrate_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrate_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<u64>,
    pub source: MigrateSource,
    pub target: MigrateTarget,
    #[serde(rename = "MigrateDBSet", skip_serializing_if = "Vec::is_empty")]
    pub migrate_db_set: Vec<MigrateDb>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MigrationDetail {
    pub migrate_id: u64,
    pub migrate_name: String,
    pub migrate_type: u64,
    pub source_type: u64,
    pub source: MigrateSource,
    pub target: MigrateTarget,
    #[serde(rename = "MigrateDBSet")]
    pub migrate_db_set: Vec<MigrateDb>,
    pub status: i64,
    pub create_time: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlowResponse {
    #[serde(default)]
    flow_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlowStatusResponse {
    status: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DbInstance {
    #[serde(rename = "DBDetails", default)]
    db_details: Vec<DbDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDbsResponse {
    #[serde(rename = "DBInstances", default)]
    db_instances: Vec<DbInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateMigrationResponse {
    migrate_id: u64,
}

/// SQL Server API facade
#[derive(Debug, Clone)]
pub struct SqlserverService {
    client: CloudClient,
}

impl SqlserverService {
    pub const PAGE_SIZE: u64 = 20;

    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    /// Create one database; returns the flow id (0 when nothing is pending)
    pub async fn create_db(
        &self,
        instance_id: &str,
        name: &str,
        charset: &str,
        remark: &str,
    ) -> Result<i64> {
        let response: FlowResponse = self
            .client
            .call(
                Service::SQLSERVER,
                "CreateDB",
                &json!({
                    "InstanceId": instance_id,
                    "DBs": [{ "DBName": name, "Charset": charset, "Remark": remark }],
                }),
            )
            .await?;
        Ok(response.flow_id)
    }

    /// All databases of an instance, walking pages
    pub async fn describe_dbs(&self, instance_id: &str) -> Result<Vec<DbDetail>> {
        let mut dbs = Vec::new();
        let mut offset = 0;
        loop {
            let response: DescribeDbsResponse = self
                .client
                .call(
                    Service::SQLSERVER,
                    "DescribeDBs",
                    &json!({
                        "InstanceIdSet": [instance_id],
                        "Offset": offset,
                        "Limit": Self::PAGE_SIZE,
                    }),
                )
                .await?;

            let mut instances = response.db_instances;
            if instances.len() > 1 {
                return Err(CoreError::UnexpectedResponse(format!(
                    "DescribeDBs returned {} database lists for instance {instance_id}",
                    instances.len()
                )));
            }
            let Some(instance) = instances.pop() else {
                return Ok(dbs);
            };
            let page_len = instance.db_details.len() as u64;
            dbs.extend(instance.db_details);
            if page_len < Self::PAGE_SIZE {
                return Ok(dbs);
            }
            offset += Self::PAGE_SIZE;
        }
    }

    /// One database; a database being dropped counts as absent
    pub async fn describe_db(&self, instance_id: &str, name: &str) -> Result<Option<DbDetail>> {
        let dbs = self.describe_dbs(instance_id).await?;
        Ok(dbs
            .into_iter()
            .find(|db| db.name == name)
            .filter(|db| !db.is_deleting()))
    }

    pub async fn modify_db_remark(&self, instance_id: &str, name: &str, remark: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::SQLSERVER,
                "ModifyDBRemark",
                &json!({
                    "InstanceId": instance_id,
                    "DBRemarks": [{ "Name": name, "Remark": remark }],
                }),
            )
            .await?;
        Ok(())
    }

    /// Drop one database; returns the flow id (0 when nothing is pending)
    pub async fn delete_db(&self, instance_id: &str, name: &str) -> Result<i64> {
        let response: FlowResponse = self
            .client
            .call(
                Service::SQLSERVER,
                "DeleteDB",
                &json!({ "InstanceId": instance_id, "Names": [name] }),
            )
            .await?;
        Ok(response.flow_id)
    }

    pub async fn flow_status(&self, flow_id: i64) -> Result<OperationStatus> {
        let response: FlowStatusResponse = self
            .client
            .call(
                Service::SQLSERVER,
                "DescribeFlowStatus",
                &json!({ "FlowId": flow_id }),
            )
            .await?;
        Ok(match response.status {
            flow::SUCCESS => OperationStatus::Success,
            flow::RUNNING => OperationStatus::Running,
            flow::FAIL => OperationStatus::Fail(format!("flow {flow_id} failed")),
            other => OperationStatus::Unknown(other.to_string()),
        })
    }

    pub async fn create_migration(&self, request: &CreateMigrationRequest) -> Result<u64> {
        let response: CreateMigrationResponse = self
            .client
            .call(Service::SQLSERVER, "CreateMigration", request)
            .await?;
        Ok(response.migrate_id)
    }

    pub async fn describe_migration(&self, migrate_id: u64) -> Result<Option<MigrationDetail>> {
        let detail: MigrationDetail = self
            .client
            .call(
                Service::SQLSERVER,
                "DescribeMigrationDetail",
                &json!({ "MigrateId": migrate_id }),
            )
            .await?;
        // an unknown id comes back as an empty detail
        if detail.migrate_id == 0 && detail.migrate_name.is_empty() {
            return Ok(None);
        }
        Ok(Some(detail))
    }

    pub async fn modify_migration(&self, request: &ModifyMigrationRequest) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(Service::SQLSERVER, "ModifyMigration", request)
            .await?;
        Ok(())
    }

    pub async fn delete_migration(&self, migrate_id: u64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::SQLSERVER,
                "DeleteMigration",
                &json!({ "MigrateId": migrate_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubTransport;

    fn service(stub: &std::sync::Arc<StubTransport>) -> SqlserverService {
        SqlserverService::new(CloudClient::new(stub.clone(), "ap-guangzhou"))
    }

    #[tokio::test]
    async fn test_flow_status_mapping() {
        let stub = StubTransport::new();
        let sqlserver = service(&stub);
        for status in [0, 2, 1, 7] {
            stub.ok("DescribeFlowStatus", json!({ "Status": status }));
        }

        assert_eq!(sqlserver.flow_status(11).await.unwrap(), OperationStatus::Success);
        assert_eq!(sqlserver.flow_status(11).await.unwrap(), OperationStatus::Running);
        assert!(matches!(
            sqlserver.flow_status(11).await.unwrap(),
            OperationStatus::Fail(_)
        ));
        assert_eq!(
            sqlserver.flow_status(11).await.unwrap(),
            OperationStatus::Unknown("7".into())
        );
        assert_eq!(stub.last_payload("DescribeFlowStatus").unwrap(), json!({"FlowId": 11}));
    }

    #[tokio::test]
    async fn test_deleting_database_is_absent() {
        let stub = StubTransport::new();
        stub.ok(
            "DescribeDBs",
            json!({"DBInstances": [{"DBDetails": [
                {"Name": "orders", "Status": -1},
                {"Name": "users", "Status": 2, "Charset": "Chinese_PRC_CI_AS"},
            ]}]}),
        );
        let sqlserver = service(&stub);

        assert_eq!(sqlserver.describe_db("mssql-1", "orders").await.unwrap(), None);
        let users = sqlserver.describe_db("mssql-1", "users").await.unwrap().unwrap();
        assert_eq!(users.charset, "Chinese_PRC_CI_AS");
        assert_eq!(
            stub.last_payload("DescribeDBs").unwrap()["InstanceIdSet"],
            json!(["mssql-1"])
        );
    }

    #[tokio::test]
    async fn test_multiple_db_lists_rejected() {
        let stub = StubTransport::new();
        stub.ok(
            "DescribeDBs",
            json!({"DBInstances": [{"DBDetails": []}, {"DBDetails": []}]}),
        );

        let err = service(&stub).describe_dbs("mssql-1").await.unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_migration_detail_is_absent() {
        let stub = StubTransport::new();
        stub.ok("DescribeMigrationDetail", json!({"RequestId": "r"}));

        assert_eq!(service(&stub).describe_migration(42).await.unwrap(), None);
    }
}
