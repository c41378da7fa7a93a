//! TencentDB for PostgreSQL

mod readonly_instance;

pub use readonly_instance::{
    PostgresqlReadonlyInstance, PostgresqlReadonlyInstanceConfig, PostgresqlReadonlyInstanceState,
};

use crate::client::{CloudClient, Service};
use crate::error::{CoreError, Result};
use crate::progress::OperationStatus;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const STATUS_RUNNING: &str = "running";
pub const STATUS_ISOLATED: &str = "isolated";

/// Statuses of an instance that no longer serves and counts as absent
pub const GONE_STATUSES: &[&str] = &["isolated", "recycled", "offline"];

/// Transitional statuses on the way back to `running`
pub const PENDING_STATUSES: &[&str] = &[
    "applying",
    "init",
    "initing",
    "expanding",
    "migrating",
    "waitSwitch",
    "switching",
    "restarting",
    "upgrading",
    "network changing",
    "job running",
];

pub const CHARGE_TYPE_POSTPAID: &str = "POSTPAID_BY_HOUR";
pub const CHARGE_TYPE_PREPAID: &str = "PREPAID";

/// One purchasable specification
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpecItemInfo {
    pub spec_code: String,
    pub version: String,
    /// MiB
    pub memory: u64,
    pub cpu: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetInfo {
    pub ip: String,
    pub port: u64,
    pub net_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DbInstance {
    #[serde(rename = "DBInstanceId")]
    pub id: String,
    #[serde(rename = "DBInstanceName")]
    pub name: String,
    #[serde(rename = "DBInstanceStatus")]
    pub status: String,
    #[serde(rename = "DBVersion")]
    pub version: String,
    /// GiB
    #[serde(rename = "DBInstanceStorage")]
    pub storage: u64,
    /// GiB
    #[serde(rename = "DBInstanceMemory")]
    pub memory: u64,
    #[serde(rename = "MasterDBInstanceId")]
    pub master_id: String,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "ProjectId")]
    pub project_id: u64,
    #[serde(rename = "PayType")]
    pub pay_type: String,
    #[serde(rename = "AutoRenew")]
    pub auto_renew: u64,
    #[serde(rename = "VpcId")]
    pub vpc_id: String,
    #[serde(rename = "SubnetId")]
    pub subnet_id: String,
    #[serde(rename = "SupportIpv6")]
    pub support_ipv6: u64,
    #[serde(rename = "CreateTime")]
    pub create_time: String,
    #[serde(rename = "DBInstanceNetInfo")]
    pub net_info: Vec<NetInfo>,
}

impl DbInstance {
    pub fn is_gone(&self) -> bool {
        GONE_STATUSES.contains(&self.status.as_str())
    }

    /// `PREPAID` or `POSTPAID_BY_HOUR`
    pub fn charge_type(&self) -> &'static str {
        if self.pay_type.eq_ignore_ascii_case("prepaid") {
            CHARGE_TYPE_PREPAID
        } else {
            CHARGE_TYPE_POSTPAID
        }
    }

    /// The private (VPC) or inner address
    pub fn private_access(&self) -> Option<&NetInfo> {
        self.net_info
            .iter()
            .find(|n| (n.net_type == "private" || n.net_type == "inner") && !n.ip.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateReadOnlyInstanceRequest {
    pub spec_code: String,
    #[serde(rename = "DBVersion")]
    pub db_version: String,
    pub storage: u64,
    pub instance_count: u64,
    pub period: u64,
    #[serde(rename = "MasterDBInstanceId")]
    pub master_db_instance_id: String,
    pub zone: String,
    pub project_id: u64,
    pub instance_charge_type: String,
    pub auto_renew_flag: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_voucher: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub voucher_ids: Vec<String>,
    pub vpc_id: String,
    pub subnet_id: String,
    pub name: String,
    pub need_support_ipv6: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_group_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpecInfo {
    #[serde(default)]
    spec_item_info_list: Vec<SpecItemInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeProductConfigResponse {
    #[serde(default)]
    spec_info_list: Vec<SpecInfo>,
}

#[derive(Deserialize)]
struct CreateReadOnlyInstanceResponse {
    #[serde(rename = "DBInstanceIdSet", default)]
    instance_ids: Vec<String>,
}

#[derive(Deserialize)]
struct DescribeInstanceAttributeResponse {
    #[serde(rename = "DBInstance")]
    instance: Option<DbInstance>,
}

/// Resolve the spec code for a version and memory size (GiB)
///
/// The error lists the allowed values so the caller can fix the argument.
pub fn find_spec_code(specs: &[SpecItemInfo], version: &str, memory_gib: u64) -> Result<String> {
    let mut versions: Vec<&str> = Vec::new();
    let mut memories: Vec<String> = Vec::new();
    let mut version_found = false;

    for spec in specs {
        if !versions.contains(&spec.version.as_str()) {
            versions.push(&spec.version);
        }
        if spec.version != version {
            continue;
        }
        version_found = true;
        let gib = spec.memory / 1024;
        if gib == memory_gib {
            return Ok(spec.spec_code.clone());
        }
        let gib = gib.to_string();
        if !memories.contains(&gib) {
            memories.push(gib);
        }
    }

    if !version_found {
        return Err(CoreError::Validation(format!(
            "db_version \"{version}\" is invalid, valid values are one of: \"{}\"",
            versions.join("\", \"")
        )));
    }
    Err(CoreError::Validation(format!(
        "memory {memory_gib} is invalid, valid values are one of: {}",
        memories.join(", ")
    )))
}

/// PostgreSQL API facade
#[derive(Debug, Clone)]
pub struct PostgresqlService {
    client: CloudClient,
}

impl PostgresqlService {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    /// Purchasable specifications in a zone
    pub async fn describe_spec_infos(&self, zone: &str) -> Result<Vec<SpecItemInfo>> {
        let response: DescribeProductConfigResponse = self
            .client
            .call(
                Service::POSTGRES,
                "DescribeProductConfig",
                &json!({ "Zone": zone }),
            )
            .await?;
        response
            .spec_info_list
            .into_iter()
            .next()
            .map(|info| info.spec_item_info_list)
            .ok_or_else(|| {
                CoreError::UnexpectedResponse(format!("no specifications returned for zone {zone}"))
            })
    }

    pub async fn create_readonly_instance(
        &self,
        request: &CreateReadOnlyInstanceRequest,
    ) -> Result<String> {
        let response: CreateReadOnlyInstanceResponse = self
            .client
            .call(Service::POSTGRES, "CreateReadOnlyDBInstance", request)
            .await?;
        response.instance_ids.into_iter().next().ok_or_else(|| {
            CoreError::UnexpectedResponse("CreateReadOnlyDBInstance returned no instance id".into())
        })
    }

    /// The instance in any status, `None` when the API knows nothing of it
    pub async fn describe_instance(&self, instance_id: &str) -> Result<Option<DbInstance>> {
        let response: DescribeInstanceAttributeResponse = self
            .client
            .call(
                Service::POSTGRES,
                "DescribeDBInstanceAttribute",
                &json!({ "DBInstanceId": instance_id }),
            )
            .await?;
        Ok(response.instance)
    }

    /// Progress towards `running`; a vanished instance is a failure
    pub async fn running_status(&self, instance_id: &str) -> Result<OperationStatus> {
        Ok(match self.describe_instance(instance_id).await? {
            Some(instance) if instance.status == STATUS_RUNNING => OperationStatus::Success,
            Some(instance) if PENDING_STATUSES.contains(&instance.status.as_str()) => {
                OperationStatus::Running
            }
            Some(instance) if instance.is_gone() => OperationStatus::Fail(format!(
                "instance {instance_id} is {}",
                instance.status
            )),
            Some(instance) => OperationStatus::Unknown(instance.status),
            None => OperationStatus::Fail(format!("instance {instance_id} not found")),
        })
    }

    /// Progress towards isolation; a vanished instance counts as isolated
    pub async fn isolation_status(&self, instance_id: &str) -> Result<OperationStatus> {
        Ok(match self.describe_instance(instance_id).await? {
            Some(instance) if !instance.is_gone() => OperationStatus::Running,
            _ => OperationStatus::Success,
        })
    }

    pub async fn modify_instance_name(&self, instance_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::POSTGRES,
                "ModifyDBInstanceName",
                &json!({ "DBInstanceId": instance_id, "InstanceName": name }),
            )
            .await?;
        Ok(())
    }

    pub async fn modify_instance_project(&self, instance_id: &str, project_id: u64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::POSTGRES,
                "ModifyDBInstancesProject",
                &json!({
                    "DBInstanceIdSet": [instance_id],
                    "ProjectId": project_id.to_string(),
                }),
            )
            .await?;
        Ok(())
    }

    /// Resize memory (GiB) and storage (GiB)
    pub async fn upgrade_instance(&self, instance_id: &str, memory: u64, storage: u64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::POSTGRES,
                "ModifyDBInstanceSpec",
                &json!({ "DBInstanceId": instance_id, "Memory": memory, "Storage": storage }),
            )
            .await?;
        Ok(())
    }

    pub async fn isolate_instance(&self, instance_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::POSTGRES,
                "IsolateDBInstances",
                &json!({ "DBInstanceIdSet": [instance_id] }),
            )
            .await?;
        Ok(())
    }

    pub async fn destroy_instance(&self, instance_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(
                Service::POSTGRES,
                "DestroyDBInstance",
                &json!({ "DBInstanceId": instance_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubTransport;

    fn specs() -> Vec<SpecItemInfo> {
        let spec = |code: &str, version: &str, memory: u64| SpecItemInfo {
            spec_code: code.into(),
            version: version.into(),
            memory,
            cpu: 1,
        };
        vec![
            spec("cdb.pg.z1.2g", "10.4", 2048),
            spec("cdb.pg.z1.4g", "10.4", 4096),
            spec("cdb.pg.z1.8g", "12.4", 8192),
        ]
    }

    #[test]
    fn test_find_spec_code() {
        assert_eq!(find_spec_code(&specs(), "10.4", 4).unwrap(), "cdb.pg.z1.4g");
    }

    #[test]
    fn test_find_spec_code_unknown_version_lists_versions() {
        let err = find_spec_code(&specs(), "9.3", 4).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("\"10.4\", \"12.4\""));
    }

    #[test]
    fn test_find_spec_code_unknown_memory_lists_memories() {
        let err = find_spec_code(&specs(), "10.4", 16).unwrap_err();
        assert!(err.to_string().contains("valid values are one of: 2, 4"));
    }

    #[test]
    fn test_charge_type_and_private_access() {
        let instance = DbInstance {
            pay_type: "prepaid".into(),
            net_info: vec![
                NetInfo {
                    ip: "1.2.3.4".into(),
                    port: 5432,
                    net_type: "public".into(),
                    status: "opened".into(),
                },
                NetInfo {
                    ip: "10.0.0.9".into(),
                    port: 5432,
                    net_type: "private".into(),
                    status: "opened".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(instance.charge_type(), CHARGE_TYPE_PREPAID);
        assert_eq!(instance.private_access().unwrap().ip, "10.0.0.9");
    }

    #[tokio::test]
    async fn test_running_status() {
        let stub = StubTransport::new();
        let postgres = PostgresqlService::new(CloudClient::new(stub.clone(), "ap-guangzhou"));
        stub.ok("DescribeDBInstanceAttribute", json!({"DBInstance": {"DBInstanceStatus": "initing"}}));
        stub.ok("DescribeDBInstanceAttribute", json!({"DBInstance": {"DBInstanceStatus": "running"}}));
        stub.ok("DescribeDBInstanceAttribute", json!({"DBInstance": {"DBInstanceStatus": "isolated"}}));
        stub.ok("DescribeDBInstanceAttribute", json!({}));
        stub.ok("DescribeDBInstanceAttribute", json!({"DBInstance": {"DBInstanceStatus": "frozen"}}));

        assert_eq!(postgres.running_status("pg-1").await.unwrap(), OperationStatus::Running);
        assert_eq!(postgres.running_status("pg-1").await.unwrap(), OperationStatus::Success);
        assert!(matches!(
            postgres.running_status("pg-1").await.unwrap(),
            OperationStatus::Fail(_)
        ));
        assert!(matches!(
            postgres.running_status("pg-1").await.unwrap(),
            OperationStatus::Fail(_)
        ));
        assert_eq!(
            postgres.running_status("pg-1").await.unwrap(),
            OperationStatus::Unknown("frozen".into())
        );
    }

    #[tokio::test]
    async fn test_project_id_sent_as_string() {
        let stub = StubTransport::new();
        stub.ok("ModifyDBInstancesProject", json!({}));
        let postgres = PostgresqlService::new(CloudClient::new(stub.clone(), "ap-guangzhou"));

        postgres.modify_instance_project("pg-1", 1001).await.unwrap();
        assert_eq!(
            stub.last_payload("ModifyDBInstancesProject").unwrap(),
            json!({"DBInstanceIdSet": ["pg-1"], "ProjectId": "1001"})
        );
    }
}
