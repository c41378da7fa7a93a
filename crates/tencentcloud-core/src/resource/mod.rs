//! Declarative resources and data sources
//!
//! A [`Resource`] turns a typed configuration into cloud API calls and reads
//! the observed state back. The functions in [`lifecycle`] add the common
//! orchestration around the four callbacks. [`DynResource`] erases the types
//! so that hosts can dispatch on a type name with JSON documents.

pub mod data_source;
pub mod lifecycle;
pub mod output;

pub use data_source::{DataSource, DynDataSource, TypedDataSource, read_data_source};
pub use lifecycle::{DynResource, TypedResource, check_immutable, create, delete, refresh, update};
pub use output::write_result_file;

use crate::error::Result;
use crate::provider::Provider;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A cloud resource managed through create, read, update and delete callbacks
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Type name, e.g. `tencentcloud_cfs_file_system`
    const TYPE_NAME: &'static str;

    /// Configuration arguments that cannot be changed after creation
    const IMMUTABLE: &'static [&'static str];

    /// Declared arguments
    type Config: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;

    /// Observed attributes
    type State: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;

    /// Create the resource and wait until it is usable; returns its id
    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String>;

    /// Read the resource; `None` when it no longer exists
    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        config: &Self::Config,
    ) -> Result<Option<Self::State>>;

    /// Apply the changed mutable arguments
    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()>;

    /// Delete the resource and wait until it is gone where the API is asynchronous
    async fn delete(&self, provider: &Provider, id: &str, config: &Self::Config) -> Result<()>;
}

/// What the host tracks for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData<C, S> {
    pub id: String,
    pub config: C,
    /// Last observed state; absent when only the id and config are known
    #[serde(default)]
    pub state: Option<S>,
}

impl<C, S> ResourceData<C, S> {
    pub fn new(id: impl Into<String>, config: C) -> Self {
        Self {
            id: id.into(),
            config,
            state: None,
        }
    }
}

/// Treat a not-found error as an absent resource
pub fn or_absent<T>(result: Result<Option<T>>) -> Result<Option<T>> {
    match result {
        Err(e) if e.is_not_found() => Ok(None),
        other => other,
    }
}

/// All resources, type-erased
pub fn resources() -> Vec<Box<dyn DynResource>> {
    vec![
        Box::new(TypedResource(crate::cfs::CfsFileSystem)),
        Box::new(TypedResource(crate::cfs::CfsSnapshot)),
        Box::new(TypedResource(crate::sqlserver::SqlserverDb)),
        Box::new(TypedResource(crate::sqlserver::SqlserverMigration)),
        Box::new(TypedResource(crate::postgresql::PostgresqlReadonlyInstance)),
        Box::new(TypedResource(crate::dc::DcGateway)),
        Box::new(TypedResource(crate::eks::EksCluster)),
        Box::new(TypedResource(crate::bi::BiProject)),
    ]
}

/// Names of all resource types, sorted
pub fn resource_types() -> Vec<&'static str> {
    let mut names: Vec<_> = resources().iter().map(|r| r.type_name()).collect();
    names.sort_unstable();
    names
}

pub fn lookup_resource(type_name: &str) -> Option<Box<dyn DynResource>> {
    resources().into_iter().find(|r| r.type_name() == type_name)
}

/// All data sources, type-erased
pub fn data_sources() -> Vec<Box<dyn DynDataSource>> {
    vec![
        Box::new(TypedDataSource(crate::cfs::CfsFileSystems)),
        Box::new(TypedDataSource(crate::eks::EksClusters)),
        Box::new(TypedDataSource(crate::dc::DcGateways)),
    ]
}

/// Names of all data source types, sorted
pub fn data_source_types() -> Vec<&'static str> {
    let mut names: Vec<_> = data_sources().iter().map(|d| d.type_name()).collect();
    names.sort_unstable();
    names
}

pub fn lookup_data_source(type_name: &str) -> Option<Box<dyn DynDataSource>> {
    data_sources()
        .into_iter()
        .find(|d| d.type_name() == type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        assert_eq!(
            resource_types(),
            vec![
                "tencentcloud_bi_project",
                "tencentcloud_cfs_file_system",
                "tencentcloud_cfs_snapshot",
                "tencentcloud_dc_gateway",
                "tencentcloud_eks_cluster",
                "tencentcloud_postgresql_readonly_instance",
                "tencentcloud_sqlserver_db",
                "tencentcloud_sqlserver_migration",
            ]
        );
        assert_eq!(
            data_source_types(),
            vec![
                "tencentcloud_cfs_file_systems",
                "tencentcloud_dc_gateways",
                "tencentcloud_eks_clusters",
            ]
        );
        assert!(lookup_resource("tencentcloud_sqlserver_db").is_some());
        assert!(lookup_resource("tencentcloud_instance").is_none());
        assert!(lookup_data_source("tencentcloud_eks_clusters").is_some());
    }

    #[test]
    fn test_or_absent() {
        use crate::error::{CoreError, SdkError};

        let gone: Result<Option<()>> =
            Err(SdkError::new("ResourceNotFound.FileSystemNotFound", "", "r").into());
        assert_eq!(or_absent(gone).unwrap(), None);

        let denied: Result<Option<()>> = Err(CoreError::Validation("bad".into()));
        assert!(or_absent(denied).is_err());
        assert_eq!(or_absent(Ok(Some(1))).unwrap(), Some(1));
    }

    #[test]
    fn test_resource_data_without_state() {
        let data: ResourceData<serde_json::Value, serde_json::Value> =
            serde_json::from_str(r#"{"id":"cfs-1","config":{}}"#).unwrap();
        assert_eq!(data.id, "cfs-1");
        assert_eq!(data.state, None);
    }
}
