//! Read-only data sources

use super::output::write_result_file;
use crate::error::{CoreError, Result, ResultExt};
use crate::provider::Provider;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::path::Path;
use tracing::info;

/// A query over existing cloud objects
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Type name, e.g. `tencentcloud_cfs_file_systems`
    const TYPE_NAME: &'static str;

    type Filter: DeserializeOwned + Default + Debug + Send + Sync;

    type Item: Serialize + Debug + Send + Sync;

    async fn read(&self, provider: &Provider, filter: &Self::Filter) -> Result<Vec<Self::Item>>;
}

/// Run a data source, optionally saving the result list as JSON
pub async fn read_data_source<D: DataSource>(
    source: &D,
    provider: &Provider,
    filter: &D::Filter,
    result_output_file: Option<&Path>,
) -> Result<Vec<D::Item>> {
    let items = source
        .read(provider, filter)
        .await
        .with_context(|| format!("{} read", D::TYPE_NAME))?;
    info!(data_source = D::TYPE_NAME, count = items.len(), "Data source read");

    if let Some(path) = result_output_file {
        write_result_file(path, &items)?;
    }
    Ok(items)
}

/// A data source driven with JSON documents
#[async_trait]
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// `filter` may be `null` for "no filter"; returns the item list
    async fn read(
        &self,
        provider: &Provider,
        filter: Value,
        result_output_file: Option<&Path>,
    ) -> Result<Value>;
}

/// Adapts a typed [`DataSource`] to [`DynDataSource`]
pub struct TypedDataSource<D>(pub D);

#[async_trait]
impl<D: DataSource> DynDataSource for TypedDataSource<D> {
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    async fn read(
        &self,
        provider: &Provider,
        filter: Value,
        result_output_file: Option<&Path>,
    ) -> Result<Value> {
        let filter: D::Filter = if filter.is_null() {
            D::Filter::default()
        } else {
            serde_json::from_value(filter).map_err(|e| {
                CoreError::Validation(format!("invalid {} filter: {e}", D::TYPE_NAME))
            })?
        };
        let items = read_data_source(&self.0, provider, &filter, result_output_file).await?;
        Ok(serde_json::to_value(items)?)
    }
}
