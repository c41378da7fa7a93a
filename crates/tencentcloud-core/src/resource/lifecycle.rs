//! Orchestration around the resource callbacks

use super::{Resource, ResourceData};
use crate::error::{CoreError, Result, ResultExt};
use crate::provider::Provider;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

pub type Data<R> = ResourceData<<R as Resource>::Config, <R as Resource>::State>;

/// Create a resource, then read it back
///
/// A resource that cannot be read right after creation is an error.
pub async fn create<R: Resource>(
    resource: &R,
    provider: &Provider,
    config: R::Config,
) -> Result<Data<R>> {
    let start = Instant::now();
    info!(resource = R::TYPE_NAME, "Creating resource");

    let id = resource
        .create(provider, &config)
        .await
        .with_context(|| format!("{} create", R::TYPE_NAME))?;
    let state = read_existing(resource, provider, &id, &config).await?;

    info!(resource = R::TYPE_NAME, %id, elapsed = ?start.elapsed(), "Resource created");
    Ok(ResourceData {
        id,
        config,
        state: Some(state),
    })
}

/// Read a resource by id; `None` means it is gone and the state should be dropped
pub async fn refresh<R: Resource>(
    resource: &R,
    provider: &Provider,
    data: &Data<R>,
) -> Result<Option<Data<R>>> {
    let start = Instant::now();
    let state = resource
        .read(provider, &data.id, &data.config)
        .await
        .with_context(|| format!("{} {} read", R::TYPE_NAME, data.id))?;

    match state {
        Some(state) => {
            info!(resource = R::TYPE_NAME, id = %data.id, elapsed = ?start.elapsed(), "Resource read");
            Ok(Some(ResourceData {
                id: data.id.clone(),
                config: data.config.clone(),
                state: Some(state),
            }))
        }
        None => {
            warn!(resource = R::TYPE_NAME, id = %data.id, "Resource not found, clearing state");
            Ok(None)
        }
    }
}

/// Apply a planned configuration to an existing resource
///
/// Changes to immutable arguments are rejected before any API call.
pub async fn update<R: Resource>(
    resource: &R,
    provider: &Provider,
    data: &Data<R>,
    planned: R::Config,
) -> Result<Data<R>> {
    check_immutable(R::IMMUTABLE, &data.config, &planned)?;

    let start = Instant::now();
    info!(resource = R::TYPE_NAME, id = %data.id, "Updating resource");
    resource
        .update(provider, &data.id, &data.config, &planned)
        .await
        .with_context(|| format!("{} {} update", R::TYPE_NAME, data.id))?;
    let state = read_existing(resource, provider, &data.id, &planned).await?;

    info!(resource = R::TYPE_NAME, id = %data.id, elapsed = ?start.elapsed(), "Resource updated");
    Ok(ResourceData {
        id: data.id.clone(),
        config: planned,
        state: Some(state),
    })
}

/// Delete a resource
pub async fn delete<R: Resource>(resource: &R, provider: &Provider, data: &Data<R>) -> Result<()> {
    let start = Instant::now();
    info!(resource = R::TYPE_NAME, id = %data.id, "Deleting resource");
    resource
        .delete(provider, &data.id, &data.config)
        .await
        .with_context(|| format!("{} {} delete", R::TYPE_NAME, data.id))?;
    info!(resource = R::TYPE_NAME, id = %data.id, elapsed = ?start.elapsed(), "Resource deleted");
    Ok(())
}

/// Reject a change of any of `fields` between two configurations
pub fn check_immutable<C: Serialize>(fields: &[&str], old: &C, new: &C) -> Result<()> {
    let old = serde_json::to_value(old)?;
    let new = serde_json::to_value(new)?;
    let null = Value::Null;

    for field in fields {
        let before = old.get(field).unwrap_or(&null);
        let after = new.get(field).unwrap_or(&null);
        if before != after {
            return Err(CoreError::ImmutableField((*field).to_string()));
        }
    }
    Ok(())
}

async fn read_existing<R: Resource>(
    resource: &R,
    provider: &Provider,
    id: &str,
    config: &R::Config,
) -> Result<R::State> {
    resource
        .read(provider, id, config)
        .await
        .with_context(|| format!("{} {id} read", R::TYPE_NAME))?
        .ok_or_else(|| CoreError::NotFound {
            kind: R::TYPE_NAME.to_string(),
            id: id.to_string(),
        })
}

/// A resource driven with JSON documents
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn immutable_fields(&self) -> &'static [&'static str];

    async fn create(&self, provider: &Provider, config: Value) -> Result<ResourceData<Value, Value>>;

    async fn refresh(
        &self,
        provider: &Provider,
        data: ResourceData<Value, Value>,
    ) -> Result<Option<ResourceData<Value, Value>>>;

    async fn update(
        &self,
        provider: &Provider,
        data: ResourceData<Value, Value>,
        planned: Value,
    ) -> Result<ResourceData<Value, Value>>;

    async fn delete(&self, provider: &Provider, data: ResourceData<Value, Value>) -> Result<()>;
}

/// Adapts a typed [`Resource`] to [`DynResource`]
pub struct TypedResource<R>(pub R);

impl<R: Resource> TypedResource<R> {
    fn parse<T: DeserializeOwned>(what: &str, value: Value) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("invalid {} {what}: {e}", R::TYPE_NAME)))
    }

    fn typed(data: ResourceData<Value, Value>) -> Result<Data<R>> {
        Ok(ResourceData {
            id: data.id,
            config: Self::parse("config", data.config)?,
            state: data
                .state
                .map(|state| Self::parse("state", state))
                .transpose()?,
        })
    }

    fn erased(data: Data<R>) -> Result<ResourceData<Value, Value>> {
        Ok(ResourceData {
            id: data.id,
            config: serde_json::to_value(data.config)?,
            state: data.state.map(serde_json::to_value).transpose()?,
        })
    }
}

#[async_trait]
impl<R: Resource> DynResource for TypedResource<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn immutable_fields(&self) -> &'static [&'static str] {
        R::IMMUTABLE
    }

    async fn create(&self, provider: &Provider, config: Value) -> Result<ResourceData<Value, Value>> {
        let config = Self::parse("config", config)?;
        Self::erased(create(&self.0, provider, config).await?)
    }

    async fn refresh(
        &self,
        provider: &Provider,
        data: ResourceData<Value, Value>,
    ) -> Result<Option<ResourceData<Value, Value>>> {
        let data = Self::typed(data)?;
        refresh(&self.0, provider, &data)
            .await?
            .map(Self::erased)
            .transpose()
    }

    async fn update(
        &self,
        provider: &Provider,
        data: ResourceData<Value, Value>,
        planned: Value,
    ) -> Result<ResourceData<Value, Value>> {
        let data = Self::typed(data)?;
        let planned = Self::parse("config", planned)?;
        Self::erased(update(&self.0, provider, &data, planned).await?)
    }

    async fn delete(&self, provider: &Provider, data: ResourceData<Value, Value>) -> Result<()> {
        let data = Self::typed(data)?;
        delete(&self.0, provider, &data).await
    }
}
