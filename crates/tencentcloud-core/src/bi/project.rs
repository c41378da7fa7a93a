//! `tencentcloud_bi_project`

use super::ProjectRequest;
use crate::error::{CoreError, Result};
use crate::provider::Provider;
use crate::resource::{Resource, or_absent};
use crate::retry::retry_call;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiProjectConfig {
    pub name: String,
    /// Palette entry such as `#7BD936`
    pub color_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
}

impl BiProjectConfig {
    fn request(&self, id: Option<i64>) -> ProjectRequest {
        ProjectRequest {
            id,
            name: self.name.clone(),
            color_code: self.color_code.clone(),
            logo: self.logo.clone(),
            mark: self.mark.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiProjectState {
    pub name: String,
    pub color_code: String,
    pub logo: String,
    pub mark: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct BiProject;

fn project_id(id: &str) -> Result<i64> {
    id.parse()
        .map_err(|_| CoreError::Validation(format!("project id `{id}` is not numeric")))
}

#[async_trait]
impl Resource for BiProject {
    const TYPE_NAME: &'static str = "tencentcloud_bi_project";
    const IMMUTABLE: &'static [&'static str] = &[];

    type Config = BiProjectConfig;
    type State = BiProjectState;

    async fn create(&self, provider: &Provider, config: &Self::Config) -> Result<String> {
        let bi = &provider.bi();
        let request = config.request(None);
        let id = retry_call(provider.timeouts().write_policy(), || {
            bi.create_project(&request)
        })
        .await?;
        Ok(id.to_string())
    }

    async fn read(
        &self,
        provider: &Provider,
        id: &str,
        _config: &Self::Config,
    ) -> Result<Option<Self::State>> {
        let project_id = project_id(id)?;
        let bi = &provider.bi();
        let project = or_absent(
            retry_call(provider.timeouts().read_policy(), || {
                bi.describe_project(project_id)
            })
            .await,
        )?;

        Ok(project.map(|p| BiProjectState {
            name: p.name,
            color_code: p.color_code,
            logo: p.logo,
            mark: p.mark,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }))
    }

    async fn update(
        &self,
        provider: &Provider,
        id: &str,
        old: &Self::Config,
        new: &Self::Config,
    ) -> Result<()> {
        if old == new {
            return Ok(());
        }
        // ModifyProject replaces every attribute
        let request = new.request(Some(project_id(id)?));
        let bi = &provider.bi();
        retry_call(provider.timeouts().write_policy(), || {
            bi.modify_project(&request)
        })
        .await
    }

    async fn delete(&self, provider: &Provider, id: &str, _config: &Self::Config) -> Result<()> {
        let project_id = project_id(id)?;
        let bi = &provider.bi();
        retry_call(provider.timeouts().write_policy(), || {
            bi.delete_project(project_id)
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

    fn config(mark: &str) -> BiProjectConfig {
        BiProjectConfig {
            name: "sales".into(),
            color_code: "#7BD936".into(),
            logo: None,
            mark: Some(mark.into()),
        }
    }

    fn project(mark: &str) -> serde_json::Value {
        json!({"Data": {
            "Id": 11,
            "Name": "sales",
            "ColorCode": "#7BD936",
            "Mark": mark,
            "CreatedAt": "2023-05-01 10:00:00",
        }})
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let stub = StubTransport::new();
        stub.ok("CreateProject", json!({"Data": {"Id": 11}}));
        stub.ok("DescribeProjectInfo", project("q1"));
        stub.ok("ModifyProject", json!({}));
        stub.ok("DescribeProjectInfo", project("q2"));
        stub.ok("DeleteProject", json!({}));
        let provider = provider(&stub);

        let data = create(&BiProject, &provider, config("q1")).await.unwrap();
        assert_eq!(data.id, "11");
        assert_eq!(data.state.as_ref().unwrap().mark, "q1");

        let data = update(&BiProject, &provider, &data, config("q2")).await.unwrap();
        assert_eq!(
            stub.last_payload("ModifyProject").unwrap(),
            json!({"Id": 11, "Name": "sales", "ColorCode": "#7BD936", "Mark": "q2"})
        );
        assert_eq!(data.state.as_ref().unwrap().mark, "q2");

        delete(&BiProject, &provider, &data).await.unwrap();
        assert_eq!(stub.last_payload("DeleteProject").unwrap(), json!({"Id": 11}));
    }

    #[tokio::test]
    async fn test_unchanged_update_sends_nothing() {
        let stub = StubTransport::new();
        stub.ok("DescribeProjectInfo", project("q1"));

        let data = ResourceData::new("11", config("q1"));
        update(&BiProject, &provider(&stub), &data, config("q1")).await.unwrap();
        assert_eq!(stub.count("ModifyProject"), 0);
    }

    #[tokio::test]
    async fn test_refresh_missing_project() {
        let stub = StubTransport::new();
        stub.ok("DescribeProjectInfo", json!({"Data": null}));

        let data = ResourceData::new("11", config("q1"));
        assert!(refresh(&BiProject, &provider(&stub), &data).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let stub = StubTransport::new();
        let data = ResourceData::new("prj-11", config("q1"));

        let err = refresh(&BiProject, &provider(&stub), &data).await.unwrap_err();
        assert!(matches!(err.root(), CoreError::Validation(_)));
        assert!(stub.calls().is_empty());
    }
}
