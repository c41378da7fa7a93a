//! Business Intelligence projects

mod project;

pub use project::{BiProject, BiProjectConfig, BiProjectState};

use crate::client::{CloudClient, Service};
use crate::error::{CoreError, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProjectInfo {
    pub id: i64,
    pub name: String,
    pub color_code: String,
    pub logo: String,
    pub mark: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `CreateProject` and, with `Id`, `ModifyProject`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub color_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreatedId {
    id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DataResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Clone)]
pub struct BiService {
    client: CloudClient,
}

impl BiService {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    pub async fn create_project(&self, request: &ProjectRequest) -> Result<i64> {
        let response: DataResponse<CreatedId> = self
            .client
            .call(Service::BI, "CreateProject", request)
            .await?;
        response.data.map(|d| d.id).ok_or_else(|| {
            CoreError::UnexpectedResponse("CreateProject returned no project id".to_string())
        })
    }

    /// `None` when the project does not exist
    pub async fn describe_project(&self, project_id: i64) -> Result<Option<ProjectInfo>> {
        let response: DataResponse<ProjectInfo> = self
            .client
            .call(Service::BI, "DescribeProjectInfo", &json!({ "Id": project_id }))
            .await?;
        Ok(response.data.filter(|p| p.id != 0))
    }

    pub async fn modify_project(&self, request: &ProjectRequest) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(Service::BI, "ModifyProject", request)
            .await?;
        Ok(())
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call(Service::BI, "DeleteProject", &json!({ "Id": project_id }))
            .await?;
        Ok(())
    }
}
