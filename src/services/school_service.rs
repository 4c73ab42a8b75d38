use serde_json::Value;

use crate::client::{ApiClient, ListResponse, QueryParams};
use crate::error::ClientError;
use crate::membership::{self, MembershipSet, Relation};
use crate::models::{School, SchoolCreatePayload, SchoolDetail, SchoolUpdatePayload};

const BASE_PATH: &str = "/schools";

pub struct SchoolService<'a> {
    client: &'a ApiClient,
}

impl<'a> SchoolService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: Option<&QueryParams>) -> Result<ListResponse<School>, ClientError> {
        let body: Value = self.client.get(BASE_PATH, params).await?;
        ListResponse::from_value(body, "schools")
    }

    pub async fn get(&self, id: &str) -> Result<SchoolDetail, ClientError> {
        self.client.get(&format!("{}/{}", BASE_PATH, id), None).await
    }

    pub async fn create(&self, payload: &SchoolCreatePayload) -> Result<SchoolDetail, ClientError> {
        payload.validate()?;
        let school: SchoolDetail = self.client.post(BASE_PATH, payload).await?;
        tracing::info!("created school {} ({})", school.id, school.name);
        Ok(school)
    }

    pub async fn update(&self, id: &str, payload: &SchoolUpdatePayload) -> Result<SchoolDetail, ClientError> {
        self.client.put(&format!("{}/{}", BASE_PATH, id), payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&format!("{}/{}", BASE_PATH, id)).await?;
        tracing::info!("deleted school {}", id);
        Ok(())
    }

    /// Undo a delete
    pub async fn recover(&self, id: &str) -> Result<(), ClientError> {
        let _: Value = self
            .client
            .put(&format!("{}/{}/recover", BASE_PATH, id), &serde_json::json!({}))
            .await?;
        tracing::info!("recovered school {}", id);
        Ok(())
    }

    /// Replace one of the school's relations with exactly `members`
    pub async fn replace_members(
        &self,
        id: &str,
        relation: Relation,
        members: &MembershipSet,
    ) -> Result<SchoolDetail, ClientError> {
        let payload = membership::school_update(relation, members).ok_or_else(|| {
            ClientError::validation(
                format!("{} cannot be edited from a school", relation.as_str()),
                Default::default(),
            )
        })?;
        self.update(id, &payload).await
    }
}
