use serde_json::Value;

use crate::client::{ApiClient, ListResponse, QueryParams};
use crate::error::ClientError;
use crate::membership::{self, MembershipSet, Relation};
use crate::models::{Group, GroupCreatePayload, GroupUpdatePayload};

const BASE_PATH: &str = "/group";

pub struct GroupService<'a> {
    client: &'a ApiClient,
}

impl<'a> GroupService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<ListResponse<Group>, ClientError> {
        let body: Value = self.client.get(BASE_PATH, None).await?;
        ListResponse::from_value(body, "groups")
    }

    /// Every group in one response, for pickers
    pub async fn list_without_pagination(&self) -> Result<Vec<Group>, ClientError> {
        let params = QueryParams::new().set("hasPagination", false);
        let body: Value = self.client.get(BASE_PATH, Some(&params)).await?;
        Ok(ListResponse::from_value(body, "groups")?.items)
    }

    pub async fn get(&self, id: &str) -> Result<Group, ClientError> {
        self.client.get(&format!("{}/{}", BASE_PATH, id), None).await
    }

    pub async fn create(&self, payload: &GroupCreatePayload) -> Result<Group, ClientError> {
        payload.validate()?;
        let group: Group = self.client.post(BASE_PATH, payload).await?;
        tracing::info!("created group {} ({})", group.id, group.name);
        Ok(group)
    }

    pub async fn update(&self, id: &str, payload: &GroupUpdatePayload) -> Result<Group, ClientError> {
        self.client.put(&format!("{}/{}", BASE_PATH, id), payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&format!("{}/{}", BASE_PATH, id)).await?;
        tracing::info!("deleted group {}", id);
        Ok(())
    }

    pub async fn replace_members(
        &self,
        id: &str,
        relation: Relation,
        members: &MembershipSet,
    ) -> Result<Group, ClientError> {
        let payload = membership::group_update(relation, members).ok_or_else(|| {
            ClientError::validation(
                format!("{} cannot be edited from a group", relation.as_str()),
                Default::default(),
            )
        })?;
        self.update(id, &payload).await
    }
}
