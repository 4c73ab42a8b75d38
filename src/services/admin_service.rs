use serde_json::Value;

use crate::client::{ApiClient, ListResponse};
use crate::error::ClientError;
use crate::membership::{self, MembershipSet, Relation};
use crate::models::{Admin, AdminCreatePayload, AdminUpdatePayload};

const BASE_PATH: &str = "/admins";

pub struct AdminService<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Whole collection; paging happens client-side
    pub async fn list(&self) -> Result<ListResponse<Admin>, ClientError> {
        let body: Value = self.client.get(BASE_PATH, None).await?;
        ListResponse::from_value(body, "admins")
    }

    pub async fn detail(&self, id: &str) -> Result<Admin, ClientError> {
        self.client.get(&format!("{}/{}", BASE_PATH, id), None).await
    }

    pub async fn create(&self, payload: &AdminCreatePayload) -> Result<Admin, ClientError> {
        payload.validate()?;
        let admin: Admin = self.client.post(BASE_PATH, payload).await?;
        tracing::info!("created admin {} ({})", admin.id, admin.email);
        Ok(admin)
    }

    pub async fn update(&self, id: &str, payload: &AdminUpdatePayload) -> Result<Admin, ClientError> {
        payload.validate()?;
        self.client.put(&format!("{}/{}", BASE_PATH, id), payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&format!("{}/{}", BASE_PATH, id)).await?;
        tracing::info!("deleted admin {}", id);
        Ok(())
    }

    /// Replace the admin's group list with exactly `groups`
    pub async fn replace_groups(&self, id: &str, groups: &MembershipSet) -> Result<Admin, ClientError> {
        let payload = membership::admin_update(Relation::AdminGroups, groups).ok_or_else(|| {
            ClientError::validation("admin groups cannot be edited from an admin", Default::default())
        })?;
        self.update(id, &payload).await
    }
}
