use serde_json::json;

use crate::client::{ApiClient, QueryParams};
use crate::error::ClientError;
use crate::models::{AllSchoolsWebhooksResponse, BillingWebhook, WebhookListResponse, WebhookStatus};

const BASE_PATH: &str = "/webhooks/asaas";

pub struct WebhookService<'a> {
    client: &'a ApiClient,
}

impl<'a> WebhookService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Webhooks of the active school
    pub async fn list_mine(&self, limit: Option<u64>, offset: Option<u64>) -> Result<WebhookListResponse, ClientError> {
        let params = QueryParams::new().set_opt("limit", limit).set_opt("offset", offset);
        self.client.get(BASE_PATH, Some(&params)).await
    }

    /// Aggregate report across every school
    pub async fn list_all(
        &self,
        status: Option<WebhookStatus>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<AllSchoolsWebhooksResponse, ClientError> {
        let params = QueryParams::new()
            .set_opt("status", status.map(|s| s.as_str()))
            .set_opt("limit", limit)
            .set_opt("offset", offset);
        self.client.get(&format!("{}/all", BASE_PATH), Some(&params)).await
    }

    /// Re-enable an interrupted webhook
    pub async fn enable(&self, id: &str) -> Result<BillingWebhook, ClientError> {
        let webhook: BillingWebhook = self.client.put(&format!("{}/{}", BASE_PATH, id), &json!({})).await?;
        tracing::info!("webhook {} enabled={} interrupted={}", webhook.id, webhook.enabled, webhook.interrupted);
        Ok(webhook)
    }
}
