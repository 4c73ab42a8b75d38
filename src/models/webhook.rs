use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{deserialize_opt_id, deserialize_text};

/// Webhook registered with the billing provider for one school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingWebhook {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub send_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /webhooks/asaas` page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookListResponse {
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub data: Vec<BillingWebhook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookStatus {
    Active,
    Inactive,
}

impl WebhookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookStatus::Active => "ACTIVE",
            WebhookStatus::Inactive => "INACTIVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolWebhookItem {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub events_count: u64,
    #[serde(default)]
    pub url: String,
}

/// Per-school entry of the aggregate webhook report. `status` is one of
/// NONE, ACTIVE, INACTIVE, UNCONFIGURED or UNKNOWN; failed entries carry
/// `error_status` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolWebhooks {
    pub ok: bool,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub school_id: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub webhooks: Vec<SchoolWebhookItem>,
    #[serde(default)]
    pub error_status: Option<u16>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// `GET /webhooks/asaas/all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllSchoolsWebhooksResponse {
    pub total_schools: u64,
    pub processed: u64,
    pub ok: u64,
    pub failed: u64,
    #[serde(default)]
    pub summary: BTreeMap<String, u64>,
    #[serde(default)]
    pub items: Vec<SchoolWebhooks>,
}

impl AllSchoolsWebhooksResponse {
    pub fn failed_items(&self) -> impl Iterator<Item = &SchoolWebhooks> {
        self.items.iter().filter(|i| !i.ok)
    }
}
