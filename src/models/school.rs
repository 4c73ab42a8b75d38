use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{deserialize_count, deserialize_id, deserialize_text, deserialize_timestamp, EntityRef, NamedItem};
use crate::error::ClientError;
use crate::filter::{FieldValue, TableRecord};

/// Billing state derived from the entry counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolBillingStatus {
    Ok,
    Pending,
    Overdue,
}

impl SchoolBillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolBillingStatus::Ok => "ok",
            SchoolBillingStatus::Pending => "pending",
            SchoolBillingStatus::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub asaas_token: Option<String>,
    #[serde(default)]
    pub asaas_homologation_mode: Option<bool>,
    #[serde(default)]
    pub certificate_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub student_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub course_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub class_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub teacher_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub entry_overdue_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub entry_received_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub entry_pending_count: u64,
}

impl School {
    pub fn billing_status(&self) -> SchoolBillingStatus {
        if self.entry_overdue_count > 0 {
            SchoolBillingStatus::Overdue
        } else if self.entry_pending_count > 0 {
            SchoolBillingStatus::Pending
        } else {
            SchoolBillingStatus::Ok
        }
    }

    /// A configured billing token outside homologation mode
    pub fn has_webhook(&self) -> bool {
        self.asaas_token.as_deref().is_some_and(|t| !t.is_empty())
            && !self.asaas_homologation_mode.unwrap_or(false)
    }
}

impl TableRecord for School {
    fn sortable_fields() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "createdAt",
            "status",
            "studentCount",
            "courseCount",
            "classCount",
            "teacherCount",
            "entryOverdueCount",
            "entryReceivedCount",
            "entryPendingCount",
        ]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue<'_>> {
        let count = |n: u64| Some(FieldValue::Number(n as f64));
        match column {
            "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "createdAt" => self.created_at.map(FieldValue::Date),
            "status" => Some(FieldValue::text(self.billing_status().as_str())),
            "studentCount" => count(self.student_count),
            "courseCount" => count(self.course_count),
            "classCount" => count(self.class_count),
            "teacherCount" => count(self.teacher_count),
            "entryOverdueCount" => count(self.entry_overdue_count),
            "entryReceivedCount" => count(self.entry_received_count),
            "entryPendingCount" => count(self.entry_pending_count),
            _ => None,
        }
    }

    fn search_terms(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn status(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.billing_status().as_str()))
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default)]
    pub asaas_token: Option<String>,
    #[serde(default)]
    pub asaas_sandbox_mode: Option<bool>,
    #[serde(default)]
    pub asaas_homologation_mode: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employees: Vec<EntityRef>,
    #[serde(default)]
    pub categories: Vec<NamedItem>,
    #[serde(default)]
    pub materials: Vec<NamedItem>,
    #[serde(default)]
    pub admins: Vec<EntityRef>,
    #[serde(default)]
    pub groups: Vec<EntityRef>,
    /// Fields this client does not model are kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchoolDetail {
    pub fn admin_ids(&self) -> Vec<String> {
        self.admins.iter().map(|a| a.id.clone()).collect()
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    pub fn employee_ids(&self) -> Vec<String> {
        self.employees.iter().map(|e| e.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolCreatePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asaas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asaas_sandbox_mode: Option<bool>,
    pub asaas_homologation_mode: bool,
    #[serde(default)]
    pub default_materials: Vec<NamedItem>,
    #[serde(default)]
    pub categories: Vec<NamedItem>,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl SchoolCreatePayload {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            let mut field_errors = BTreeMap::new();
            field_errors.insert("name".to_string(), "Name is required".to_string());
            return Err(ClientError::validation("Invalid school", field_errors));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asaas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asaas_sandbox_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<NamedItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<NamedItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}
