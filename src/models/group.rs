use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_flag, deserialize_id, deserialize_text, deserialize_timestamp, EntityRef};
use crate::error::ClientError;
use crate::filter::{FieldValue, TableRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAdminRelation {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub admin: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSchoolRelation {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub school: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub active: Option<bool>,
    #[serde(default)]
    pub group_admin: Vec<GroupAdminRelation>,
    #[serde(default)]
    pub group_school: Vec<GroupSchoolRelation>,
}

impl Group {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn admin_ids(&self) -> Vec<String> {
        self.group_admin.iter().map(|r| r.admin.id.clone()).collect()
    }

    pub fn school_ids(&self) -> Vec<String> {
        self.group_school.iter().map(|r| r.school.id.clone()).collect()
    }
}

impl TableRecord for Group {
    fn sortable_fields() -> &'static [&'static str] {
        &["id", "name", "createdAt", "active", "status", "members"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "createdAt" => self.created_at.map(FieldValue::Date),
            "active" => self.active.map(FieldValue::Bool),
            "status" => self.status().map(FieldValue::Text),
            "members" => self.member_count().map(|n| FieldValue::Number(n as f64)),
            _ => None,
        }
    }

    fn search_terms(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    /// `active` or `inactive`; a missing flag counts as inactive
    fn status(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if self.is_active() { "active" } else { "inactive" }))
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Admin plus school relations
    fn member_count(&self) -> Option<usize> {
        Some(self.group_admin.len() + self.group_school.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreatePayload {
    pub name: String,
    pub admins: Vec<String>,
    pub schools: Vec<String>,
}

impl GroupCreatePayload {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            let mut field_errors = BTreeMap::new();
            field_errors.insert("name".to_string(), "Name is required".to_string());
            return Err(ClientError::validation("Invalid group", field_errors));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schools: Option<Vec<String>>,
}
