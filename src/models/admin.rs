use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_text, deserialize_timestamp, EntityRef};
use crate::error::ClientError;
use crate::filter::{FieldValue, TableRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Pending,
    Banned,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Pending => "pending",
            AdminStatus::Banned => "banned",
            AdminStatus::Rejected => "rejected",
            AdminStatus::Unknown => "unknown",
        }
    }
}

impl FromStr for AdminStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(AdminStatus::Active),
            "pending" => Ok(AdminStatus::Pending),
            "banned" => Ok(AdminStatus::Banned),
            "rejected" => Ok(AdminStatus::Rejected),
            other => Err(format!("unknown admin status '{}'", other)),
        }
    }
}

/// Admin as returned by both the list and detail endpoints. The list omits
/// `groups`/`schools`; they default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(default)]
    pub status: Option<AdminStatus>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub groups: Vec<EntityRef>,
    #[serde(default)]
    pub schools: Vec<EntityRef>,
}

impl Admin {
    pub fn group_ids(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    pub fn school_ids(&self) -> Vec<String> {
        self.schools.iter().map(|s| s.id.clone()).collect()
    }
}

impl TableRecord for Admin {
    fn sortable_fields() -> &'static [&'static str] {
        &["id", "name", "email", "status", "createdAt"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "email" => Some(FieldValue::text(&self.email)),
            "status" => self.status.map(|s| FieldValue::text(s.as_str())),
            "createdAt" => self.created_at.map(FieldValue::Date),
            _ => None,
        }
    }

    fn search_terms(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn status(&self) -> Option<Cow<'_, str>> {
        self.status.map(|s| Cow::Borrowed(s.as_str()))
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreatePayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub groups: Vec<String>,
}

impl AdminCreatePayload {
    /// Checked before submit; on failure nothing is sent
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut field_errors = BTreeMap::new();
        if self.name.trim().is_empty() {
            field_errors.insert("name".to_string(), "Name is required".to_string());
        }
        if !self.email.contains('@') {
            field_errors.insert("email".to_string(), "Email must be a valid address".to_string());
        }
        if self.password.len() < 6 {
            field_errors.insert("password".to_string(), "Password must have at least 6 characters".to_string());
        }
        if self.password != self.password_confirmation {
            field_errors.insert("passwordConfirmation".to_string(), "Passwords do not match".to_string());
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::validation("Invalid admin", field_errors))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

impl AdminUpdatePayload {
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut field_errors = BTreeMap::new();
        if let Some(email) = &self.email {
            if !email.contains('@') {
                field_errors.insert("email".to_string(), "Email must be a valid address".to_string());
            }
        }
        if self.password.is_some() && self.password != self.password_confirmation {
            field_errors.insert("passwordConfirmation".to_string(), "Passwords do not match".to_string());
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::validation("Invalid admin", field_errors))
        }
    }
}
