use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_opt_id, deserialize_text};
use crate::filter::{FieldValue, TableRecord};

/// Student row from the server-paginated `/students` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub school_id: Option<String>,
    /// Backend value, usually Portuguese ("Ativo", "Cancelado")
    #[serde(default)]
    pub status: Option<String>,
}

impl Student {
    /// Normalized to `active`, `pending` or `banned`
    pub fn normalized_status(&self) -> &'static str {
        normalize_status(self.status.as_deref())
    }
}

pub fn normalize_status(raw: Option<&str>) -> &'static str {
    let v = raw.unwrap_or("").to_lowercase();
    match v.as_str() {
        "cancelado" | "inativo" | "inactive" | "banned" | "desativado" => "banned",
        "pendente" | "pending" => "pending",
        _ => "active",
    }
}

/// Filter value sent to the backend for a UI status
pub fn backend_status(status: &str) -> &str {
    match status {
        "active" => "Ativo",
        "pending" => "Pendente",
        "banned" => "Cancelado",
        "rejected" => "Recusado",
        other => other,
    }
}

impl TableRecord for Student {
    fn sortable_fields() -> &'static [&'static str] {
        &["id", "name", "email", "phoneNumber", "status"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "email" => self.email.as_deref().map(FieldValue::text),
            "phoneNumber" => self.phone_number.as_deref().map(FieldValue::text),
            "status" => Some(FieldValue::text(self.normalized_status())),
            _ => None,
        }
    }

    /// The students view searches by name only
    fn search_terms(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn status(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.normalized_status()))
    }
}
