//! Many-to-many membership editing.
//!
//! A relation is edited as a set of IDs and always saved whole: the backend
//! replaces the relation with exactly the submitted list. Callers must load
//! the current members before editing.

use serde::{Deserialize, Serialize};

use crate::models::{AdminUpdatePayload, EntityRef, GroupUpdatePayload, SchoolUpdatePayload};

/// Ordered set of member IDs. Insertion order is kept so the submitted list
/// matches what the operator saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSet {
    ids: Vec<String>,
}

impl MembershipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Returns false when already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns false when absent
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    /// Add when absent, remove when present. Returns whether the ID is a
    /// member afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Pure variant of `toggle`
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(id);
        next
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }
}

/// Which side of which relation an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    GroupAdmins,
    GroupSchools,
    SchoolGroups,
    SchoolAdmins,
    SchoolEmployees,
    AdminGroups,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::GroupAdmins => "group admins",
            Relation::GroupSchools => "group schools",
            Relation::SchoolGroups => "school groups",
            Relation::SchoolAdmins => "school admins",
            Relation::SchoolEmployees => "school employees",
            Relation::AdminGroups => "admin groups",
        }
    }
}

/// Full-replacement update bodies. Only the edited relation is present, and
/// it always carries the complete list.
pub fn group_update(relation: Relation, members: &MembershipSet) -> Option<GroupUpdatePayload> {
    match relation {
        Relation::GroupAdmins => Some(GroupUpdatePayload { admins: Some(members.to_vec()), ..Default::default() }),
        Relation::GroupSchools => Some(GroupUpdatePayload { schools: Some(members.to_vec()), ..Default::default() }),
        _ => None,
    }
}

pub fn school_update(relation: Relation, members: &MembershipSet) -> Option<SchoolUpdatePayload> {
    match relation {
        Relation::SchoolGroups => Some(SchoolUpdatePayload { groups: Some(members.to_vec()), ..Default::default() }),
        Relation::SchoolAdmins => Some(SchoolUpdatePayload { admins: Some(members.to_vec()), ..Default::default() }),
        Relation::SchoolEmployees => Some(SchoolUpdatePayload { employees: Some(members.to_vec()), ..Default::default() }),
        _ => None,
    }
}

pub fn admin_update(relation: Relation, members: &MembershipSet) -> Option<AdminUpdatePayload> {
    match relation {
        Relation::AdminGroups => Some(AdminUpdatePayload { groups: Some(members.to_vec()), ..Default::default() }),
        _ => None,
    }
}

/// Candidates shown in a member picker.
///
/// A failed candidate fetch leaves the picker in `Loading` for good: there is
/// no retry and no error state, the failure is only logged.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberPicker {
    Loading,
    Ready(Vec<EntityRef>),
}

impl MemberPicker {
    pub fn from_result<E: std::fmt::Display>(result: Result<Vec<EntityRef>, E>) -> Self {
        match result {
            Ok(candidates) => MemberPicker::Ready(candidates),
            Err(e) => {
                tracing::warn!("failed to load picker candidates: {}", e);
                MemberPicker::Loading
            }
        }
    }

    pub fn candidates(&self) -> &[EntityRef] {
        match self {
            MemberPicker::Loading => &[],
            MemberPicker::Ready(c) => c,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, MemberPicker::Loading)
    }
}
