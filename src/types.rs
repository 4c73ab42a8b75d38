/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

use crate::filter::TableRecord;

/// Mutations an operator can apply to a listed collection.
/// Used by services and by the local snapshot to decide how to stay current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Create,
    Update { id: String },
    Delete { ids: Vec<String> },
    Recover { id: String },
    Membership { id: String }, // Relation arrays replaced wholesale
}

impl Mutation {
    /// Creates, recovers and membership edits change server-computed fields
    /// (relations, counters), so the list is fetched again. Updates and
    /// deletes are spliced into the snapshot.
    pub fn requires_refetch(&self) -> bool {
        matches!(self, Mutation::Create | Mutation::Recover { .. } | Mutation::Membership { .. })
    }
}

/// Client-side copy of a collection between fetches
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot<R> {
    records: Vec<R>,
}

impl<R: TableRecord + Clone> TableSnapshot<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns how many records were removed
    pub fn remove_ids(&mut self, ids: &[String]) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.iter().any(|id| id == r.id()));
        before - self.records.len()
    }

    /// Replace in place when the ID is known, otherwise prepend
    pub fn upsert(&mut self, record: R) {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.records.insert(0, record),
        }
    }

    /// Splice a finished mutation in. Returns true when the snapshot cannot
    /// be patched locally and the caller has to refetch.
    pub fn apply(&mut self, mutation: &Mutation, record: Option<R>) -> bool {
        if mutation.requires_refetch() {
            return true;
        }
        match (mutation, record) {
            (Mutation::Delete { ids }, _) => {
                let removed = self.remove_ids(ids);
                tracing::debug!(removed, requested = ids.len(), "spliced deleted rows");
                false
            }
            (Mutation::Update { .. }, Some(record)) => {
                self.upsert(record);
                false
            }
            _ => true,
        }
    }
}

/// Page index to show after deleting `deleted` rows.
///
/// `rows_in_page` is how many rows the current page showed and `filtered` how
/// many rows matched the filters, both counted before the delete.
pub fn adjust_page_after_delete(
    page_index: usize,
    page_size: usize,
    rows_in_page: usize,
    filtered: usize,
    deleted: usize,
) -> usize {
    if deleted == 0 || page_index == 0 {
        return page_index;
    }
    if deleted == rows_in_page {
        page_index - 1
    } else if deleted >= filtered {
        0
    } else if deleted > rows_in_page && page_size > 0 {
        let remaining = filtered - deleted;
        remaining.div_ceil(page_size).saturating_sub(1).min(page_index)
    } else {
        page_index
    }
}
