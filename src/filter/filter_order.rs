use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{SortDirection, SortSpec, TableRecord};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"createdAt desc"`, `"name asc"` or a bare `"name"` (ascending)
    pub fn parse(spec: &str) -> Result<SortSpec, FilterError> {
        let mut it = spec.split_whitespace();
        let field = it
            .next()
            .ok_or_else(|| FilterError::InvalidField("Sort field cannot be empty".to_string()))?;
        let direction = match it.next() {
            None => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(d) => return Err(FilterError::InvalidDirection(d.to_string())),
        };
        if let Some(extra) = it.next() {
            return Err(FilterError::InvalidDirection(format!("unexpected token '{}'", extra)));
        }
        Ok(SortSpec::new(field, direction))
    }

    /// Reject sort fields the record type does not expose
    pub fn validate<R: TableRecord>(spec: &SortSpec) -> Result<(), FilterError> {
        if R::sortable_fields().contains(&spec.field.as_str()) {
            Ok(())
        } else {
            Err(FilterError::InvalidField(format!(
                "'{}' (expected one of: {})",
                spec.field,
                R::sortable_fields().join(", ")
            )))
        }
    }

    /// Records without the field sort after every record that has it, in
    /// both directions; only present values follow `direction`.
    pub fn compare<R: TableRecord>(a: &R, b: &R, spec: &SortSpec) -> Ordering {
        match (a.field(&spec.field), b.field(&spec.field)) {
            (Some(x), Some(y)) => spec.direction.apply(x.compare(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Sort `(original_index, record)` pairs. Equal keys fall back to the
    /// original index, so the result is stable even with an unstable primitive.
    pub fn sort<R: TableRecord>(decorated: &mut [(usize, &R)], spec: Option<&SortSpec>) {
        let Some(spec) = spec else {
            return;
        };
        decorated.sort_unstable_by(|(ia, a), (ib, b)| {
            Self::compare(*a, *b, spec).then_with(|| ia.cmp(ib))
        });
    }
}
