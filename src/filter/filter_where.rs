use super::types::{FilterSpec, TableRecord, STATUS_ALL};

/// Row predicates applied after sorting, in a fixed order:
/// name, status, date range, member bounds.
pub struct FilterWhere;

impl FilterWhere {
    pub fn apply<'a, R: TableRecord>(rows: Vec<&'a R>, spec: &FilterSpec) -> Vec<&'a R> {
        let mut data = rows;

        if !spec.name.is_empty() {
            let needle = spec.name.to_lowercase();
            data.retain(|r| Self::matches_name(*r, &needle));
        }

        if spec.status != STATUS_ALL {
            data.retain(|r| Self::matches_status(*r, &spec.status));
        }

        if spec.date_error() {
            tracing::debug!("start date is after end date, date range filter disabled");
        } else if let (Some(start), Some(end)) = (spec.start_date, spec.end_date) {
            data.retain(|r| r.created_at().is_some_and(|at| start <= at && at <= end));
        }

        let min = Self::parse_member_bound("min_members", spec.min_members.as_deref());
        let max = Self::parse_member_bound("max_members", spec.max_members.as_deref());
        if min.is_some() || max.is_some() {
            data.retain(|r| Self::matches_member_bounds(*r, min, max));
        }

        data
    }

    /// `needle` must already be lowercased
    pub fn matches_name<R: TableRecord>(record: &R, needle: &str) -> bool {
        record
            .search_terms()
            .iter()
            .any(|term| term.to_lowercase().contains(needle))
    }

    pub fn matches_status<R: TableRecord>(record: &R, status: &str) -> bool {
        record.status().as_deref() == Some(status)
    }

    /// Records that do not expose a member count are not constrained
    pub fn matches_member_bounds<R: TableRecord>(record: &R, min: Option<usize>, max: Option<usize>) -> bool {
        let Some(count) = record.member_count() else {
            return true;
        };
        if let Some(min) = min { if count < min { return false; } }
        if let Some(max) = max { if count > max { return false; } }
        true
    }

    /// Malformed input is treated as "no constraint"
    pub fn parse_member_bound(label: &str, raw: Option<&str>) -> Option<usize> {
        let raw = raw?.trim();
        if raw.is_empty() { return None; }
        match raw.parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::warn!("Ignoring malformed {} filter value '{}'", label, raw);
                None
            }
        }
    }
}
