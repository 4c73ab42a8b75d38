pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod group;
pub mod school;
pub mod student;
pub mod tenant;
pub mod webhook;

use chrono::Duration;
use clap::Args;

use crate::filter::{parse_date_arg, FilterSpec, TableQuery, TableRecord};
use crate::membership::MembershipSet;
use crate::types::{adjust_page_after_delete, Mutation, TableSnapshot};

/// Filter, sort and paging flags shared by the client-side list commands
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    #[arg(long, help = "Case-insensitive match on name or email")]
    pub search: Option<String>,

    #[arg(long, default_value = "all", help = "Exact status, or 'all'")]
    pub status: String,

    #[arg(long, help = "Created on or after (YYYY-MM-DD or RFC 3339)")]
    pub from: Option<String>,

    #[arg(long, help = "Created on or before (YYYY-MM-DD or RFC 3339)")]
    pub to: Option<String>,

    #[arg(long, help = "Minimum member count (groups)")]
    pub min_members: Option<String>,

    #[arg(long, help = "Maximum member count (groups)")]
    pub max_members: Option<String>,

    #[arg(long, help = "Sort as 'field [asc|desc]', e.g. 'createdAt desc'")]
    pub sort: Option<String>,

    #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
    pub page: usize,

    #[arg(long, help = "Rows per page")]
    pub per_page: Option<usize>,
}

impl TableArgs {
    pub fn filter_spec(&self) -> anyhow::Result<FilterSpec> {
        let end_date = match self.to.as_deref() {
            // a bare date covers the whole day
            Some(raw) if raw.trim().len() == 10 => {
                Some(parse_date_arg(raw)? + Duration::days(1) - Duration::milliseconds(1))
            }
            Some(raw) => Some(parse_date_arg(raw)?),
            None => None,
        };
        let spec = FilterSpec {
            name: self.search.clone().unwrap_or_default(),
            status: self.status.clone(),
            start_date: self.from.as_deref().map(parse_date_arg).transpose()?,
            end_date,
            min_members: self.min_members.clone(),
            max_members: self.max_members.clone(),
        };
        if spec.date_error() {
            tracing::warn!("--from is after --to, date range ignored");
        }
        Ok(spec)
    }

    /// Query for records of type `R`; fails on unknown sort fields
    pub fn to_query<R: TableRecord>(&self) -> anyhow::Result<TableQuery> {
        let mut query = TableQuery::new();
        query.filters(self.filter_spec()?);
        if let Some(order) = self.sort.as_deref() {
            query.order(order)?;
        }
        let page_size = self.per_page.unwrap_or(query.page_spec().page_size);
        query.page(self.page.saturating_sub(1), page_size)?;
        query.validate_for::<R>()?;
        Ok(query)
    }
}

/// Drop deleted rows from the snapshot and move the page back when the
/// current one would be left empty
pub fn splice_deleted<R: TableRecord + Clone>(
    snapshot: &mut TableSnapshot<R>,
    query: &mut TableQuery,
    ids: &[String],
) -> anyhow::Result<()> {
    let (rows_in_page, filtered) = {
        let before = query.apply(snapshot.records());
        (before.rows.len(), before.total_matched)
    };
    let before_len = snapshot.len();
    snapshot.apply(&Mutation::Delete { ids: ids.to_vec() }, None);
    let deleted = before_len - snapshot.len();

    let page = query.page_spec();
    let page_index = adjust_page_after_delete(page.page_index, page.page_size, rows_in_page, filtered, deleted);
    if page_index != page.page_index {
        tracing::debug!("page {} emptied by delete, moving to {}", page.page_index, page_index);
    }
    query.page(page_index, page.page_size)?;
    Ok(())
}

/// Start from the current members and flip each toggled ID
pub fn toggle_members(current: Vec<String>, toggles: &[String]) -> MembershipSet {
    let mut set = MembershipSet::from_ids(current);
    for id in toggles {
        set.toggle(id);
    }
    set
}
