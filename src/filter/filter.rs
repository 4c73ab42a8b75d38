use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterSpec, PageSpec, SortSpec, TablePage, TableQueryData, TableRecord};

/// Filter, sort and paginate a snapshot of records.
///
/// Pure: `records` is only borrowed, the result holds references into it.
pub fn query<'a, R: TableRecord>(
    records: &'a [R],
    filters: &FilterSpec,
    sort: Option<&SortSpec>,
    page: PageSpec,
) -> TablePage<'a, R> {
    let data = filtered(records, filters, sort);
    let total_matched = data.len();
    let rows = data
        .into_iter()
        .skip(page.offset())
        .take(page.page_size)
        .collect();
    TablePage { rows, total_matched }
}

/// Sorted and filtered rows, before pagination
pub fn filtered<'a, R: TableRecord>(
    records: &'a [R],
    filters: &FilterSpec,
    sort: Option<&SortSpec>,
) -> Vec<&'a R> {
    let mut decorated: Vec<(usize, &'a R)> = records.iter().enumerate().collect();
    FilterOrder::sort(&mut decorated, sort);
    let sorted = decorated.into_iter().map(|(_, r)| r).collect();
    FilterWhere::apply(sorted, filters)
}

/// Builder around `query` holding the state a list view keeps between renders
#[derive(Debug, Clone)]
pub struct TableQuery {
    filters: FilterSpec,
    sort: Option<SortSpec>,
    page: PageSpec,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl TableQuery {
    pub fn new() -> Self {
        let page_size = crate::config::CONFIG.table.default_page_size.max(1);
        Self {
            filters: FilterSpec::default(),
            sort: None,
            page: PageSpec { page_index: 0, page_size },
        }
    }

    pub fn assign(&mut self, data: TableQueryData) -> Result<&mut Self, FilterError> {
        if let Some(filters) = data.filters { self.filters(filters); }
        if let Some(order) = data.order { self.order(&order)?; }
        let page_index = data.page_index.unwrap_or(self.page.page_index);
        let page_size = data.page_size.unwrap_or(self.page.page_size);
        self.page(page_index, page_size)?;
        Ok(self)
    }

    pub fn filters(&mut self, filters: FilterSpec) -> &mut Self {
        self.filters = filters;
        self
    }

    pub fn order(&mut self, order_spec: &str) -> Result<&mut Self, FilterError> {
        self.sort = Some(FilterOrder::parse(order_spec)?);
        Ok(self)
    }

    pub fn sort(&mut self, sort: SortSpec) -> &mut Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(&mut self, page_index: usize, page_size: usize) -> Result<&mut Self, FilterError> {
        let max_page_size = crate::config::CONFIG.table.max_page_size.unwrap_or(usize::MAX);
        let applied = if page_size > max_page_size {
            if crate::config::CONFIG.table.debug_logging {
                tracing::warn!("Page size {} exceeds max {}, capping to max", page_size, max_page_size);
            }
            max_page_size
        } else {
            page_size
        };
        self.page = PageSpec::new(page_index, applied)?;
        Ok(self)
    }

    /// Changing filters sends the view back to the first page
    pub fn reset_page(&mut self) -> &mut Self {
        self.page.page_index = 0;
        self
    }

    /// Fails when the sort field is not one `R` exposes
    pub fn validate_for<R: TableRecord>(&self) -> Result<(), FilterError> {
        match &self.sort {
            Some(sort) => FilterOrder::validate::<R>(sort),
            None => Ok(()),
        }
    }

    pub fn apply<'a, R: TableRecord>(&self, records: &'a [R]) -> TablePage<'a, R> {
        let page = query(records, &self.filters, self.sort.as_ref(), self.page);
        if crate::config::CONFIG.table.debug_logging {
            tracing::debug!(
                input = records.len(),
                matched = page.total_matched,
                page_index = self.page.page_index,
                page_size = self.page.page_size,
                "table query applied"
            );
        }
        page
    }

    pub fn filter_spec(&self) -> &FilterSpec { &self.filters }

    pub fn sort_spec(&self) -> Option<&SortSpec> { self.sort.as_ref() }

    pub fn page_spec(&self) -> PageSpec { self.page }
}
