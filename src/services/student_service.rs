use serde_json::Value;

use crate::client::{ApiClient, ListResponse, QueryParams};
use crate::error::ClientError;
use crate::filter::STATUS_ALL;
use crate::models::{backend_status, Student};

const BASE_PATH: &str = "/students";

pub type StudentPage = ListResponse<Student>;

/// Server-side page request. `page_index` is 0-based here and sent 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentQuery {
    pub page_index: usize,
    pub per_page: usize,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self { page_index: 0, per_page: 10, search: None, status: None }
    }
}

impl StudentQuery {
    pub fn to_params(&self) -> QueryParams {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != STATUS_ALL)
            .map(backend_status);

        QueryParams::new()
            .set("hasPagination", true)
            .set("page", self.page_index + 1)
            .set("perPage", self.per_page)
            .set_opt("search", search)
            .set_opt("status", status)
    }
}

pub struct StudentService<'a> {
    client: &'a ApiClient,
}

impl<'a> StudentService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of the active school's students. Sorting and filtering beyond
    /// `search`/`status` only apply to the rows of this page.
    pub async fn list(&self, query: &StudentQuery) -> Result<StudentPage, ClientError> {
        if self.client.session().school_id()?.is_none() {
            tracing::warn!("listing students without an active school");
        }
        let body: Value = self.client.get(BASE_PATH, Some(&query.to_params())).await?;
        ListResponse::from_value(body, "students")
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&format!("{}/{}", BASE_PATH, id)).await?;
        tracing::info!("deleted student {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &QueryParams) -> Vec<(String, String)> {
        params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn params_are_one_based_and_mapped() {
        let query = StudentQuery {
            page_index: 2,
            per_page: 25,
            search: Some("  ana ".to_string()),
            status: Some("banned".to_string()),
        };
        assert_eq!(
            pairs(&query.to_params()),
            vec![
                ("hasPagination".to_string(), "true".to_string()),
                ("page".to_string(), "3".to_string()),
                ("perPage".to_string(), "25".to_string()),
                ("search".to_string(), "ana".to_string()),
                ("status".to_string(), "Cancelado".to_string()),
            ]
        );
    }

    #[test]
    fn blank_search_and_all_status_are_omitted() {
        let query = StudentQuery {
            search: Some("   ".to_string()),
            status: Some("all".to_string()),
            ..Default::default()
        };
        let keys: Vec<_> = pairs(&query.to_params()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["hasPagination", "page", "perPage"]);
    }
}
