use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid sort field: {0}")]
    InvalidField(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl FilterError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::InvalidField(_) => "INVALID_SORT_FIELD",
            FilterError::InvalidDirection(_) => "INVALID_SORT_DIRECTION",
            FilterError::InvalidPageSize(_) => "INVALID_PAGE_SIZE",
            FilterError::InvalidDate(_) => "INVALID_DATE",
            FilterError::JsonError(_) => "INVALID_JSON",
        }
    }
}
