//! Typed wrappers over the backend's REST resources.
//!
//! Each service borrows an `ApiClient`; none of them hold state of their own.

pub mod admin_service;
pub mod dashboard;
pub mod group_service;
pub mod school_service;
pub mod student_service;
pub mod webhook_service;

pub use admin_service::AdminService;
pub use dashboard::{DashboardOverview, DashboardStats, GroupSchoolCount};
pub use group_service::GroupService;
pub use school_service::SchoolService;
pub use student_service::{StudentPage, StudentQuery, StudentService};
pub use webhook_service::WebhookService;
