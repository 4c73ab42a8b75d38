use serde::Serialize;

use crate::client::{ApiClient, ListResponse};
use crate::error::ClientError;
use crate::models::{Admin, Group, School};

use super::{AdminService, GroupService, SchoolService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSchoolCount {
    pub group_id: String,
    pub group_name: String,
    pub total_schools: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_schools: u64,
    pub total_groups: u64,
    pub total_admins: u64,
    pub schools_by_group: Vec<GroupSchoolCount>,
    pub schools_with_webhook: u64,
    pub schools_without_webhook: u64,
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_entries_overdue: u64,
    pub total_entries_pending: u64,
    pub total_entries_received: u64,
}

impl DashboardStats {
    /// Aggregate the three collections. Admins are counted from the
    /// envelope's `count` when the backend sends one.
    pub fn compute(schools: &[School], groups: &[Group], admins: &ListResponse<Admin>) -> Self {
        let sum = |f: fn(&School) -> u64| schools.iter().map(f).sum::<u64>();

        let mut schools_by_group: Vec<GroupSchoolCount> = groups
            .iter()
            .map(|g| GroupSchoolCount {
                group_id: g.id.clone(),
                group_name: g.name.clone(),
                total_schools: g.group_school.len(),
            })
            .filter(|g| g.total_schools > 0)
            .collect();
        schools_by_group.sort_by(|a, b| {
            a.group_name
                .to_lowercase()
                .cmp(&b.group_name.to_lowercase())
                .then_with(|| a.group_name.cmp(&b.group_name))
        });

        let total_schools = schools.len() as u64;
        let schools_with_webhook = schools.iter().filter(|s| s.has_webhook()).count() as u64;

        Self {
            total_schools,
            total_groups: groups.len() as u64,
            total_admins: admins.total_count(),
            schools_by_group,
            schools_with_webhook,
            schools_without_webhook: total_schools.saturating_sub(schools_with_webhook),
            total_students: sum(|s| s.student_count),
            total_teachers: sum(|s| s.teacher_count),
            total_entries_overdue: sum(|s| s.entry_overdue_count),
            total_entries_pending: sum(|s| s.entry_pending_count),
            total_entries_received: sum(|s| s.entry_received_count),
        }
    }
}

pub struct DashboardOverview<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardOverview<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Fetch schools, groups and admins concurrently. Any failure fails the
    /// whole overview; no partial stats are produced.
    pub async fn load(&self) -> Result<DashboardStats, ClientError> {
        let schools = SchoolService::new(self.client);
        let groups = GroupService::new(self.client);
        let admins = AdminService::new(self.client);

        let (schools, groups, admins) = tokio::try_join!(schools.list(None), groups.get_all(), admins.list())?;

        tracing::debug!(
            schools = schools.items.len(),
            groups = groups.items.len(),
            admins = admins.items.len(),
            "dashboard collections loaded"
        );
        Ok(DashboardStats::compute(&schools.items, &groups.items, &admins))
    }
}
