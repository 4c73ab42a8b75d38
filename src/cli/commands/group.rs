use clap::{Subcommand, ValueEnum};
use serde_json::json;

use super::{splice_deleted, toggle_members, TableArgs};
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::membership::{MemberPicker, Relation};
use crate::models::{EntityRef, Group, GroupCreatePayload, GroupUpdatePayload};
use crate::services::{AdminService, GroupService, SchoolService};
use crate::types::TableSnapshot;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupRelation {
    Admins,
    Schools,
}

impl From<GroupRelation> for Relation {
    fn from(value: GroupRelation) -> Self {
        match value {
            GroupRelation::Admins => Relation::GroupAdmins,
            GroupRelation::Schools => Relation::GroupSchools,
        }
    }
}

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List groups")]
    List {
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Show one group")]
    Show {
        #[arg(help = "Group ID")]
        id: String,
    },

    #[command(about = "Create group")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "admin", help = "Admin ID (repeatable)")]
        admins: Vec<String>,
        #[arg(long = "school", help = "School ID (repeatable)")]
        schools: Vec<String>,
    },

    #[command(about = "Rename or (de)activate group")]
    Update {
        #[arg(help = "Group ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },

    #[command(about = "Delete groups and show the page they were listed on")]
    Delete {
        #[arg(required = true, help = "Group IDs")]
        ids: Vec<String>,
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Show or toggle members; the full resulting list is saved")]
    Members {
        #[arg(help = "Group ID")]
        id: String,
        #[arg(long, value_enum)]
        relation: GroupRelation,
        #[arg(long = "toggle", help = "Member ID to add or remove (repeatable); omit to list candidates")]
        toggles: Vec<String>,
    },
}

fn columns() -> [Column<Group>; 6] {
    [
        Column { header: "ID", width: 38, cell: |g| g.id.clone() },
        Column { header: "NAME", width: 28, cell: |g| g.name.clone() },
        Column { header: "STATUS", width: 8, cell: |g| (if g.is_active() { "active" } else { "inactive" }).to_string() },
        Column { header: "ADMINS", width: 6, cell: |g| g.group_admin.len().to_string() },
        Column { header: "SCHOOLS", width: 7, cell: |g| g.group_school.len().to_string() },
        Column {
            header: "CREATED",
            width: 10,
            cell: |g| g.created_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string()),
        },
    ]
}

pub async fn handle(cmd: GroupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let service = GroupService::new(&client);

    match cmd {
        GroupCommands::List { table } => {
            let query = table.to_query::<Group>()?;
            let groups = service.get_all().await?;
            let page = query.apply(&groups.items);
            output_page(&output_format, "groups", &page, query.page_spec(), &columns())
        }
        GroupCommands::Show { id } => {
            let group = service.get(&id).await?;
            output_record(&output_format, "group", &group)
        }
        GroupCommands::Create { name, admins, schools } => {
            let group = service.create(&GroupCreatePayload { name, admins, schools }).await?;
            output_success(
                &output_format,
                &format!("Group '{}' created", group.name),
                Some(json!({ "group": group })),
            )
        }
        GroupCommands::Update { id, name, active } => {
            let payload = GroupUpdatePayload { name, active, ..Default::default() };
            let group = service.update(&id, &payload).await?;
            output_success(
                &output_format,
                &format!("Group '{}' updated", group.name),
                Some(json!({ "group": group })),
            )
        }
        GroupCommands::Delete { ids, table } => {
            let mut query = table.to_query::<Group>()?;
            let mut snapshot = TableSnapshot::new(service.get_all().await?.items);
            for id in &ids {
                service.delete(id).await?;
            }
            splice_deleted(&mut snapshot, &mut query, &ids)?;

            if matches!(output_format, OutputFormat::Text) {
                println!("✓ Deleted {} group(s)", ids.len());
            }
            let page = query.apply(snapshot.records());
            output_page(&output_format, "groups", &page, query.page_spec(), &columns())
        }
        GroupCommands::Members { id, relation, toggles } => {
            let current = service.get(&id).await?;
            let existing = match relation {
                GroupRelation::Admins => current.admin_ids(),
                GroupRelation::Schools => current.school_ids(),
            };

            if toggles.is_empty() {
                let picker = MemberPicker::from_result(candidates(&client, relation).await);
                return output_picker(&output_format, &existing, &picker);
            }

            let members = toggle_members(existing, &toggles);
            let relation: Relation = relation.into();
            let group = service.replace_members(&id, relation, &members).await?;
            output_success(
                &output_format,
                &format!("Group '{}' {} saved ({})", group.name, relation.as_str(), members.len()),
                Some(json!({ "members": members.ids() })),
            )
        }
    }
}

async fn candidates(client: &ApiClient, relation: GroupRelation) -> Result<Vec<EntityRef>, ClientError> {
    Ok(match relation {
        GroupRelation::Admins => AdminService::new(client)
            .list()
            .await?
            .items
            .into_iter()
            .map(|a| EntityRef { id: a.id, name: a.name, email: Some(a.email) })
            .collect(),
        GroupRelation::Schools => SchoolService::new(client)
            .list(None)
            .await?
            .items
            .into_iter()
            .map(|s| EntityRef { id: s.id, name: s.name, email: None })
            .collect(),
    })
}
