use clap::{Subcommand, ValueEnum};
use serde_json::json;

use super::{splice_deleted, toggle_members, TableArgs};
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::membership::{MemberPicker, Relation};
use crate::models::{EntityRef, NamedItem, School, SchoolCreatePayload, SchoolUpdatePayload};
use crate::services::{AdminService, GroupService, SchoolService};
use crate::types::TableSnapshot;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchoolRelation {
    Groups,
    Admins,
    Employees,
}

impl From<SchoolRelation> for Relation {
    fn from(value: SchoolRelation) -> Self {
        match value {
            SchoolRelation::Groups => Relation::SchoolGroups,
            SchoolRelation::Admins => Relation::SchoolAdmins,
            SchoolRelation::Employees => Relation::SchoolEmployees,
        }
    }
}

#[derive(Subcommand)]
pub enum SchoolCommands {
    #[command(about = "List schools with counters")]
    List {
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Show one school")]
    Show {
        #[arg(help = "School ID")]
        id: String,
    },

    #[command(about = "Create school")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Billing provider API token")]
        asaas_token: Option<String>,
        #[arg(long, help = "Use the provider sandbox")]
        sandbox: bool,
        #[arg(long, help = "Homologation mode (webhook not considered configured)")]
        homologation: bool,
        #[arg(long = "material", help = "Default material name (repeatable)")]
        materials: Vec<String>,
        #[arg(long = "category", help = "Category name (repeatable)")]
        categories: Vec<String>,
        #[arg(long = "admin", help = "Admin ID (repeatable)")]
        admins: Vec<String>,
        #[arg(long = "group", help = "Group ID (repeatable)")]
        groups: Vec<String>,
    },

    #[command(about = "Update school fields")]
    Update {
        #[arg(help = "School ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        asaas_token: Option<String>,
        #[arg(long)]
        sandbox: Option<bool>,
    },

    #[command(about = "Delete schools and show the page they were listed on")]
    Delete {
        #[arg(required = true, help = "School IDs")]
        ids: Vec<String>,
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Restore a deleted school")]
    Recover {
        #[arg(help = "School ID")]
        id: String,
    },

    #[command(about = "Show or toggle members; the full resulting list is saved")]
    Members {
        #[arg(help = "School ID")]
        id: String,
        #[arg(long, value_enum)]
        relation: SchoolRelation,
        #[arg(long = "toggle", help = "Member ID to add or remove (repeatable); omit to list candidates")]
        toggles: Vec<String>,
    },
}

fn columns() -> [Column<School>; 7] {
    [
        Column { header: "ID", width: 38, cell: |s| s.id.clone() },
        Column { header: "NAME", width: 28, cell: |s| s.name.clone() },
        Column { header: "STATUS", width: 8, cell: |s| s.billing_status().as_str().to_string() },
        Column { header: "STUDENTS", width: 8, cell: |s| s.student_count.to_string() },
        Column { header: "TEACHERS", width: 8, cell: |s| s.teacher_count.to_string() },
        Column { header: "OVERDUE", width: 7, cell: |s| s.entry_overdue_count.to_string() },
        Column { header: "WEBHOOK", width: 7, cell: |s| (if s.has_webhook() { "yes" } else { "no" }).to_string() },
    ]
}

pub async fn handle(cmd: SchoolCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let service = SchoolService::new(&client);

    match cmd {
        SchoolCommands::List { table } => {
            let query = table.to_query::<School>()?;
            let schools = service.list(None).await?;
            let page = query.apply(&schools.items);
            output_page(&output_format, "schools", &page, query.page_spec(), &columns())
        }
        SchoolCommands::Show { id } => {
            let school = service.get(&id).await?;
            output_record(&output_format, "school", &school)
        }
        SchoolCommands::Create { name, asaas_token, sandbox, homologation, materials, categories, admins, groups } => {
            let payload = SchoolCreatePayload {
                name,
                asaas_token,
                asaas_sandbox_mode: Some(sandbox),
                asaas_homologation_mode: homologation,
                default_materials: materials.into_iter().map(NamedItem::new).collect(),
                categories: categories.into_iter().map(NamedItem::new).collect(),
                admins,
                groups,
            };
            let school = service.create(&payload).await?;
            output_success(
                &output_format,
                &format!("School '{}' created", school.name),
                Some(json!({ "school": school })),
            )
        }
        SchoolCommands::Update { id, name, asaas_token, sandbox } => {
            let payload = SchoolUpdatePayload {
                name,
                asaas_token,
                asaas_sandbox_mode: sandbox,
                ..Default::default()
            };
            let school = service.update(&id, &payload).await?;
            output_success(
                &output_format,
                &format!("School '{}' updated", school.name),
                Some(json!({ "school": school })),
            )
        }
        SchoolCommands::Delete { ids, table } => {
            let mut query = table.to_query::<School>()?;
            let mut snapshot = TableSnapshot::new(service.list(None).await?.items);
            for id in &ids {
                service.delete(id).await?;
            }
            splice_deleted(&mut snapshot, &mut query, &ids)?;

            if matches!(output_format, OutputFormat::Text) {
                println!("✓ Deleted {} school(s)", ids.len());
            }
            let page = query.apply(snapshot.records());
            output_page(&output_format, "schools", &page, query.page_spec(), &columns())
        }
        SchoolCommands::Recover { id } => {
            service.recover(&id).await?;
            output_success(&output_format, &format!("School {} recovered", id), None)
        }
        SchoolCommands::Members { id, relation, toggles } => {
            let current = service.get(&id).await?;
            let existing = match relation {
                SchoolRelation::Groups => current.group_ids(),
                SchoolRelation::Admins => current.admin_ids(),
                SchoolRelation::Employees => current.employee_ids(),
            };

            if toggles.is_empty() {
                let picker = MemberPicker::from_result(candidates(&client, relation).await);
                return output_picker(&output_format, &existing, &picker);
            }

            let members = toggle_members(existing, &toggles);
            let relation: Relation = relation.into();
            let school = service.replace_members(&id, relation, &members).await?;
            output_success(
                &output_format,
                &format!("School '{}' {} saved ({})", school.name, relation.as_str(), members.len()),
                Some(json!({ "members": members.ids() })),
            )
        }
    }
}

async fn candidates(client: &ApiClient, relation: SchoolRelation) -> Result<Vec<EntityRef>, ClientError> {
    Ok(match relation {
        SchoolRelation::Groups => GroupService::new(client)
            .list_without_pagination()
            .await?
            .into_iter()
            .map(|g| EntityRef { id: g.id, name: g.name, email: None })
            .collect(),
        SchoolRelation::Admins | SchoolRelation::Employees => AdminService::new(client)
            .list()
            .await?
            .items
            .into_iter()
            .map(|a| EntityRef { id: a.id, name: a.name, email: Some(a.email) })
            .collect(),
    })
}
