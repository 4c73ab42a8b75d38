use clap::Subcommand;
use serde_json::json;

use super::{splice_deleted, toggle_members, TableArgs};
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::{Admin, AdminCreatePayload, AdminUpdatePayload};
use crate::services::AdminService;
use crate::types::TableSnapshot;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "List admins")]
    List {
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Show one admin with groups")]
    Show {
        #[arg(help = "Admin ID")]
        id: String,
    },

    #[command(about = "Create admin")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
        #[arg(long = "group", help = "Group ID (repeatable)")]
        groups: Vec<String>,
    },

    #[command(about = "Update admin fields")]
    Update {
        #[arg(help = "Admin ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        password_confirmation: Option<String>,
    },

    #[command(about = "Delete admins and show the page they were listed on")]
    Delete {
        #[arg(required = true, help = "Admin IDs")]
        ids: Vec<String>,
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Toggle group membership; the full resulting list is saved")]
    Groups {
        #[arg(help = "Admin ID")]
        id: String,
        #[arg(long = "toggle", help = "Group ID to add or remove (repeatable)")]
        toggles: Vec<String>,
    },
}

fn columns() -> [Column<Admin>; 5] {
    [
        Column { header: "ID", width: 38, cell: |a| a.id.clone() },
        Column { header: "NAME", width: 28, cell: |a| a.name.clone() },
        Column { header: "EMAIL", width: 32, cell: |a| a.email.clone() },
        Column { header: "STATUS", width: 9, cell: |a| or_dash(a.status.as_ref().map(|s| s.as_str())) },
        Column {
            header: "CREATED",
            width: 10,
            cell: |a| a.created_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string()),
        },
    ]
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let service = AdminService::new(&client);

    match cmd {
        AdminCommands::List { table } => {
            let query = table.to_query::<Admin>()?;
            let admins = service.list().await?;
            let page = query.apply(&admins.items);
            output_page(&output_format, "admins", &page, query.page_spec(), &columns())
        }
        AdminCommands::Show { id } => {
            let admin = service.detail(&id).await?;
            output_record(&output_format, "admin", &admin)
        }
        AdminCommands::Create { name, email, password, password_confirmation, groups } => {
            let payload = AdminCreatePayload { name, email, password, password_confirmation, groups };
            let admin = service.create(&payload).await?;
            output_success(
                &output_format,
                &format!("Admin '{}' created", admin.name),
                Some(json!({ "admin": admin })),
            )
        }
        AdminCommands::Update { id, name, email, password, password_confirmation } => {
            let payload = AdminUpdatePayload { name, email, password, password_confirmation, groups: None };
            let admin = service.update(&id, &payload).await?;
            output_success(
                &output_format,
                &format!("Admin '{}' updated", admin.name),
                Some(json!({ "admin": admin })),
            )
        }
        AdminCommands::Delete { ids, table } => {
            let mut query = table.to_query::<Admin>()?;
            let mut snapshot = TableSnapshot::new(service.list().await?.items);
            for id in &ids {
                service.delete(id).await?;
            }
            splice_deleted(&mut snapshot, &mut query, &ids)?;

            if matches!(output_format, OutputFormat::Text) {
                println!("✓ Deleted {} admin(s)", ids.len());
            }
            let page = query.apply(snapshot.records());
            output_page(&output_format, "admins", &page, query.page_spec(), &columns())
        }
        AdminCommands::Groups { id, toggles } => {
            // always start from the saved list, the backend replaces it wholesale
            let current = service.detail(&id).await?;
            let groups = toggle_members(current.group_ids(), &toggles);
            let admin = service.replace_groups(&id, &groups).await?;
            output_success(
                &output_format,
                &format!("Admin '{}' now in {} group(s)", admin.name, groups.len()),
                Some(json!({ "groups": groups.ids() })),
            )
        }
    }
}
