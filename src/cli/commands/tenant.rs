use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::School;
use crate::services::SchoolService;

/// The active school is sent as the `school-id` header on every request
#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List schools available as tenant")]
    List,

    #[command(about = "Show the active school")]
    Current,

    #[command(about = "Switch to school")]
    Use {
        #[arg(help = "School ID")]
        school_id: String,
    },

    #[command(about = "Stop sending a school id")]
    Clear,
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;

    match cmd {
        TenantCommands::List => {
            let schools = SchoolService::new(&client).list(None).await?;
            if schools.items.is_empty() {
                return output_empty_collection(&output_format, "schools", "No schools available");
            }
            let current = client.session().school_id()?;

            match output_format {
                OutputFormat::Json => {
                    let tenants: Vec<_> = schools
                        .items
                        .iter()
                        .map(|s| json!({ "id": s.id, "name": s.name, "current": current.as_ref() == Some(&s.id) }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "schools": tenants }))?);
                }
                OutputFormat::Text => {
                    let columns: [Column<School>; 2] = [
                        Column { header: "ID", width: 38, cell: |s| s.id.clone() },
                        Column { header: "NAME", width: 40, cell: |s| s.name.clone() },
                    ];
                    print_table(&columns, schools.items.iter());
                    if let Some(id) = current {
                        println!("Active: {}", id);
                    }
                }
            }
            Ok(())
        }
        TenantCommands::Current => match client.session().school_id()? {
            Some(id) => output_current_item(&output_format, "school", &id, json!({ "id": id, "server": client.base_url() })),
            None => output_no_current_item(&output_format, "school"),
        },
        TenantCommands::Use { school_id } => {
            // confirm the school exists and is reachable with the current token
            let school = SchoolService::new(&client).get(&school_id).await?;
            client.session().set_school_id(Some(&school.id))?;
            output_success(
                &output_format,
                &format!("Switched to school '{}'", school.name),
                Some(json!({ "current_school": school.id })),
            )
        }
        TenantCommands::Clear => {
            client.session().set_school_id(None)?;
            output_success(&output_format, "Active school cleared", None)
        }
    }
}
