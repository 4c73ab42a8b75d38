use clap::{Subcommand, ValueEnum};

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::{BillingWebhook, SchoolWebhooks, WebhookStatus};
use crate::services::WebhookService;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for WebhookStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Active => WebhookStatus::Active,
            StatusArg::Inactive => WebhookStatus::Inactive,
        }
    }
}

#[derive(Subcommand)]
pub enum WebhookCommands {
    #[command(about = "List billing webhooks of the active school")]
    List {
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
    },

    #[command(about = "Webhook report across every school")]
    All {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
    },

    #[command(about = "Re-enable an interrupted webhook")]
    Enable {
        #[arg(help = "Webhook ID")]
        id: String,
    },
}

pub async fn handle(cmd: WebhookCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let service = WebhookService::new(&client);

    match cmd {
        WebhookCommands::List { limit, offset } => {
            let page = service.list_mine(limit, offset).await?;
            if page.data.is_empty() {
                return output_empty_collection(&output_format, "webhooks", "No webhooks registered");
            }
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
                OutputFormat::Text => {
                    let columns: [Column<BillingWebhook>; 4] = [
                        Column { header: "ID", width: 24, cell: |w| w.id.clone() },
                        Column { header: "NAME", width: 24, cell: |w| w.name.clone() },
                        Column { header: "STATE", width: 11, cell: |w| webhook_state(w.enabled, w.interrupted).to_string() },
                        Column { header: "URL", width: 48, cell: |w| w.url.clone() },
                    ];
                    print_table(&columns, page.data.iter());
                    if page.has_more {
                        println!("More webhooks available, use --offset");
                    }
                }
            }
            Ok(())
        }
        WebhookCommands::All { status, limit, offset } => {
            let report = service.list_all(status.map(Into::into), limit, offset).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => {
                    println!(
                        "Schools: {} total, {} processed, {} ok, {} failed",
                        report.total_schools, report.processed, report.ok, report.failed
                    );
                    let summary: Vec<String> = report.summary.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    if !summary.is_empty() {
                        println!("Summary: {}", summary.join(" "));
                    }
                    println!();
                    let columns: [Column<SchoolWebhooks>; 4] = [
                        Column { header: "SCHOOL", width: 30, cell: |i| or_dash(i.school_name.as_deref()) },
                        Column { header: "STATUS", width: 12, cell: |i| i.status.clone() },
                        Column { header: "COUNT", width: 5, cell: |i| i.count.to_string() },
                        Column {
                            header: "ERROR",
                            width: 40,
                            cell: |i| i.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                        },
                    ];
                    print_table(&columns, report.items.iter());
                    let failed = report.failed_items().count();
                    if failed > 0 {
                        tracing::warn!("{} school(s) failed to report webhooks", failed);
                    }
                }
            }
            Ok(())
        }
        WebhookCommands::Enable { id } => {
            let webhook = service.enable(&id).await?;
            output_success(
                &output_format,
                &format!("Webhook '{}' is {}", webhook.name, webhook_state(webhook.enabled, webhook.interrupted)),
                Some(serde_json::json!({ "webhook": webhook })),
            )
        }
    }
}

fn webhook_state(enabled: bool, interrupted: bool) -> &'static str {
    match (enabled, interrupted) {
        (_, true) => "interrupted",
        (true, false) => "enabled",
        (false, false) => "disabled",
    }
}
