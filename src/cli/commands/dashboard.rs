use crate::cli::config::*;
use crate::cli::OutputFormat;
use crate::services::DashboardOverview;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let stats = DashboardOverview::new(&client).load().await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Schools:  {}", stats.total_schools);
            println!("Groups:   {}", stats.total_groups);
            println!("Admins:   {}", stats.total_admins);
            println!("Students: {}", stats.total_students);
            println!("Teachers: {}", stats.total_teachers);
            println!();
            println!(
                "Entries:  {} overdue, {} pending, {} received",
                stats.total_entries_overdue, stats.total_entries_pending, stats.total_entries_received
            );
            println!(
                "Webhooks: {} configured, {} not configured",
                stats.schools_with_webhook, stats.schools_without_webhook
            );

            if !stats.schools_by_group.is_empty() {
                println!();
                println!("{:<30} {}", "GROUP", "SCHOOLS");
                println!("{}", "-".repeat(38));
                for group in &stats.schools_by_group {
                    println!("{:<30} {}", group.group_name, group.total_schools);
                }
            }
        }
    }
    Ok(())
}
