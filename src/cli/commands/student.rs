use clap::Subcommand;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::filter::{self, FilterOrder, FilterSpec, PageSpec};
use crate::models::Student;
use crate::services::{StudentQuery, StudentService};

#[derive(Subcommand)]
pub enum StudentCommands {
    #[command(about = "List one server-side page of the active school's students")]
    List {
        #[arg(long, help = "Search by name")]
        search: Option<String>,
        #[arg(long, default_value = "all", help = "active, pending, banned, rejected or all")]
        status: String,
        #[arg(long, help = "Sort the rows of this page as 'field [asc|desc]'")]
        sort: Option<String>,
        #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },

    #[command(about = "Delete students")]
    Delete {
        #[arg(required = true, help = "Student IDs")]
        ids: Vec<String>,
    },
}

fn columns() -> [Column<Student>; 4] {
    [
        Column { header: "ID", width: 38, cell: |s| s.id.clone() },
        Column { header: "NAME", width: 28, cell: |s| s.name.clone() },
        Column { header: "EMAIL", width: 32, cell: |s| or_dash(s.email.as_deref()) },
        Column { header: "STATUS", width: 8, cell: |s| s.normalized_status().to_string() },
    ]
}

pub async fn handle(cmd: StudentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let service = StudentService::new(&client);

    match cmd {
        StudentCommands::List { search, status, sort, page, per_page } => {
            let page_spec = PageSpec::new(page.saturating_sub(1), per_page)?;
            let sort = sort.as_deref().map(FilterOrder::parse).transpose()?;
            if let Some(sort) = &sort {
                FilterOrder::validate::<Student>(sort)?;
            }

            let query = StudentQuery {
                page_index: page_spec.page_index,
                per_page,
                search,
                status: Some(status),
            };
            let result = service.list(&query).await?;

            // the server already paged and filtered, only the sort is local
            let rows = filter::query(&result.items, &FilterSpec::default(), sort.as_ref(), PageSpec { page_index: 0, page_size: per_page });

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                    "students": rows.rows,
                    "total": result.total_count(),
                    "page": page,
                    "perPage": per_page,
                }))?),
                OutputFormat::Text => {
                    if rows.is_empty() {
                        println!("No students found");
                        return Ok(());
                    }
                    print_table(&columns(), rows.rows.iter().copied());
                    println!("{}", page_footer(page_spec, rows.rows.len(), result.total_count()));
                }
            }
            Ok(())
        }
        StudentCommands::Delete { ids } => {
            for id in &ids {
                service.delete(id).await?;
            }
            output_success(&output_format, &format!("Deleted {} student(s)", ids.len()), None)
        }
    }
}
