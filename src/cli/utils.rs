use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::filter::{PageSpec, TablePage};
use crate::membership::MemberPicker;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output current item information in the appropriate format
pub fn output_current_item(
    output_format: &OutputFormat,
    item_type: &str,
    name: &str,
    details: Value,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): details
            }))?);
        }
        OutputFormat::Text => {
            println!("Current {}: {}", item_type, name);
            if let Some(url) = details.get("server").and_then(Value::as_str) {
                println!("Server: {}", url);
            }
        }
    }
    Ok(())
}

/// Output "no current item" message in the appropriate format
pub fn output_no_current_item(
    output_format: &OutputFormat,
    item_type: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): null
            }))?);
        }
        OutputFormat::Text => {
            println!("No current {} set", item_type);
        }
    }
    Ok(())
}

/// Output a single record as pretty JSON in either format
pub fn output_record<T: Serialize>(output_format: &OutputFormat, key: &str, record: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(record)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ key: value }))?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

/// One column of a text table
pub struct Column<R> {
    pub header: &'static str,
    pub width: usize,
    pub cell: fn(&R) -> String,
}

/// Render a page of a client-side table. Text output is a fixed-width table
/// with a page footer; JSON output carries the rows and paging totals.
pub fn output_page<R: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    page: &TablePage<'_, R>,
    page_spec: PageSpec,
    columns: &[Column<R>],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: page.rows,
                "totalMatched": page.total_matched,
                "page": page_spec.page_index,
                "pageSize": page_spec.page_size,
            }))?);
        }
        OutputFormat::Text => {
            if page.is_empty() {
                println!("No {} found", collection_name);
                return Ok(());
            }
            print_table(columns, page.rows.iter().copied());
            println!(
                "{}",
                page_footer(page_spec, page.rows.len(), page.total_matched as u64)
            );
        }
    }
    Ok(())
}

pub fn print_table<'r, R: 'r>(columns: &[Column<R>], rows: impl Iterator<Item = &'r R>) {
    let header: Vec<String> = columns
        .iter()
        .map(|c| format!("{:<width$}", c.header, width = c.width))
        .collect();
    println!("{}", header.join(" ").trim_end());
    let total_width: usize = columns.iter().map(|c| c.width + 1).sum();
    println!("{}", "-".repeat(total_width.saturating_sub(1)));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| format!("{:<width$}", truncate((c.cell)(row), c.width), width = c.width))
            .collect();
        println!("{}", cells.join(" ").trim_end());
    }
}

/// "Showing 11-20 of 42 (page 2)"
pub fn page_footer(page_spec: PageSpec, rows_shown: usize, total: u64) -> String {
    if rows_shown == 0 {
        return format!("Showing 0 of {}", total);
    }
    let first = page_spec.offset() + 1;
    let last = page_spec.offset() + rows_shown;
    format!("Showing {}-{} of {} (page {})", first, last, total, page_spec.page_index + 1)
}

/// Candidates with the current members checked; a failed load shows as loading
pub fn output_picker(output_format: &OutputFormat, members: &[String], picker: &MemberPicker) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "members": members,
                "loading": picker.is_loading(),
                "candidates": picker.candidates(),
            }))?);
        }
        OutputFormat::Text => {
            if picker.is_loading() {
                println!("Loading...");
                return Ok(());
            }
            for candidate in picker.candidates() {
                let mark = if members.contains(&candidate.id) { "[x]" } else { "[ ]" };
                println!("{} {:<38} {}", mark, candidate.id, candidate.name);
            }
        }
    }
    Ok(())
}

fn truncate(text: String, width: usize) -> String {
    if text.chars().count() <= width {
        return text;
    }
    let keep = width.saturating_sub(1);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push('…');
    cut
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
