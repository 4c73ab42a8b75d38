pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Parser)]
#[command(name = "proeduc")]
#[command(about = "ProEduc CLI - Back-office administration for the ProEduc school platform")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Active school selection")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Platform administrators")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Schools")]
    School {
        #[command(subcommand)]
        cmd: commands::school::SchoolCommands,
    },

    #[command(about = "Groups of schools and admins")]
    Group {
        #[command(subcommand)]
        cmd: commands::group::GroupCommands,
    },

    #[command(about = "Students of the active school")]
    Student {
        #[command(subcommand)]
        cmd: commands::student::StudentCommands,
    },

    #[command(about = "Platform overview statistics")]
    Dashboard,

    #[command(about = "Billing provider webhooks")]
    Webhook {
        #[command(subcommand)]
        cmd: commands::webhook::WebhookCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let json_output = matches!(output_format, OutputFormat::Json);

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
        Commands::School { cmd } => commands::school::handle(cmd, output_format).await,
        Commands::Group { cmd } => commands::group::handle(cmd, output_format).await,
        Commands::Student { cmd } => commands::student::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Webhook { cmd } => commands::webhook::handle(cmd, output_format).await,
    };

    if let Err(err) = &result {
        if let (true, Some(client_err)) = (json_output, err.downcast_ref::<ClientError>()) {
            println!("{}", serde_json::to_string_pretty(&client_err.to_json())?);
        }
    }

    result.map_err(explain)
}

/// Attach operator guidance to the client errors that need an action
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::Unauthorized { .. }) => {
            err.context("Session expired or missing; run 'proeduc auth login'")
        }
        Some(ClientError::Validation { field_errors, .. }) if !field_errors.is_empty() => {
            let fields: Vec<String> = field_errors.iter().map(|(f, m)| format!("{}: {}", f, m)).collect();
            let summary = fields.join(", ");
            err.context(summary)
        }
        _ => err,
    }
}
