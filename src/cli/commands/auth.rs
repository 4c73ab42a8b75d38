use std::io::{self, BufRead, Write};

use clap::Subcommand;
use serde_json::json;

use crate::auth::{token, AuthService, SignInParams, SignUpParams};
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Clear the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user and the schools they can act on")]
    Whoami,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Point the CLI at a backend URL")]
    Server {
        #[arg(help = "Base URL, e.g. http://localhost:3333; omit to show the current one")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = resolve_password(password)?;
            let client = build_client()?;
            let auth = AuthService::new(&client);
            let token = auth.sign_in(&SignInParams { email: email.clone(), password }).await?;

            let mut env_config = load_environment_config()?;
            env_config.current_user = Some(email.clone());
            save_environment_config(&env_config)?;

            output_success(
                &output_format,
                &format!("Logged in as {}", email),
                Some(json!({ "expires_at": token::expires_at(&token) })),
            )
        }
        AuthCommands::Logout => {
            let client = build_client()?;
            AuthService::new(&client).sign_out()?;
            client.session().set_school_id(None)?;

            let mut env_config = load_environment_config()?;
            env_config.current_user = None;
            save_environment_config(&env_config)?;

            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let client = build_client()?;
            let auth = AuthService::new(&client);
            let expired = auth.expire_stale_session()?;
            let stored = client.session().token()?;
            let env_config = load_environment_config()?;

            let status = json!({
                "authenticated": stored.as_deref().is_some_and(token::is_valid_token),
                "expired_and_cleared": expired,
                "user": env_config.current_user,
                "expires_at": stored.as_deref().and_then(token::expires_at),
                "school_id": client.session().school_id()?,
                "server": client.base_url(),
            });

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
                OutputFormat::Text => {
                    if expired {
                        println!("Stored session had expired and was cleared");
                    }
                    match stored {
                        Some(t) if token::is_valid_token(&t) => {
                            println!("Authenticated as {}", or_dash(env_config.current_user.as_deref()));
                            if let Some(at) = token::expires_at(&t) {
                                println!("Token expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                            }
                        }
                        Some(_) => println!("Stored token looks invalid; run 'proeduc auth login'"),
                        None => println!("Not authenticated"),
                    }
                    println!("Server: {}", client.base_url());
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            let client = build_client()?;
            let me = AuthService::new(&client).me().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "user": me }))?),
                OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&me)?),
            }
            Ok(())
        }
        AuthCommands::Register { email, first_name, last_name, password } => {
            let password = resolve_password(password)?;
            let client = build_client()?;
            AuthService::new(&client)
                .sign_up(&SignUpParams { email: email.clone(), password, first_name, last_name })
                .await?;
            output_success(&output_format, &format!("Registered and logged in as {}", email), None)
        }
        AuthCommands::Server { url } => match url {
            Some(url) => {
                url::Url::parse(&url)?;
                let mut env_config = load_environment_config()?;
                env_config.server_url = Some(url.trim_end_matches('/').to_string());
                save_environment_config(&env_config)?;
                output_success(&output_format, &format!("Server set to {}", url), None)
            }
            None => output_current_item(
                &output_format,
                "server",
                &server_url()?,
                json!({ "server": server_url()? }),
            ),
        },
    }
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
