use clap::Subcommand;
use serde_json::json;

use crate::cli::config::load_guard;
use crate::cli::utils::{output_error, output_success, prompt_line};
use crate::cli::OutputFormat;
use crate::error::AdminError;
use crate::session::HttpIdentityProvider;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with an admin account")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => login(&email, password, &output_format).await,
        AuthCommands::Logout => {
            let mut guard = load_guard()?;
            guard.logout()?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => status(&output_format),
    }
}

async fn login(email: &str, password: Option<String>, output_format: &OutputFormat) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password: ")?,
    };

    let provider = HttpIdentityProvider::from_config()?;
    let mut guard = load_guard()?;

    match guard.login(&provider, email, &password).await {
        Ok(session) => output_success(
            output_format,
            &format!("Signed in as {}", session.email),
            Some(json!({
                "email": session.email,
                "user_id": session.user_id,
                "expires_at": session.expires_at,
            })),
        ),
        Err(e) => {
            let error = AdminError::from(e);
            output_error(output_format, &error.message(), Some(error.error_code()))?;
            Err(anyhow::anyhow!("Sign-in failed"))
        }
    }
}

fn status(output_format: &OutputFormat) -> anyhow::Result<()> {
    let guard = load_guard()?;
    match guard.session() {
        Some(session) => output_success(
            output_format,
            &format!("Signed in as {} until {}", session.email, session.expires_at.format("%Y-%m-%d %H:%M UTC")),
            Some(json!({
                "authenticated": true,
                "email": session.email,
                "expires_at": session.expires_at,
            })),
        ),
        None => output_success(
            output_format,
            "Not signed in",
            Some(json!({ "authenticated": false })),
        ),
    }
}
