//! Session commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use hearye_auth::{derive_outstanding_tasks, Authentication, TokenKind};
use hearye_storage::StorageKeys;
use serde::Serialize;
use serde_json::json;
use tracing::info;

const WELCOME: &str = "Welcome to Hear Ye! Browse topics with 'hearye topics' and vote with 'hearye vote'.";

#[derive(Serialize)]
struct AuthenticationReport {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    district: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outstanding_tasks: Option<Vec<u8>>,
}

impl AuthenticationReport {
    fn new(outcome: &Authentication) -> Self {
        let profile = outcome.profile();
        Self {
            authenticated: outcome.succeeded(),
            user_id: profile.map(|p| p.id),
            district: profile.and_then(|p| p.district),
            outstanding_tasks: derive_outstanding_tasks(outcome).codes(),
        }
    }

    fn print(&self, format: &OutputFormat) {
        output::print(self, format, |report| {
            if let Some(id) = report.user_id {
                output::print_row("User", &id.to_string());
            }
            if let Some(district) = report.district {
                output::print_row("District", &district.to_string());
            }
        });
    }
}

/// Sign in with tokens issued by the identity provider.
///
/// Returns whether this was the first sign-in on this device, in which case
/// the welcome text was shown.
pub async fn login(ctx: &Context, identity_access: &str, identity_refresh: &str) -> Result<bool> {
    let outcome = ctx
        .session
        .login_with_identity(identity_access, identity_refresh)
        .await?;

    if !outcome.succeeded() {
        anyhow::bail!("Login failed");
    }

    AuthenticationReport::new(&outcome).print(&ctx.format);

    let storage = ctx.storage();
    let first_login = !storage.get_bool(StorageKeys::ONBOARDED)?.unwrap_or(false);
    if first_login {
        if let OutputFormat::Text = ctx.format {
            println!("{}", WELCOME);
        }
        storage.set_bool(StorageKeys::ONBOARDED, true)?;
    }
    Ok(first_login)
}

/// Re-establish the session the way the app does on startup.
pub async fn launch(ctx: &Context) -> Result<()> {
    let outcome = ctx.session.on_app_launched().await;
    AuthenticationReport::new(&outcome).print(&ctx.format);
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    environment: String,
    api_base_url: String,
    storage_dir: String,
    state: String,
    tokens: Vec<(String, bool)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_valid: Option<bool>,
}

/// Show stored credentials and, with `check`, whether the session is valid.
pub async fn status(ctx: &Context, check: bool) -> Result<()> {
    let mut tokens = Vec::new();
    for kind in TokenKind::ALL {
        tokens.push((kind.to_string(), ctx.session.tokens().get(kind)?.is_some()));
    }

    let session_valid = if check {
        Some(ctx.session.authenticate(false).await.succeeded())
    } else {
        None
    };

    let report = StatusReport {
        environment: format!("{:?}", ctx.config.environment).to_lowercase(),
        api_base_url: ctx.session.api_base_url().to_string(),
        storage_dir: ctx.paths.base_dir().display().to_string(),
        state: ctx.session.state().to_string(),
        tokens,
        session_valid,
    };

    output::print(&report, &ctx.format, |r| {
        output::print_heading("Hear Ye");
        output::print_row("Environment", &r.environment);
        output::print_row("API", &r.api_base_url);
        output::print_row("Storage", &r.storage_dir);
        output::print_heading("Credentials");
        for (kind, present) in &r.tokens {
            output::print_row(kind, if *present { "stored" } else { "-" });
        }
        if let Some(valid) = r.session_valid {
            output::print_row("Session", if valid { "valid" } else { "invalid" });
        }
    });
    Ok(())
}

/// Exchange the stored refresh token for a new one.
pub async fn refresh(ctx: &Context) -> Result<()> {
    if ctx.session.refresh_session().await {
        output::print_success("Session refreshed", &ctx.format);
        Ok(())
    } else {
        anyhow::bail!("Session refresh failed; run 'hearye login'")
    }
}

pub async fn logout(ctx: &Context) -> Result<()> {
    if !ctx.session.logout().await {
        anyhow::bail!("Logout did not complete");
    }
    info!("Logout completed");
    output::print_success("Logged out", &ctx.format);
    Ok(())
}

/// Log out and delete the account. Requires typing `delete` as confirmation.
pub async fn delete_account(ctx: &Context, confirmation: &str) -> Result<()> {
    if confirmation != "delete" {
        anyhow::bail!("Pass --confirm delete to permanently delete your account");
    }
    if !ctx.client.delete_account().await {
        anyhow::bail!("Account was not deleted");
    }
    output::print_success("Account deleted", &ctx.format);
    Ok(())
}

/// Print a stored token.
pub async fn token_get(ctx: &Context, kind: &str) -> Result<()> {
    let token = ctx.session.get_token(kind)?;
    match ctx.format {
        OutputFormat::Text => match token {
            Some(token) => println!("{}", token),
            None => output::print_error(&format!("No {} token stored", kind), &ctx.format),
        },
        OutputFormat::Json => println!("{}", json!({ "kind": kind, "token": token })),
    }
    Ok(())
}
