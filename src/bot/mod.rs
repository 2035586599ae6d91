//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the PWP console, including
//! all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (reference data, promotions, line items, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::{code::CodeBook, page::ListQuery, session::Session},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded settings and the
/// code sequences every create command needs.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Console settings loaded at startup
    pub settings: Arc<Settings>,
    /// Code sequences and retry budget
    pub codes: CodeBook,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Arc<Settings>) -> Self {
        let codes = CodeBook::from_settings(&settings);
        Self {
            database,
            settings,
            codes,
        }
    }

    /// List query with the configured page size.
    #[must_use]
    pub fn list_query(&self, search: Option<String>, page: Option<u64>) -> ListQuery {
        ListQuery::new(search, page.unwrap_or(1), self.settings.console.page_size)
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Builds the operator session for the invoking Discord user.
///
/// The configured operator name wins over the Discord user name.
pub fn session_for(ctx: Context<'_>) -> Session {
    let user_id = ctx.author().id.to_string();
    let name = ctx
        .data()
        .settings
        .operator_name(&user_id)
        .map_or_else(|| ctx.author().name.clone(), str::to_string);
    Session::new(user_id, name)
}

async fn operator_check(ctx: Context<'_>) -> Result<bool> {
    let user_id = ctx.author().id.to_string();
    if ctx.data().settings.is_operator(&user_id) {
        return Ok(true);
    }
    warn!(user_id, command = %ctx.command().name, "Rejected non-operator");
    ctx.say("❌ You are not registered as a PWP console operator.")
        .await?;
    Ok(false)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().qualified_name);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every command the console registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::reference(),
        commands::pwp(),
        commands::budget(),
        commands::sku(),
        commands::attachment(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip(token, settings, database))]
pub async fn run_bot(
    token: String,
    settings: Arc<Settings>,
    database: DatabaseConnection,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            command_check: Some(|ctx| Box::pin(operator_check(ctx))),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, settings))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
