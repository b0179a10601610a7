// This is the entry point of the couple homepage bot.
//
// **Architecture Overview:**
// - `core/` = Homepage logic (platform-agnostic)
// - `infra/` = Implementations of core traits (Google Sheets, Drive, key sources)
// - `discord/` = Discord-specific adapters (slash commands, presence)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::AppConfig;
use crate::core::credentials::{CredentialError, CredentialResolver};
use crate::core::homepage::HomepageService;
use crate::discord::commands::presence;
use crate::discord::{Data, Error};
use crate::infra::credentials::{KeyFileProvider, SecretStoreProvider};
use crate::infra::google::{
    DriveUploader, GoogleSheetsClient, ServiceAccountAuth, SHEETS_AND_DRIVE_SCOPES,
};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenv::dotenv().ok();

    let config = AppConfig::load()?;

    // ========================================================================
    // SERVICES
    // ========================================================================
    // Credential sources are tried in this order on first use.

    let resolver = Arc::new(CredentialResolver::new(vec![
        Box::new(SecretStoreProvider::new(config.secrets.clone())),
        Box::new(KeyFileProvider::new(config.key_file.clone())),
    ]));

    // A missing key is not fatal: the anniversary and map pages still work,
    // and the sheet-backed commands explain what is missing.
    if let Err(CredentialError::Exhausted { attempts, summary }) = resolver.resolve().await {
        tracing::warn!(
            sources_tried = attempts.len(),
            "Starting without Google credentials: {summary}"
        );
    }

    let auth = Arc::new(ServiceAccountAuth::new(
        Arc::clone(&resolver),
        SHEETS_AND_DRIVE_SCOPES,
    ));
    let homepage = Arc::new(HomepageService::new(
        GoogleSheetsClient::new(Arc::clone(&auth)),
        DriveUploader::new(Arc::clone(&auth)),
        config.homepage.clone(),
    ));

    tracing::info!(
        spreadsheet = %config.homepage.spreadsheet,
        timezone = %config.homepage.timezone,
        uploads = config.homepage.drive_folder_id.is_some(),
        "Homepage service ready"
    );

    let data = Data { homepage };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                tracing::info!("Commands registered, bot is ready");
                presence::on_ready(ctx, &data.homepage.anniversary());

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}

/// Unexpected failures (Discord API errors, panics in argument parsing) end up
/// here. Homepage errors are already answered inside the commands.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                "Command error: {error}"
            );
            let _ = ctx.say("😵 Something went wrong. Please try again.").await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}
