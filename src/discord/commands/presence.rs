// Bot presence. Discord SDK glue only.

use crate::core::anniversary::AnniversarySummary;
use poise::serenity_prelude as serenity;

/// Called once the bot is ready: shows the running day count as the activity.
pub fn on_ready(ctx: &serenity::Context, summary: &AnniversarySummary) {
    let activity =
        serenity::ActivityData::custom(format!("💕 Day {} together", summary.days_together));
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
