use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Our little homepage: how long we've been together and what's next.
#[poise::command(slash_command)]
pub async fn home(ctx: Context<'_>) -> Result<(), Error> {
    let homepage = &ctx.data().homepage;
    let summary = homepage.anniversary();
    let today = homepage.today();

    let next = match summary.next_date {
        Some(date) if summary.days_to_next == 0 => {
            format!("🎉 **Today!** Happy {} year anniversary ({date})", summary.next_years)
        }
        Some(date) => format!(
            "**{}** days until our {} year anniversary ({date})",
            summary.days_to_next, summary.next_years
        ),
        None => "No upcoming anniversary found".to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title("💕 Welcome home")
        .description("Everything about us in one place. Pick a page with the slash commands below.")
        .color(0xFF69B4) // Hot pink
        .field(
            "Together since",
            format!("{}\n**{}** days and counting", summary.start, summary.days_together),
            true,
        )
        .field("Next anniversary", next, true)
        .field(
            "Pages",
            "`/expense` 記帳 · `/meal` 今天吃什麼 · `/wish` 願望清單\n\
             `/photo` 照片牆 · `/map` 旅行地圖 · `/restaurant` 餐廳名單",
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(format!("Today is {today}")));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
