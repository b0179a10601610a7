use crate::discord::commands::expenses::PayerChoice;
use crate::discord::commands::{
    fit_lines, more_footer, report, truncate_chars, DESCRIPTION_LIMIT, MESSAGE_LIMIT,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Things we want someday
#[poise::command(slash_command, subcommands("add", "list"))]
pub async fn wish(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Make a wish
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "What do you want?"] item: String,
    #[description = "Whose wish is it?"] wisher: PayerChoice,
    #[description = "Anything else to know (link, size, color...)"] note: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx
        .data()
        .homepage
        .add_wish(&item, wisher.into(), note.as_deref())
        .await
    {
        Ok(entry) => {
            let message = format!("🌠 {} wished for **{}**", entry.wisher, entry.item);
            ctx.say(truncate_chars(&message, MESSAGE_LIMIT)).await?;
            Ok(())
        }
        Err(err) => report(ctx, err).await,
    }
}

/// The whole wishlist
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let wishes = match ctx.data().homepage.wishes().await {
        Ok(wishes) => wishes,
        Err(err) => return report(ctx, err).await,
    };

    if wishes.is_empty() {
        ctx.say("The wishlist is empty. Make a wish with `/wish add`!")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = wishes
        .iter()
        .map(|w| match &w.note {
            Some(note) => format!("**{}** ({}): {note}", w.item, w.wisher),
            None => format!("**{}** ({})", w.item, w.wisher),
        })
        .collect();
    let (description, omitted) = fit_lines(&lines, DESCRIPTION_LIMIT);

    let mut embed = serenity::CreateEmbed::new()
        .title("🎁 願望清單")
        .description(description)
        .color(0x9B59B6);
    if let Some(more) = more_footer(omitted) {
        embed = embed.footer(serenity::CreateEmbedFooter::new(more));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
