use crate::discord::commands::{fit_lines, more_footer, report, DESCRIPTION_LIMIT};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Places we've been or want to go. Markers are kept until the bot restarts.
#[poise::command(slash_command, subcommands("add", "list", "reset"))]
pub async fn map(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Drop a marker
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Latitude (-90 to 90)"] lat: f64,
    #[description = "Longitude (-180 to 180)"] lon: f64,
) -> Result<(), Error> {
    let session = ctx.author().id.get();

    match ctx.data().homepage.add_map_point(session, lat, lon) {
        Ok((point, count)) => {
            ctx.say(format!(
                "📍 Added [{point}]({}), {count} markers on your map",
                point.osm_link()
            ))
            .await?;
            Ok(())
        }
        Err(err) => report(ctx, err).await,
    }
}

/// Your markers
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let points = ctx.data().homepage.map_points(ctx.author().id.get());

    let lines: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, point)| format!("{}. [{point}]({})", i + 1, point.osm_link()))
        .collect();
    let (description, omitted) = fit_lines(&lines, DESCRIPTION_LIMIT);

    let footer = match more_footer(omitted) {
        Some(more) => format!("{more} · Links open OpenStreetMap"),
        None => "Links open OpenStreetMap".to_string(),
    };
    let embed = serenity::CreateEmbed::new()
        .title("🗺️ 旅行地圖")
        .description(description)
        .color(0x3498DB)
        .footer(serenity::CreateEmbedFooter::new(footer));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Start over from the default markers
#[poise::command(slash_command)]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    ctx.data().homepage.reset_map(ctx.author().id.get());
    ctx.say("🗺️ Map reset to the default markers.").await?;
    Ok(())
}
