use crate::core::homepage::HomepageError;
use crate::core::records::PhotoEntry;
use crate::discord::commands::{report, truncate_chars, TITLE_LIMIT};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const DEFAULT_LIMIT: u32 = 5;

/// Our photo wall
#[poise::command(slash_command, subcommands("add", "link", "list"))]
pub async fn photo(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Upload a picture to the wall
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The picture"] picture: serenity::Attachment,
    #[description = "A few words about it"] caption: Option<String>,
) -> Result<(), Error> {
    let is_image = picture
        .content_type
        .as_deref()
        .is_some_and(|mime| mime.starts_with("image/"));
    if !is_image {
        ctx.say("📸 That file isn't a picture.").await?;
        return Ok(());
    }

    if ctx.data().homepage.settings().drive_folder_id.is_none() {
        return report(ctx, HomepageError::UploadsDisabled).await;
    }

    ctx.defer().await?;

    let blob = picture.download().await?;
    tracing::debug!(filename = %picture.filename, bytes = blob.len(), "Downloaded attachment");

    match ctx
        .data()
        .homepage
        .add_photo_upload(blob, &picture.filename, caption.as_deref().unwrap_or(""))
        .await
    {
        Ok(entry) => send_photo(ctx, "📸 Added to the wall", &entry).await,
        Err(err) => report(ctx, err).await,
    }
}

/// Add a picture that's already online (Drive share links work too)
#[poise::command(slash_command)]
pub async fn link(
    ctx: Context<'_>,
    #[description = "Link to the picture"] url: String,
    #[description = "A few words about it"] caption: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx
        .data()
        .homepage
        .add_photo_link(&url, caption.as_deref().unwrap_or(""))
        .await
    {
        Ok(entry) => send_photo(ctx, "📸 Added to the wall", &entry).await,
        Err(err) => report(ctx, err).await,
    }
}

/// The latest pictures, newest first
#[poise::command(slash_command)]
pub async fn list(
    ctx: Context<'_>,
    #[description = "How many (default 5)"]
    #[min = 1]
    #[max = 10]
    limit: Option<u32>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let limit = limit.unwrap_or(DEFAULT_LIMIT) as usize;
    let photos = match ctx.data().homepage.photos(limit).await {
        Ok(photos) => photos,
        Err(err) => return report(ctx, err).await,
    };

    if photos.is_empty() {
        ctx.say("The wall is empty. Add a picture with `/photo add`!")
            .await?;
        return Ok(());
    }

    // One embed per picture so Discord renders each image.
    let reply = photos
        .iter()
        .fold(poise::CreateReply::default(), |reply, entry| {
            reply.embed(photo_embed(entry))
        });
    ctx.send(reply).await?;
    Ok(())
}

/// Caption and date, cut to fit an embed title. Older rows may carry
/// captions longer than the wall accepts today.
fn photo_title(entry: &PhotoEntry) -> String {
    if entry.caption.is_empty() {
        entry.date.to_string()
    } else {
        truncate_chars(&format!("{} · {}", entry.caption, entry.date), TITLE_LIMIT)
    }
}

fn photo_embed(entry: &PhotoEntry) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(photo_title(entry))
        .url(&entry.url)
        .image(&entry.url)
        .color(0xF1C40F)
}

async fn send_photo(ctx: Context<'_>, message: &str, entry: &PhotoEntry) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(message)
            .embed(photo_embed(entry)),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(caption: &str) -> PhotoEntry {
        PhotoEntry {
            date: NaiveDate::from_ymd_opt(2025, 9, 17).unwrap(),
            caption: caption.to_string(),
            url: "https://example.com/a.jpg".to_string(),
        }
    }

    #[test]
    fn titles_fit_discords_limit() {
        assert_eq!(photo_title(&entry("")), "2025-09-17");
        assert_eq!(photo_title(&entry("beach")), "beach · 2025-09-17");

        let long = photo_title(&entry(&"海".repeat(300)));
        assert_eq!(long.chars().count(), TITLE_LIMIT);
    }
}
