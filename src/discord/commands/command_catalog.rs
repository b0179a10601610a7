// Discord commands module.
// Each homepage page gets its own command file.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call HomepageService
// 3. Format the response, or turn a HomepageError into friendly text
//
// This layer is THIN - no business logic, just translation.

use crate::core::homepage::{HomepageError, HomepageService};
use crate::infra::google::{DriveUploader, GoogleSheetsClient};
use std::sync::Arc;

pub mod expenses;
pub mod home;
pub mod meals;
pub mod photos;
pub mod presence;
pub mod travel_map;
pub mod wishlist;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// The concrete service wired up in main.rs.
pub type Homepage = HomepageService<GoogleSheetsClient, DriveUploader>;

/// Data that's shared across all commands.
pub struct Data {
    pub homepage: Arc<Homepage>,
}

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        home::home(),
        meals::meal(),
        meals::restaurant(),
        expenses::expense(),
        wishlist::wish(),
        photos::photo(),
        travel_map::map(),
    ]
}

/// Reports a failed homepage call back to the user.
///
/// Homepage failures are expected (missing tab, bad input, no keys) so they
/// end the command normally instead of bubbling up to poise.
pub async fn report(ctx: Context<'_>, err: HomepageError) -> Result<(), Error> {
    tracing::warn!(
        command = %ctx.command().qualified_name,
        user_id = ctx.author().id.get(),
        error = %err,
        "Homepage command failed"
    );
    ctx.say(err.user_message()).await?;
    Ok(())
}

/// Splits a free-text list like `日式, 台式、Italian` into trimmed items.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split([',', '，', '、'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

// Discord limits, counted in characters.
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const TITLE_LIMIT: usize = 256;
pub const FIELD_LIMIT: usize = 1024;
pub const MESSAGE_LIMIT: usize = 2000;

/// No single list line may take more than this, so one huge note
/// cannot crowd out every other entry.
const LINE_LIMIT: usize = 1000;

/// Cuts `text` to at most `max` characters, ending in `…` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Joins as many lines as fit in `limit` characters.
/// Returns the text and how many lines were left out.
pub fn fit_lines(lines: &[String], limit: usize) -> (String, usize) {
    let mut text = String::new();
    let mut used = 0;

    for (shown, line) in lines.iter().enumerate() {
        let line = truncate_chars(line, LINE_LIMIT.min(limit));
        let cost = line.chars().count() + usize::from(shown > 0);
        if used + cost > limit {
            return (text, lines.len() - shown);
        }
        if shown > 0 {
            text.push('\n');
        }
        text.push_str(&line);
        used += cost;
    }

    (text, 0)
}

/// Footer text for a list that did not fit.
pub fn more_footer(omitted: usize) -> Option<String> {
    (omitted > 0).then(|| format!("…and {omitted} more"))
}

/// Renders an amount the way the ledger shows it: no decimals when whole.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("${amount:.0}")
    } else {
        format!("${amount:.2}")
    }
}
