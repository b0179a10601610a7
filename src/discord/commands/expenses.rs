use crate::core::records::Participant;
use crate::discord::commands::{
    fit_lines, format_amount, report, truncate_chars, DESCRIPTION_LIMIT, MESSAGE_LIMIT,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum PayerChoice {
    #[name = "我"]
    Me,
    #[name = "男朋友"]
    Boyfriend,
}

impl From<PayerChoice> for Participant {
    fn from(value: PayerChoice) -> Self {
        match value {
            PayerChoice::Me => Participant::Me,
            PayerChoice::Boyfriend => Participant::Boyfriend,
        }
    }
}

/// Shared expense ledger
#[poise::command(slash_command, subcommands("add", "list"))]
pub async fn expense(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Record something we paid for today
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "What was it?"] item: String,
    #[description = "How much?"]
    #[min = 0]
    amount: f64,
    #[description = "Who paid?"] payer: PayerChoice,
) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx
        .data()
        .homepage
        .add_expense(&item, amount, payer.into())
        .await
    {
        Ok(entry) => {
            let message = format!(
                "✅ Saved **{}** {} paid by {} on {}",
                entry.item,
                format_amount(entry.amount),
                entry.payer,
                entry.date
            );
            ctx.say(truncate_chars(&message, MESSAGE_LIMIT)).await?;
            Ok(())
        }
        Err(err) => report(ctx, err).await,
    }
}

/// Totals and the latest entries
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let ledger = match ctx.data().homepage.ledger().await {
        Ok(ledger) => ledger,
        Err(err) => return report(ctx, err).await,
    };

    let recent = if ledger.entries.is_empty() {
        "Nothing recorded yet. Add one with `/expense add`.".to_string()
    } else {
        let lines: Vec<String> = ledger
            .recent(RECENT_LIMIT)
            .map(|e| {
                format!(
                    "`{}` **{}** {} ({})",
                    e.date,
                    e.item,
                    format_amount(e.amount),
                    e.payer
                )
            })
            .collect();
        fit_lines(&lines, DESCRIPTION_LIMIT).0
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("💰 記帳本")
        .description(recent)
        .color(0x2ECC71)
        .field("目前總花費", format_amount(ledger.total), false);

    for (payer, spent) in &ledger.by_payer {
        embed = embed.field(payer.label(), format_amount(*spent), true);
    }

    embed = embed.footer(serenity::CreateEmbedFooter::new(ledger_footer(
        ledger.entries.len(),
        ledger.skipped,
    )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Counts for the ledger footer. Unreadable rows are called out because
/// they are missing from the totals above.
fn ledger_footer(entries: usize, skipped: usize) -> String {
    if skipped == 0 {
        format!("{entries} entries in total")
    } else {
        format!(
            "{entries} entries in total · {skipped} unreadable rows not counted, check the sheet"
        )
    }
}
