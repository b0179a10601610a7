use crate::core::homepage::MealPick;
use crate::core::records::PriceTier;
use crate::discord::commands::{
    fit_lines, more_footer, report, split_list, truncate_chars, DESCRIPTION_LIMIT, FIELD_LIMIT,
    MESSAGE_LIMIT,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum TierChoice {
    #[name = "$ (cheap)"]
    Cheap,
    #[name = "$$ (normal)"]
    Normal,
    #[name = "$$$ (fancy)"]
    Fancy,
}

impl From<TierChoice> for PriceTier {
    fn from(value: TierChoice) -> Self {
        let [cheap, normal, fancy] = PriceTier::ALL;
        match value {
            TierChoice::Cheap => cheap,
            TierChoice::Normal => normal,
            TierChoice::Fancy => fancy,
        }
    }
}

/// Parses `1,3` or `$,$$$` into tiers. Returns the first token that isn't one.
fn parse_tiers(input: &str) -> Result<Vec<PriceTier>, String> {
    split_list(input)
        .into_iter()
        .map(|token| PriceTier::from_text(&token).ok_or(token))
        .collect()
}

/// 今天吃什麼? Let the bot decide.
#[poise::command(slash_command)]
pub async fn meal(
    ctx: Context<'_>,
    #[description = "Price tiers, e.g. `1,2` or `$,$$` (default: any)"] tiers: Option<String>,
    #[description = "Categories, e.g. `日式, 台式` (default: any)"] categories: Option<String>,
) -> Result<(), Error> {
    let tiers = match tiers.as_deref().map(parse_tiers).transpose() {
        Ok(tiers) => tiers,
        Err(token) => {
            ctx.say(format!("⚠️ `{token}` isn't a price tier. Use 1-3 or $ to $$$."))
                .await?;
            return Ok(());
        }
    };
    let categories = categories.as_deref().map(split_list);

    ctx.defer().await?;

    let pick = match ctx.data().homepage.pick_meal(tiers, categories).await {
        Ok(pick) => pick,
        Err(err) => return report(ctx, err).await,
    };

    let embed = match pick {
        MealPick::Restaurant(restaurant) => serenity::CreateEmbed::new()
            .title("🍽️ 今天吃這間!")
            .description(truncate_chars(
                &format!("**{}**", restaurant.name),
                DESCRIPTION_LIMIT,
            ))
            .field("類型", truncate_chars(&restaurant.category, FIELD_LIMIT), true)
            .field("價位", restaurant.price_tier.to_string(), true)
            .color(0xE67E22),
        MealPick::QuickPick(dish) => serenity::CreateEmbed::new()
            .title("🍽️ 今天吃這個!")
            .description(format!("**{dish}**"))
            .footer(serenity::CreateEmbedFooter::new(
                "No restaurants saved yet, so this came from the quick list. Add some with /restaurant add",
            ))
            .color(0xE67E22),
        MealPick::NoMatch => serenity::CreateEmbed::new()
            .title("🤷 Nothing matches")
            .description("No saved restaurant fits those filters. Try loosening them.")
            .color(0x95A5A6),
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Restaurants we like
#[poise::command(slash_command, subcommands("add", "list"))]
pub async fn restaurant(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Save a restaurant for the meal picker
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Restaurant name"] name: String,
    #[description = "Category, e.g. 日式"] category: String,
    #[description = "How pricey?"] price: TierChoice,
) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx
        .data()
        .homepage
        .add_restaurant(&name, &category, price.into())
        .await
    {
        Ok(entry) => {
            let message = format!(
                "✅ Added **{}** ({}, {})",
                entry.name, entry.category, entry.price_tier
            );
            ctx.say(truncate_chars(&message, MESSAGE_LIMIT)).await?;
            Ok(())
        }
        Err(err) => report(ctx, err).await,
    }
}

/// Every saved restaurant
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let restaurants = match ctx.data().homepage.restaurants().await {
        Ok(restaurants) => restaurants,
        Err(err) => return report(ctx, err).await,
    };

    if restaurants.is_empty() {
        ctx.say("No restaurants yet. Add one with `/restaurant add`.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = restaurants
        .iter()
        .map(|r| format!("**{}** · {} · {}", r.name, r.category, r.price_tier))
        .collect();
    let (description, omitted) = fit_lines(&lines, DESCRIPTION_LIMIT);

    let mut embed = serenity::CreateEmbed::new()
        .title("🍜 餐廳名單")
        .description(description)
        .color(0xE67E22);
    if let Some(more) = more_footer(omitted) {
        embed = embed.footer(serenity::CreateEmbedFooter::new(more));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_parse_from_digits_and_dollars() {
        let tiers = parse_tiers("1, $$$").unwrap();
        assert_eq!(tiers, vec![PriceTier::new(1).unwrap(), PriceTier::new(3).unwrap()]);
        assert_eq!(parse_tiers("2,cheap"), Err("cheap".to_string()));
    }

    #[test]
    fn tier_choices_cover_all_tiers() {
        let tiers: Vec<PriceTier> = [TierChoice::Cheap, TierChoice::Normal, TierChoice::Fancy]
            .into_iter()
            .map(PriceTier::from)
            .collect();
        assert_eq!(tiers, PriceTier::ALL.to_vec());
    }
}
