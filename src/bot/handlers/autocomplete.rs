//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are codes, since every command looks records up by code.
//! Searches match code or name, so operators can type either.

use crate::{
    bot::BotData,
    core::{
        listing::{PwpVariant, list_unified},
        page::ListQuery,
        reference::{ReferenceKind, list_reference_records},
    },
    errors::Error,
};

/// Discord's limit on autocomplete choices.
const MAX_CHOICES: u64 = 25;

async fn reference_codes(
    ctx: poise::Context<'_, BotData, Error>,
    kind: ReferenceKind,
    partial: &str,
) -> Vec<String> {
    let query = ListQuery::new(Some(partial.to_string()), 1, MAX_CHOICES);
    let Ok(page) = list_reference_records(&ctx.data().database, kind, &query).await else {
        return Vec::new();
    };
    page.items.into_iter().map(|record| record.code).collect()
}

async fn pwp_codes(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
    variant: Option<PwpVariant>,
) -> Vec<String> {
    let query = ListQuery::new(Some(partial.to_string()), 1, MAX_CHOICES);
    let Ok(page) = list_unified(&ctx.data().database, &query).await else {
        return Vec::new();
    };
    page.items
        .into_iter()
        .filter(|row| variant.is_none_or(|v| row.variant == v))
        .map(|row| row.code)
        .collect()
}

/// Suggests distributor codes.
pub async fn autocomplete_distributor(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    reference_codes(ctx, ReferenceKind::Distributor, partial).await
}

/// Suggests activity codes.
pub async fn autocomplete_activity(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    reference_codes(ctx, ReferenceKind::Activity, partial).await
}

/// Suggests account codes.
pub async fn autocomplete_account(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    reference_codes(ctx, ReferenceKind::Account, partial).await
}

/// Suggests SKU codes.
pub async fn autocomplete_sku(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    reference_codes(ctx, ReferenceKind::Sku, partial).await
}

/// Suggests codes of promotions of either variant.
pub async fn autocomplete_pwp(ctx: poise::Context<'_, BotData, Error>, partial: &str) -> Vec<String> {
    pwp_codes(ctx, partial, None).await
}

/// Suggests regular promotion codes.
pub async fn autocomplete_regular_pwp(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    pwp_codes(ctx, partial, Some(PwpVariant::Regular)).await
}

/// Suggests cover promotion codes.
pub async fn autocomplete_cover_pwp(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    pwp_codes(ctx, partial, Some(PwpVariant::Cover)).await
}
