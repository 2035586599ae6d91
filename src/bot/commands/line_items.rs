//! Line item Discord commands - `/budget` and `/sku`.
//!
//! Each command opens an edit session on the regular promotion, applies one
//! change and saves, which reconciles the promotion's remaining balance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::format_amount, handlers::autocomplete},
        core::{
            line_items::{BudgetLineDraft, SkuLineDraft},
            parse_amount,
            reconcile::{EditSession, ReconcileOutcome},
            reference::{ReferenceKind, require_reference_record},
        },
        errors::{Error, Result},
    };
    use rust_decimal::Decimal;

    fn balance_summary(outcome: &ReconcileOutcome) -> String {
        format!(
            "Committed {} of {}; remaining **{}**.",
            format_amount(outcome.regular.credit_budget),
            format_amount(outcome.regular.initial_remaining_balance),
            format_amount(outcome.regular.remaining_balance)
        )
    }

    /// Parent command for budget lines.
    #[poise::command(slash_command, subcommands("budget_set", "budget_remove"))]
    pub async fn budget(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Budget line command. Available subcommands:\n\
            `/budget set <pwp> <account> <amount>` - Add or change an account's budget\n\
            `/budget remove <pwp> <account>` - Remove an account's budget line",
        )
        .await?;
        Ok(())
    }

    /// Adds or changes the budget of one account on a regular promotion.
    #[poise::command(slash_command, rename = "set")]
    pub async fn budget_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Regular promotion code"]
        #[autocomplete = "autocomplete::autocomplete_regular_pwp"]
        pwp: String,
        #[description = "Account code"]
        #[autocomplete = "autocomplete::autocomplete_account"]
        account: String,
        #[description = "Budget (e.g. 2,000.00)"] amount: String,
    ) -> Result<()> {
        let budget = parse_amount(&amount, "Budget")?;
        let db = &ctx.data().database;
        let account = require_reference_record(db, ReferenceKind::Account, &account).await?;

        let mut session = EditSession::open(db, &pwp).await?;
        session.set_budget_line(BudgetLineDraft::new(
            account.code.clone(),
            account.name.clone(),
            budget,
        ))?;
        let outcome = session.save(db).await?;

        ctx.say(format!(
            "✅ `{}` budget for `{}` {} set to {}. {}",
            outcome.regular.code,
            account.code,
            account.name,
            format_amount(budget),
            balance_summary(&outcome)
        ))
        .await?;
        Ok(())
    }

    /// Removes one account's budget line from a regular promotion.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn budget_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Regular promotion code"]
        #[autocomplete = "autocomplete::autocomplete_regular_pwp"]
        pwp: String,
        #[description = "Account code"]
        #[autocomplete = "autocomplete::autocomplete_account"]
        account: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let mut session = EditSession::open(db, &pwp).await?;
        if !session.remove_budget_line(&account) {
            ctx.say(format!("ℹ️ `{pwp}` has no budget line for `{account}`."))
                .await?;
            return Ok(());
        }
        let outcome = session.save(db).await?;

        ctx.say(format!(
            "✅ Removed `{account}` from `{}`. {}",
            outcome.regular.code,
            balance_summary(&outcome)
        ))
        .await?;
        Ok(())
    }

    /// Parent command for SKU lines.
    #[poise::command(slash_command, subcommands("sku_set", "sku_remove"))]
    pub async fn sku(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "SKU line command. Available subcommands:\n\
            `/sku set <pwp> <sku> <srp> <qty> <uom> [discount]` - Add or change a SKU line\n\
            `/sku remove <pwp> <sku>` - Remove a SKU line",
        )
        .await?;
        Ok(())
    }

    /// Adds or changes one SKU line on a regular promotion.
    #[poise::command(slash_command, rename = "set")]
    pub async fn sku_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Regular promotion code"]
        #[autocomplete = "autocomplete::autocomplete_regular_pwp"]
        pwp: String,
        #[description = "SKU code"]
        #[autocomplete = "autocomplete::autocomplete_sku"]
        sku: String,
        #[description = "Suggested retail price per unit"] srp: String,
        #[description = "Quantity"] qty: i32,
        #[description = "Unit of measure (e.g. CS, PC)"] uom: String,
        #[description = "Discount on the whole line (default 0)"] discount: Option<String>,
    ) -> Result<()> {
        let srp = parse_amount(&srp, "SRP")?;
        let discount = discount
            .as_deref()
            .map(|raw| parse_amount(raw, "Discount"))
            .transpose()?
            .unwrap_or(Decimal::ZERO);
        let db = &ctx.data().database;
        let sku = require_reference_record(db, ReferenceKind::Sku, &sku).await?;

        let draft = SkuLineDraft::new(sku.code.clone(), srp, qty, uom, discount);
        let mut session = EditSession::open(db, &pwp).await?;
        session.set_sku_line(draft.clone())?;
        let billing = draft.billing_amount()?;
        let outcome = session.save(db).await?;

        ctx.say(format!(
            "✅ `{}` SKU `{}` {} bills {}. {}",
            outcome.regular.code,
            sku.code,
            sku.name,
            format_amount(billing),
            balance_summary(&outcome)
        ))
        .await?;
        Ok(())
    }

    /// Removes one SKU line from a regular promotion.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn sku_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Regular promotion code"]
        #[autocomplete = "autocomplete::autocomplete_regular_pwp"]
        pwp: String,
        #[description = "SKU code"]
        #[autocomplete = "autocomplete::autocomplete_sku"]
        sku: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let mut session = EditSession::open(db, &pwp).await?;
        if !session.remove_sku_line(&sku) {
            ctx.say(format!("ℹ️ `{pwp}` has no SKU line for `{sku}`."))
                .await?;
            return Ok(());
        }
        let outcome = session.save(db).await?;

        ctx.say(format!(
            "✅ Removed SKU `{sku}` from `{}`. {}",
            outcome.regular.code,
            balance_summary(&outcome)
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
