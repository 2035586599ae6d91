//! Promotion Discord commands - the `/pwp` group.
//!
//! Listing, creation, header edits, cascading deletes and the approval
//! workflow for cover and regular promotions.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::format_amount, handlers::autocomplete, session_for},
        core::{
            approval::{ApprovalAction, apply_action, history_for},
            attachment::list_attachments,
            cascade::{delete_cover_pwp, delete_regular_pwp},
            line_items::{budget_lines_for, sku_lines_for},
            listing::{PwpRow, PwpVariant, find_pwp, list_unified},
            parse_amount,
            pwp::{
                CoverPwpForm, HeaderUpdate, RegularPwpForm, create_cover_pwp, create_regular_pwp,
                update_cover_header, update_regular_header,
            },
        },
        entities::sku_line,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Number of history rows shown by `/pwp show`.
    const HISTORY_SHOWN: usize = 5;

    async fn require_pwp(ctx: poise::Context<'_, BotData, Error>, code: &str) -> Result<PwpRow> {
        find_pwp(&ctx.data().database, code)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "Promotion",
                key: code.to_string(),
            })
    }

    /// Parent command for promotions.
    #[poise::command(
        slash_command,
        subcommands(
            "pwp_list",
            "pwp_show",
            "pwp_new_regular",
            "pwp_new_cover",
            "pwp_edit",
            "pwp_delete",
            "pwp_submit",
            "pwp_approve",
            "pwp_reject"
        )
    )]
    pub async fn pwp(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Promotion command. Available subcommands:\n\
            `/pwp list` - Cover and regular promotions, newest first\n\
            `/pwp show <code>` - Details of one promotion\n\
            `/pwp new_regular` - Create a regular promotion\n\
            `/pwp new_cover` - Create a cover promotion\n\
            `/pwp edit <code>` - Change title, budget or cover\n\
            `/pwp delete <code>` - Delete a promotion and its line items\n\
            `/pwp submit|approve|reject <code>` - Approval workflow";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists cover and regular promotions together, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn pwp_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search code, title or distributor"] search: Option<String>,
        #[description = "Page number (default 1)"] page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();
        let query = data.list_query(search, page);
        let page = list_unified(&data.database, &query).await?;

        if page.is_empty() {
            ctx.say("📂 No promotions found. Create one with `/pwp new_regular` or `/pwp new_cover`.")
                .await?;
            return Ok(());
        }

        let mut response = format!(
            "📂 **Promotions** (page {}/{}, {} total)\n\n",
            page.page, page.total_pages, page.total_items
        );
        for row in &page.items {
            writeln!(
                &mut response,
                "`{}` {} **{}** [{}] - budget {} / remaining {}",
                row.code,
                row.variant,
                row.title,
                row.status,
                format_amount(row.amount_budget),
                format_amount(row.remaining_balance)
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows a promotion with its line items, attachments and recent history.
    #[allow(clippy::too_many_lines)]
    #[poise::command(slash_command, rename = "show")]
    pub async fn pwp_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let row = require_pwp(ctx, &code).await?;

        let mut response = format!("📋 **{} PWP `{}`: {}**\n\n", row.variant, row.code, row.title);
        writeln!(&mut response, "🏷️ Status: {} (version {})", row.status, row.version)?;
        writeln!(&mut response, "🚚 Distributor: `{}`", row.distributor_code)?;
        if let Some(cover) = &row.cover_code {
            writeln!(&mut response, "☂️ Cover: `{cover}`")?;
        }
        writeln!(&mut response, "💰 Approved budget: {}", format_amount(row.amount_budget))?;
        writeln!(&mut response, "📉 Committed: {}", format_amount(row.credit_budget))?;
        writeln!(&mut response, "💵 Remaining: {}", format_amount(row.remaining_balance))?;
        writeln!(&mut response, "👤 Created by {} on {}", row.created_by, row.created_at.format("%Y-%m-%d"))?;

        if row.variant == PwpVariant::Regular {
            let budget_lines = budget_lines_for(db, &row.code).await?;
            if !budget_lines.is_empty() {
                response.push_str("\n**Budget lines:**\n");
                for line in &budget_lines {
                    writeln!(
                        &mut response,
                        "• `{}` {} - {}",
                        line.account_code,
                        line.account_name,
                        format_amount(line.budget)
                    )?;
                }
            }

            let sku_lines = sku_lines_for(db, &row.code).await?;
            if !sku_lines.is_empty() {
                response.push_str("\n**SKU lines:**\n");
                for line in &sku_lines {
                    if line.row_type == sku_line::ROW_TYPE_TOTAL {
                        writeln!(
                            &mut response,
                            "• **Total** gross {} less {} = **{}**",
                            format_amount(line.srp),
                            format_amount(line.discount),
                            format_amount(line.billing_amount)
                        )?;
                    } else {
                        writeln!(
                            &mut response,
                            "• `{}` {} x {} {} less {} = {}",
                            line.sku,
                            line.qty,
                            format_amount(line.srp),
                            line.uom,
                            format_amount(line.discount),
                            format_amount(line.billing_amount)
                        )?;
                    }
                }
            }
        }

        let attachments = list_attachments(db, &row.code).await?;
        if !attachments.is_empty() {
            response.push_str("\n**Attachments:**\n");
            for file in &attachments {
                writeln!(&mut response, "• #{} [{}]({})", file.id, file.file_name, file.url)?;
            }
        }

        let history = history_for(db, &row.code).await?;
        if !history.is_empty() {
            response.push_str("\n**Recent history:**\n");
            for entry in history.iter().rev().take(HISTORY_SHOWN) {
                write!(
                    &mut response,
                    "• {} {} by {}",
                    entry.acted_at.format("%Y-%m-%d %H:%M"),
                    entry.action,
                    entry.actor
                )?;
                if let Some(remarks) = &entry.remarks {
                    write!(&mut response, ": {remarks}")?;
                }
                writeln!(&mut response)?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Creates a regular promotion.
    #[poise::command(slash_command, rename = "new_regular")]
    pub async fn pwp_new_regular(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Title"] title: String,
        #[description = "Distributor code"]
        #[autocomplete = "autocomplete::autocomplete_distributor"]
        distributor: String,
        #[description = "Activity code"]
        #[autocomplete = "autocomplete::autocomplete_activity"]
        activity: String,
        #[description = "Approved budget (e.g. 10,000.00)"] amount: String,
        #[description = "Cover promotion to file this under"]
        #[autocomplete = "autocomplete::autocomplete_cover_pwp"]
        cover: Option<String>,
    ) -> Result<()> {
        let amount_budget = parse_amount(&amount, "Approved budget")?;
        let session = session_for(ctx);
        let data = ctx.data();

        let regular = create_regular_pwp(
            &data.database,
            &data.codes,
            &session,
            RegularPwpForm {
                title,
                distributor_code: distributor,
                activity_code: activity,
                cover_code: cover,
                amount_budget,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Created regular PWP `{}` **{}** with a budget of {}.",
            regular.code,
            regular.title,
            format_amount(regular.amount_budget)
        ))
        .await?;
        Ok(())
    }

    /// Creates a cover promotion.
    #[poise::command(slash_command, rename = "new_cover")]
    pub async fn pwp_new_cover(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Title"] title: String,
        #[description = "Distributor code"]
        #[autocomplete = "autocomplete::autocomplete_distributor"]
        distributor: String,
        #[description = "Approved budget (e.g. 50,000.00)"] amount: String,
    ) -> Result<()> {
        let amount_budget = parse_amount(&amount, "Approved budget")?;
        let session = session_for(ctx);
        let data = ctx.data();

        let cover = create_cover_pwp(
            &data.database,
            &data.codes,
            &session,
            CoverPwpForm {
                title,
                distributor_code: distributor,
                amount_budget,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Created cover PWP `{}` **{}** with a budget of {}.",
            cover.code,
            cover.title,
            format_amount(cover.amount_budget)
        ))
        .await?;
        Ok(())
    }

    /// Changes a promotion's title, approved budget or cover.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn pwp_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
        #[description = "New title"] title: Option<String>,
        #[description = "New approved budget"] amount: Option<String>,
        #[description = "Move under this cover (regular promotions)"]
        #[autocomplete = "autocomplete::autocomplete_cover_pwp"]
        cover: Option<String>,
        #[description = "Detach from its cover (regular promotions)"] detach_cover: Option<bool>,
        #[description = "Version shown by /pwp show; rejects the edit if it changed"]
        version: Option<i32>,
    ) -> Result<()> {
        let amount_budget = amount
            .as_deref()
            .map(|raw| parse_amount(raw, "Approved budget"))
            .transpose()?;
        let cover_code = if detach_cover.unwrap_or(false) {
            Some(None)
        } else {
            cover.map(Some)
        };

        if title.is_none() && amount_budget.is_none() && cover_code.is_none() {
            ctx.say("❌ Please specify at least one field to update (title, amount or cover).")
                .await?;
            return Ok(());
        }

        let row = require_pwp(ctx, &code).await?;
        let session = session_for(ctx);
        let db = &ctx.data().database;
        let expected_version = version.unwrap_or(row.version);
        let update = HeaderUpdate {
            title,
            amount_budget,
            cover_code,
        };

        let (version, remaining) = match row.variant {
            PwpVariant::Regular => {
                let updated =
                    update_regular_header(db, &session, &row.code, expected_version, update)
                        .await?;
                (updated.version, updated.remaining_balance)
            }
            PwpVariant::Cover => {
                if update.cover_code.is_some() {
                    ctx.say("❌ Cover promotions cannot be filed under another cover.")
                        .await?;
                    return Ok(());
                }
                let updated =
                    update_cover_header(db, &session, &row.code, expected_version, update).await?;
                (updated.version, updated.remaining_balance)
            }
        };

        ctx.say(format!(
            "✅ Updated `{}` (now version {version}). Remaining balance: {}.",
            row.code,
            format_amount(remaining)
        ))
        .await?;
        Ok(())
    }

    /// Deletes a promotion together with its line items, attachments and history.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn pwp_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
    ) -> Result<()> {
        let session = session_for(ctx);
        let db = &ctx.data().database;

        let Some(row) = find_pwp(db, &code).await? else {
            ctx.say(format!("ℹ️ Promotion `{code}` does not exist; nothing was deleted."))
                .await?;
            return Ok(());
        };

        let outcome = match row.variant {
            PwpVariant::Regular => delete_regular_pwp(db, &session, &row.code).await?,
            PwpVariant::Cover => delete_cover_pwp(db, &session, &row.code).await?,
        };

        ctx.say(format!(
            "✅ Deleted `{}`: {} budget lines, {} SKU lines, {} attachments, {} history entries ({} rows).",
            outcome.code,
            outcome.budget_lines,
            outcome.sku_lines,
            outcome.attachments,
            outcome.approvals,
            outcome.rows_removed()
        ))
        .await?;
        Ok(())
    }

    async fn change_status(
        ctx: poise::Context<'_, BotData, Error>,
        code: &str,
        action: ApprovalAction,
        remarks: Option<String>,
    ) -> Result<()> {
        let session = session_for(ctx);
        let status = apply_action(&ctx.data().database, &session, code, action, remarks).await?;
        ctx.say(format!("✅ `{code}` is now **{status}**.")).await?;
        Ok(())
    }

    /// Sends a draft or rejected promotion for approval.
    #[poise::command(slash_command, rename = "submit")]
    pub async fn pwp_submit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
        #[description = "Remarks"] remarks: Option<String>,
    ) -> Result<()> {
        change_status(ctx, &code, ApprovalAction::Submit, remarks).await
    }

    /// Approves a submitted promotion.
    #[poise::command(slash_command, rename = "approve")]
    pub async fn pwp_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
        #[description = "Remarks"] remarks: Option<String>,
    ) -> Result<()> {
        change_status(ctx, &code, ApprovalAction::Approve, remarks).await
    }

    /// Rejects a submitted promotion. Remarks are required.
    #[poise::command(slash_command, rename = "reject")]
    pub async fn pwp_reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        code: String,
        #[description = "Why the promotion is sent back"] remarks: String,
    ) -> Result<()> {
        change_status(ctx, &code, ApprovalAction::Reject, Some(remarks)).await
    }
}

pub use inner::*;
