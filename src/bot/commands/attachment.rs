//! Attachment Discord commands - `/attachment add|list|remove`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, session_for},
        core::attachment::{add_attachment, list_attachments, remove_attachment},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for attachments.
    #[poise::command(
        slash_command,
        subcommands("attachment_add", "attachment_list", "attachment_remove")
    )]
    pub async fn attachment(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Attachment command. Available subcommands:\n\
            `/attachment add <pwp> <file_name> <url>` - Link a file to a promotion\n\
            `/attachment list <pwp>` - Files linked to a promotion\n\
            `/attachment remove <id>` - Unlink a file",
        )
        .await?;
        Ok(())
    }

    /// Links a file to a promotion.
    #[poise::command(slash_command, rename = "add")]
    pub async fn attachment_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        pwp: String,
        #[description = "File name"] file_name: String,
        #[description = "Link to the file"] url: String,
    ) -> Result<()> {
        let session = session_for(ctx);
        let file = add_attachment(&ctx.data().database, &session, &pwp, &file_name, &url).await?;
        ctx.say(format!(
            "📎 Attached #{} **{}** to `{}`.",
            file.id, file.file_name, file.pwp_code
        ))
        .await?;
        Ok(())
    }

    /// Lists the files linked to a promotion.
    #[poise::command(slash_command, rename = "list")]
    pub async fn attachment_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion code"]
        #[autocomplete = "autocomplete::autocomplete_pwp"]
        pwp: String,
    ) -> Result<()> {
        let files = list_attachments(&ctx.data().database, &pwp).await?;
        if files.is_empty() {
            ctx.say(format!("📎 `{pwp}` has no attachments.")).await?;
            return Ok(());
        }

        let mut response = format!("📎 **Attachments of `{pwp}`**\n\n");
        for file in &files {
            writeln!(
                &mut response,
                "#{} [{}]({}) - {} on {}",
                file.id,
                file.file_name,
                file.url,
                file.uploaded_by,
                file.uploaded_at.format("%Y-%m-%d")
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Unlinks a file by its attachment number.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn attachment_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Attachment number shown by /attachment list"] id: i64,
    ) -> Result<()> {
        if remove_attachment(&ctx.data().database, id).await? {
            ctx.say(format!("✅ Removed attachment #{id}.")).await?;
        } else {
            ctx.say(format!("ℹ️ Attachment #{id} does not exist.")).await?;
        }
        Ok(())
    }
}

pub use inner::*;
