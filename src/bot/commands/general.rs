//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**PWP Console Help**\n\
        Manage promotion (PWP) budgets, line items and reference data.\n\n\
        **Promotions**\n\
        • `/pwp list [search] [page]` - Cover and regular promotions, newest first.\n\
        • `/pwp show <code>` - Header, line items, attachments and history.\n\
        • `/pwp new_regular` / `/pwp new_cover` - Create a promotion.\n\
        • `/pwp edit <code>` - Change title, approved budget or cover.\n\
        • `/pwp delete <code>` - Delete a promotion and everything under it.\n\
        • `/pwp submit|approve|reject <code>` - Approval workflow.\n\n\
        **Line items**\n\
        • `/budget set|remove` - Account budget lines of a regular promotion.\n\
        • `/sku set|remove` - SKU lines of a regular promotion.\n\
        • `/attachment add|list|remove` - File links on a promotion.\n\n\
        **Reference data**\n\
        • `/reference list|add|edit|delete <kind>` - Distributors, categories, accounts, \
        activities, SKUs, positions, departments and sales groups.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
