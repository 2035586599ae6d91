//! Reference data Discord commands - one `/reference` group for every list.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::reference::{
            ReferenceKind, create_reference_record, delete_reference_record,
            list_reference_records, update_reference_record,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Reference list picked from a slash command dropdown.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum KindChoice {
        #[name = "Distributor"]
        Distributor,
        #[name = "Category"]
        Category,
        #[name = "Account"]
        Account,
        #[name = "Activity"]
        Activity,
        #[name = "SKU"]
        Sku,
        #[name = "Position"]
        Position,
        #[name = "Department"]
        Department,
        #[name = "Sales group"]
        SalesGroup,
    }

    impl From<KindChoice> for ReferenceKind {
        fn from(choice: KindChoice) -> Self {
            match choice {
                KindChoice::Distributor => Self::Distributor,
                KindChoice::Category => Self::Category,
                KindChoice::Account => Self::Account,
                KindChoice::Activity => Self::Activity,
                KindChoice::Sku => Self::Sku,
                KindChoice::Position => Self::Position,
                KindChoice::Department => Self::Department,
                KindChoice::SalesGroup => Self::SalesGroup,
            }
        }
    }

    /// Parent command for reference data.
    #[poise::command(
        slash_command,
        subcommands("reference_list", "reference_add", "reference_edit", "reference_delete")
    )]
    pub async fn reference(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Reference data command. Available subcommands:\n\
            `/reference list <kind>` - List records, with search and paging\n\
            `/reference add <kind>` - Add a record with the next code\n\
            `/reference edit <kind> <code>` - Change name or description\n\
            `/reference delete <kind> <code>` - Delete an unused record";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists the records of one reference list.
    #[poise::command(slash_command, rename = "list")]
    pub async fn reference_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reference list"] kind: KindChoice,
        #[description = "Search code or name"] search: Option<String>,
        #[description = "Page number (default 1)"] page: Option<u64>,
    ) -> Result<()> {
        let kind = ReferenceKind::from(kind);
        let data = ctx.data();
        let query = data.list_query(search, page);
        let page = list_reference_records(&data.database, kind, &query).await?;

        if page.is_empty() {
            ctx.say(format!("📂 No {} records found.", kind.label()))
                .await?;
            return Ok(());
        }

        let mut response = format!(
            "📂 **{}** (page {}/{}, {} total)\n\n",
            kind.label(),
            page.page,
            page.total_pages,
            page.total_items
        );
        for record in &page.items {
            write!(&mut response, "`{}` **{}**", record.code, record.name)?;
            if let Some(description) = &record.description {
                write!(&mut response, " - {description}")?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Adds a record; its code is generated.
    #[poise::command(slash_command, rename = "add")]
    pub async fn reference_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reference list"] kind: KindChoice,
        #[description = "Name"] name: String,
        #[description = "Description"] description: Option<String>,
    ) -> Result<()> {
        let kind = ReferenceKind::from(kind);
        let data = ctx.data();
        let record =
            create_reference_record(&data.database, &data.codes, kind, &name, description).await?;

        ctx.say(format!(
            "✅ Added {} `{}` **{}**.",
            kind.label(),
            record.code,
            record.name
        ))
        .await?;
        Ok(())
    }

    /// Changes the name and description of a record.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn reference_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reference list"] kind: KindChoice,
        #[description = "Record code"] code: String,
        #[description = "New name"] name: String,
        #[description = "New description (leave empty to clear)"] description: Option<String>,
    ) -> Result<()> {
        let kind = ReferenceKind::from(kind);
        let record =
            update_reference_record(&ctx.data().database, kind, &code, &name, description).await?;

        ctx.say(format!(
            "✅ Updated {} `{}` **{}**.",
            kind.label(),
            record.code,
            record.name
        ))
        .await?;
        Ok(())
    }

    /// Deletes a record that nothing references.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn reference_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reference list"] kind: KindChoice,
        #[description = "Record code"] code: String,
    ) -> Result<()> {
        let kind = ReferenceKind::from(kind);
        if delete_reference_record(&ctx.data().database, kind, &code).await? {
            ctx.say(format!("✅ Deleted {} `{code}`.", kind.label()))
                .await?;
        } else {
            ctx.say(format!("ℹ️ {} `{code}` does not exist.", kind.label()))
                .await?;
        }
        Ok(())
    }
}

pub use inner::*;
