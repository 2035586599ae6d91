//! Attachment metadata. Files themselves live elsewhere; only the name and
//! link are stored against the promotion.

use crate::{
    core::{
        pwp::{get_cover_pwp, get_regular_pwp},
        required_field,
        session::Session,
    },
    entities::{Attachment, attachment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Records an attachment on a cover or regular promotion.
#[instrument(skip(db, session), fields(operator = session.user_id()))]
pub async fn add_attachment(
    db: &DatabaseConnection,
    session: &Session,
    pwp_code: &str,
    file_name: &str,
    url: &str,
) -> Result<attachment::Model> {
    let file_name = required_field(file_name, "File name")?;
    let url = required_field(url, "URL")?;
    let pwp_code = pwp_code.trim();

    if get_regular_pwp(db, pwp_code).await?.is_none()
        && get_cover_pwp(db, pwp_code).await?.is_none()
    {
        return Err(Error::NotFound {
            entity: "Promotion",
            key: pwp_code.to_string(),
        });
    }

    let model = attachment::ActiveModel {
        pwp_code: Set(pwp_code.to_string()),
        file_name: Set(file_name),
        url: Set(url),
        uploaded_by: Set(session.display_name().to_string()),
        uploaded_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(pwp_code, id = model.id, "Attachment added");
    Ok(model)
}

/// Attachments of a promotion, oldest first.
pub async fn list_attachments(
    db: &DatabaseConnection,
    pwp_code: &str,
) -> Result<Vec<attachment::Model>> {
    Attachment::find()
        .filter(attachment::Column::PwpCode.eq(pwp_code.trim()))
        .order_by_asc(attachment::Column::UploadedAt)
        .order_by_asc(attachment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes one attachment. Returns `false` when it did not exist.
#[instrument(skip(db))]
pub async fn remove_attachment(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = Attachment::delete_by_id(id).exec(db).await?;
    if result.rows_affected > 0 {
        info!(id, "Attachment removed");
    }
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_list_remove() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let first = add_attachment(&db, &session, &regular.code, "brief.pdf", "https://f/1").await?;
        add_attachment(&db, &session, &regular.code, "mechanics.xlsx", "https://f/2").await?;
        assert_eq!(first.uploaded_by, "Tester");

        let listed = list_attachments(&db, &regular.code).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].file_name, "brief.pdf");

        assert!(remove_attachment(&db, first.id).await?);
        assert!(!remove_attachment(&db, first.id).await?);
        assert_eq!(list_attachments(&db, &regular.code).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_validates_input() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let missing_url = add_attachment(&db, &session, &regular.code, "brief.pdf", " ").await;
        assert!(matches!(missing_url, Err(Error::MissingField { field: "URL" })));

        let unknown = add_attachment(&db, &session, "RP09999", "brief.pdf", "https://f/1").await;
        assert!(matches!(unknown, Err(Error::NotFound { .. })));
        Ok(())
    }
}
