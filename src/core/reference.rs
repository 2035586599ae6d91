//! Reference data business logic - one editor for every reference list.
//!
//! Distributors, categories, accounts, activities, SKUs, positions,
//! departments and sales groups all have the same shape (code, name,
//! description) and live in one table told apart by `kind`. Each kind keeps
//! its own code sequence.

use crate::{
    config::settings::ReferenceSeed,
    core::{
        code::{CodeBook, CodeSequence, generate_code, is_unique_violation},
        optional_text,
        page::{ListQuery, Page, contains_ignoring_case},
        required_field,
    },
    entities::{
        BudgetLine, CoverPwp, ReferenceRecord, RegularPwp, SkuLine, budget_line, cover_pwp,
        reference_record, regular_pwp, sku_line,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, ItemsAndPagesNumber, PaginatorTrait, QueryOrder, Set, prelude::*};
use std::{fmt, str::FromStr};
use tracing::{info, instrument, warn};

/// The reference lists managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Distributors promotions are run with
    Distributor,
    /// Product categories
    Category,
    /// Customer accounts receiving budget
    Account,
    /// Promotion activity types
    Activity,
    /// Stock keeping units
    Sku,
    /// Staff positions
    Position,
    /// Departments
    Department,
    /// Sales groups
    SalesGroup,
}

impl ReferenceKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 8] = [
        Self::Distributor,
        Self::Category,
        Self::Account,
        Self::Activity,
        Self::Sku,
        Self::Position,
        Self::Department,
        Self::SalesGroup,
    ];

    /// Value stored in the `kind` column and used as the sequence name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distributor => "distributor",
            Self::Category => "category",
            Self::Account => "account",
            Self::Activity => "activity",
            Self::Sku => "sku",
            Self::Position => "position",
            Self::Department => "department",
            Self::SalesGroup => "sales_group",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Distributor => "Distributor",
            Self::Category => "Category",
            Self::Account => "Account",
            Self::Activity => "Activity",
            Self::Sku => "SKU",
            Self::Position => "Position",
            Self::Department => "Department",
            Self::SalesGroup => "Sales group",
        }
    }

    /// Built-in code sequence of this kind.
    #[must_use]
    pub fn default_sequence(self) -> CodeSequence {
        match self {
            Self::Distributor => CodeSequence::new("", 5, 20001),
            Self::Category => CodeSequence::new("", 4, 5000),
            Self::Account => CodeSequence::new("A", 5, 1),
            Self::Activity => CodeSequence::new("", 4, 8000),
            Self::Sku => CodeSequence::new("", 4, 6000),
            Self::Position => CodeSequence::new("", 5, 10001),
            Self::Department => CodeSequence::new("", 4, 3001),
            Self::SalesGroup => CodeSequence::new("SG", 3, 1),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReferenceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::NotFound {
                entity: "reference list",
                key: s.to_string(),
            })
    }
}

/// Lists the records of one kind, ordered by code, filtered by a search over
/// code and name.
pub async fn list_reference_records(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    query: &ListQuery,
) -> Result<Page<reference_record::Model>> {
    let mut select =
        ReferenceRecord::find().filter(reference_record::Column::Kind.eq(kind.as_str()));

    if let Some(term) = query.search() {
        select = select.filter(
            Condition::any()
                .add(contains_ignoring_case(reference_record::Column::Code, term))
                .add(contains_ignoring_case(reference_record::Column::Name, term)),
        );
    }

    let paginator = select
        .order_by_asc(reference_record::Column::Code)
        .paginate(db, query.per_page());
    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(query.page_index()).await?;

    Ok(Page {
        items,
        page: query.page(),
        per_page: query.per_page(),
        total_items: number_of_items,
        total_pages: number_of_pages,
    })
}

/// Finds a record by kind and code.
pub async fn get_reference_record<C>(
    db: &C,
    kind: ReferenceKind,
    code: &str,
) -> Result<Option<reference_record::Model>>
where
    C: ConnectionTrait,
{
    ReferenceRecord::find()
        .filter(reference_record::Column::Kind.eq(kind.as_str()))
        .filter(reference_record::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_reference_record`] but a missing record is an error.
pub async fn require_reference_record<C>(
    db: &C,
    kind: ReferenceKind,
    code: &str,
) -> Result<reference_record::Model>
where
    C: ConnectionTrait,
{
    get_reference_record(db, kind, code)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: kind.label(),
            key: code.to_string(),
        })
}

/// Creates a record with the next code of its kind.
///
/// The name is required. A code taken by a concurrent insert is regenerated
/// up to [`CodeBook::retry_attempts`] times.
#[instrument(skip(db, codes, description))]
pub async fn create_reference_record(
    db: &DatabaseConnection,
    codes: &CodeBook,
    kind: ReferenceKind,
    name: &str,
    description: Option<String>,
) -> Result<reference_record::Model> {
    let name = required_field(name, "Name")?;
    let description = optional_text(description);
    let sequence = codes.sequence(kind.as_str())?;
    let attempts = codes.retry_attempts();

    for attempt in 1..=attempts {
        let code = generate_code(
            db,
            kind.as_str(),
            sequence,
            ReferenceRecord::find().filter(reference_record::Column::Kind.eq(kind.as_str())),
            reference_record::Column::Code,
        )
        .await?;

        let now = chrono::Utc::now().naive_utc();
        let record = reference_record::ActiveModel {
            kind: Set(kind.as_str().to_string()),
            code: Set(code.clone()),
            name: Set(name.clone()),
            description: Set(description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match record.insert(db).await {
            Ok(model) => {
                info!(kind = kind.as_str(), code = %model.code, "Reference record created");
                return Ok(model);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(kind = kind.as_str(), %code, attempt, "Generated code already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::CodeConflict {
        table: kind.as_str().to_string(),
        attempts,
    })
}

/// Updates the name and description of a record; the code never changes.
#[instrument(skip(db, description))]
pub async fn update_reference_record(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    code: &str,
    name: &str,
    description: Option<String>,
) -> Result<reference_record::Model> {
    let name = required_field(name, "Name")?;
    let existing = require_reference_record(db, kind, code).await?;

    let mut record: reference_record::ActiveModel = existing.into();
    record.name = Set(name);
    record.description = Set(optional_text(description));
    record.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = record.update(db).await?;
    info!(kind = kind.as_str(), code = %updated.code, "Reference record updated");
    Ok(updated)
}

/// Counts promotions and line items that still point at a record.
async fn count_references(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    code: &str,
) -> Result<(u64, &'static str)> {
    let counted = match kind {
        ReferenceKind::Distributor => {
            let regular = RegularPwp::find()
                .filter(regular_pwp::Column::DistributorCode.eq(code))
                .count(db)
                .await?;
            let cover = CoverPwp::find()
                .filter(cover_pwp::Column::DistributorCode.eq(code))
                .count(db)
                .await?;
            (regular + cover, "promotions")
        }
        ReferenceKind::Activity => (
            RegularPwp::find()
                .filter(regular_pwp::Column::ActivityCode.eq(code))
                .count(db)
                .await?,
            "promotions",
        ),
        ReferenceKind::Account => (
            BudgetLine::find()
                .filter(budget_line::Column::AccountCode.eq(code))
                .count(db)
                .await?,
            "budget lines",
        ),
        ReferenceKind::Sku => (
            SkuLine::find()
                .filter(sku_line::Column::Sku.eq(code))
                .filter(sku_line::Column::RowType.eq(sku_line::ROW_TYPE_ITEM))
                .count(db)
                .await?,
            "SKU lines",
        ),
        ReferenceKind::Category
        | ReferenceKind::Position
        | ReferenceKind::Department
        | ReferenceKind::SalesGroup => (0, "records"),
    };
    Ok(counted)
}

/// Deletes a record. Returns `false` when there was nothing to delete.
///
/// Records still used by promotions or line items are refused with
/// [`Error::HasDependents`].
#[instrument(skip(db))]
pub async fn delete_reference_record(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    code: &str,
) -> Result<bool> {
    let code = code.trim();
    let (count, dependents) = count_references(db, kind, code).await?;
    if count > 0 {
        return Err(Error::HasDependents {
            entity: kind.label(),
            code: code.to_string(),
            count,
            dependents,
        });
    }

    let result = ReferenceRecord::delete_many()
        .filter(reference_record::Column::Kind.eq(kind.as_str()))
        .filter(reference_record::Column::Code.eq(code))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(kind = kind.as_str(), code, "Reference record deleted");
    }
    Ok(result.rows_affected > 0)
}

/// Inserts configured reference records whose name is not present yet for
/// their kind. Returns how many were created.
pub async fn seed_reference_records(
    db: &DatabaseConnection,
    codes: &CodeBook,
    seeds: &[ReferenceSeed],
) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        let kind: ReferenceKind = seed.kind.parse()?;
        let exists = ReferenceRecord::find()
            .filter(reference_record::Column::Kind.eq(kind.as_str()))
            .filter(reference_record::Column::Name.eq(seed.name.trim()))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        create_reference_record(db, codes, kind, &seed.name, seed.description.clone()).await?;
        created += 1;
    }

    if created > 0 {
        info!("Seeded {created} reference records.");
    }
    Ok(created)
}
