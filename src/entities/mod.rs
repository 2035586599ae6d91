//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod approval_history;
pub mod attachment;
pub mod budget_line;
pub mod cover_pwp;
pub mod reference_record;
pub mod regular_pwp;
pub mod sku_line;

// Re-export specific types to avoid conflicts
pub use approval_history::{
    Column as ApprovalHistoryColumn, Entity as ApprovalHistory, Model as ApprovalHistoryModel,
};
pub use attachment::{Column as AttachmentColumn, Entity as Attachment, Model as AttachmentModel};
pub use budget_line::{Column as BudgetLineColumn, Entity as BudgetLine, Model as BudgetLineModel};
pub use cover_pwp::{Column as CoverPwpColumn, Entity as CoverPwp, Model as CoverPwpModel};
pub use reference_record::{
    Column as ReferenceRecordColumn, Entity as ReferenceRecord, Model as ReferenceRecordModel,
};
pub use regular_pwp::{Column as RegularPwpColumn, Entity as RegularPwp, Model as RegularPwpModel};
pub use sku_line::{Column as SkuLineColumn, Entity as SkuLine, Model as SkuLineModel};
