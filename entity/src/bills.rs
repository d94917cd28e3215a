use sea_orm::prelude::{DateTimeWithTimeZone, *};
use serde::Serialize;
use uuid::Uuid;

/// An expense-report record. A row is inserted when the proof file is
/// uploaded and completed by full replacement when the form is submitted;
/// the date stays a raw string so malformed values survive display.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub expense_type: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub amount: Option<i32>,
    pub vat: Option<String>,
    pub pct: Option<i32>,
    pub commentary: Option<String>,
    pub file_url: String,
    pub file_name: String,
    /// "pending", "accepted" or "refused".
    pub status: String,
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations")
    }
}

impl ActiveModelBehavior for ActiveModel {}
