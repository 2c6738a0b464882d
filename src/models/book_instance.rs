//! Book instance (lendable copy) model and loan status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::display_title;

/// Availability of a copy, stored as a single character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> char {
        match self {
            LoanStatus::Maintenance => 'm',
            LoanStatus::OnLoan => 'o',
            LoanStatus::Available => 'a',
            LoanStatus::Reserved => 'r',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl TryFrom<char> for LoanStatus {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'm' => Ok(LoanStatus::Maintenance),
            'o' => Ok(LoanStatus::OnLoan),
            'a' => Ok(LoanStatus::Available),
            'r' => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status code: {}", other)),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// SQLx conversion for LoanStatus (CHAR(1) column)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        let code = s
            .chars()
            .next()
            .ok_or_else(|| "Empty loan status".to_string())?;
        LoanStatus::try_from(code).map_err(|e| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s = self.code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book instance row, joined with its book title and borrower username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub language_iso_code: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
}

impl BookInstance {
    /// Overdue iff a due date is set and lies strictly before `today`.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }

    /// "{book} | {id}"
    pub fn display(&self) -> String {
        let book = match &self.book_title {
            Some(title) => display_title(title, self.language_iso_code.as_deref()),
            None => "None".to_string(),
        };
        format!("{} | {}", book, self.id)
    }
}

/// Book instance as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub display: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
}

impl BookInstanceDetails {
    pub fn new(instance: BookInstance, today: NaiveDate) -> Self {
        Self {
            is_overdue: instance.is_overdue_on(today),
            display: instance.display(),
            id: instance.id,
            book_id: instance.book_id,
            book_title: instance.book_title,
            due_back: instance.due_back,
            status: instance.status,
            borrower_id: instance.borrower_id,
            borrower_username: instance.borrower_username,
        }
    }
}

/// Create book instance request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBookInstance {
    pub due_back: Option<NaiveDate>,
    /// Defaults to maintenance
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Librarian edit of a book instance; `null` clears a field, an absent key leaves it untouched
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookInstance {
    pub status: Option<LoanStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub borrower_id: Option<Option<i32>>,
}
