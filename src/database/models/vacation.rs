use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_note: Option<String>,
    pub admin_note: Option<String>,
    pub status: VacationStatus,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

impl sqlx::Type<sqlx::Sqlite> for VacationStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for VacationStatus {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = match self {
            VacationStatus::Pending => "pending",
            VacationStatus::Approved => "approved",
            VacationStatus::Rejected => "rejected",
        };
        <&str as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&s, args)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for VacationStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl std::fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VacationStatus::Pending => write!(f, "pending"),
            VacationStatus::Approved => write!(f, "approved"),
            VacationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for VacationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VacationStatus::Pending),
            "approved" => Ok(VacationStatus::Approved),
            "rejected" => Ok(VacationStatus::Rejected),
            _ => Err(format!("Invalid VacationStatus: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequestInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_note: Option<String>,
}

/// Body of an admin approve/reject action.
#[derive(Debug, Deserialize)]
pub struct ResolutionRequest {
    pub note: Option<String>,
}
