use axum::http::StatusCode;
use thiserror::Error;
use time::Date;

/// Failures the donor store reports to its callers.
///
/// Plain lookups never fail; they return `None` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("User not found: {0}")]
    UserNotFound(u64),

    #[error("Donation date {date} is after today ({today})")]
    InvalidDonationDate { date: Date, today: Date },
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::UsernameTaken(_) | StoreError::EmailTaken(_) => StatusCode::CONFLICT,
            StoreError::UserNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidDonationDate { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Handler rejection carrying the error's status and message.
impl From<StoreError> for (StatusCode, String) {
    fn from(e: StoreError) -> Self {
        (e.status_code(), e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
