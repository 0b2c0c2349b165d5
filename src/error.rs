use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<Cow<'static, str>>) -> Self {
        AppError::NotFound(what.into().into_owned())
    }

    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        AppError::Validation(msg.into().into_owned())
    }

    /// Wrap a sqlx error, surfacing unique-constraint collisions as `Conflict`
    /// so callers can tell a lost race from a storage fault.
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
