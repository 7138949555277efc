//! Repository error types.
//!
//! Each wraps the domain error of its area plus raw database failures.

use codledger_core::collections::LifecycleError;
use codledger_core::export::ExportError;
use codledger_core::ledger::LedgerError;
use codledger_core::reports::ReportError;
use sea_orm::{DbErr, SqlErr};

/// Errors from account, journal and ledger query operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerStoreError {
    /// A ledger rule was violated or a record is missing.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Rendering an export chunk failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(inner) => inner.error_code(),
            Self::Export(_) => "EXPORT_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(inner) => inner.http_status_code(),
            Self::Export(_) | Self::Database(_) => 500,
        }
    }
}

/// Errors from collection and deposit operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectionStoreError {
    /// A lifecycle rule was violated or a record is missing.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerStoreError> for CollectionStoreError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::Ledger(inner) => Self::Lifecycle(LifecycleError::Ledger(inner)),
            LedgerStoreError::Export(inner) => {
                Self::Lifecycle(LifecycleError::Database(inner.to_string()))
            }
            LedgerStoreError::Database(inner) => Self::Database(inner),
        }
    }
}

impl CollectionStoreError {
    /// Flattens into the domain error, for per-item bulk reporting. Database failures
    /// are logged here since the bulk response does not carry their text.
    #[must_use]
    pub fn into_lifecycle(self) -> LifecycleError {
        match self {
            Self::Lifecycle(inner) => inner,
            Self::Database(inner) => {
                tracing::error!(error = %inner, "Bulk item failed on a database error");
                LifecycleError::Database(inner.to_string())
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Lifecycle(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Lifecycle(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Errors from statement queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportStoreError {
    /// Invalid report parameters.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ReportStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Report(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Report(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Whether `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
