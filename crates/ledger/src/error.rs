//! The module contains the errors the ledger can throw.
//!
//! Errors fall in three families, see [`ErrorKind`]:
//!
//! - validation: the caller supplied bad input ([`InvalidAmount`],
//!   [`InvalidKind`], [`InvalidCategory`], [`InvalidPin`],
//!   [`InvalidWindow`], [`InvalidTaxonomy`]). Nothing was written.
//! - not found: a read by id missed ([`KeyNotFound`]).
//! - storage: the database failed or returned a row the ledger can't read
//!   ([`Database`], [`CorruptRecord`]).
//!
//!  [`InvalidAmount`]: LedgerError::InvalidAmount
//!  [`InvalidKind`]: LedgerError::InvalidKind
//!  [`InvalidCategory`]: LedgerError::InvalidCategory
//!  [`InvalidPin`]: LedgerError::InvalidPin
//!  [`InvalidWindow`]: LedgerError::InvalidWindow
//!  [`InvalidTaxonomy`]: LedgerError::InvalidTaxonomy
//!  [`KeyNotFound`]: LedgerError::KeyNotFound
//!  [`Database`]: LedgerError::Database
//!  [`CorruptRecord`]: LedgerError::CorruptRecord
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid transaction type: {0}")]
    InvalidKind(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Corrupted record: {0}")]
    CorruptRecord(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of a [`LedgerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Fix it and retry; stored state is untouched.
    Validation,
    /// The requested record does not exist.
    NotFound,
    /// Persistence failed. Retry later or surface to the user.
    Storage,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidKind(_)
            | Self::InvalidCategory(_)
            | Self::InvalidPin(_)
            | Self::InvalidWindow(_)
            | Self::InvalidTaxonomy(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::CorruptRecord(_) | Self::Database(_) => ErrorKind::Storage,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_storage(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidPin(a), Self::InvalidPin(b)) => a == b,
            (Self::InvalidWindow(a), Self::InvalidWindow(b)) => a == b,
            (Self::InvalidTaxonomy(a), Self::InvalidTaxonomy(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::CorruptRecord(a), Self::CorruptRecord(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
