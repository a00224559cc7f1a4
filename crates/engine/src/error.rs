//! The module contains the errors the ledger engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`], which is what callers (the
//! HTTP layer, the admin CLI) use to pick a status:
//!
//! - validation errors reject malformed or inconsistent input,
//! - not-found errors name the missing account, template, voucher or auxiliary,
//! - state conflicts refuse to touch approved vouchers or referenced rows,
//! - storage errors wrap the underlying [`DbErr`].
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Account \"{0}\" already exists")]
    DuplicateAccount(String),
    #[error("Template code \"{0}\" already exists")]
    DuplicateTemplateCode(String),
    #[error("Template \"{0}\" not found or inactive")]
    TemplateNotFound(String),
    #[error("Template \"{0}\" has no lines")]
    EmptyTemplate(String),
    #[error("Invalid account link: {0}")]
    InvalidAccountLink(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Line {0} has no account")]
    LineMissingAccount(String),
    #[error("Voucher is unbalanced: {0}")]
    Unbalanced(String),
    #[error("Voucher {0} is not a draft")]
    VoucherNotDraft(String),
    #[error("Voucher {0} is already approved")]
    VoucherApproved(String),
    #[error("\"{0}\" is still in use")]
    InUse(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    Forbidden,
    Storage,
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAccountLink(_)
            | Self::InvalidAccount(_)
            | Self::InvalidField(_)
            | Self::LineMissingAccount(_)
            | Self::Unbalanced(_)
            | Self::EmptyTemplate(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) | Self::TemplateNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateAccount(_)
            | Self::DuplicateTemplateCode(_)
            | Self::VoucherNotDraft(_)
            | Self::VoucherApproved(_)
            | Self::InUse(_) => ErrorKind::StateConflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::DuplicateAccount(a), Self::DuplicateAccount(b)) => a == b,
            (Self::DuplicateTemplateCode(a), Self::DuplicateTemplateCode(b)) => a == b,
            (Self::TemplateNotFound(a), Self::TemplateNotFound(b)) => a == b,
            (Self::EmptyTemplate(a), Self::EmptyTemplate(b)) => a == b,
            (Self::InvalidAccountLink(a), Self::InvalidAccountLink(b)) => a == b,
            (Self::InvalidAccount(a), Self::InvalidAccount(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::LineMissingAccount(a), Self::LineMissingAccount(b)) => a == b,
            (Self::Unbalanced(a), Self::Unbalanced(b)) => a == b,
            (Self::VoucherNotDraft(a), Self::VoucherNotDraft(b)) => a == b,
            (Self::VoucherApproved(a), Self::VoucherApproved(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
