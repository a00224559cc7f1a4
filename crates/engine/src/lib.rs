//! Double-entry ledger core: chart of accounts, auxiliaries, voucher
//! templates, the voucher lifecycle and the three legal reports.
//!
//! Everything goes through [`Engine`], built once with a database connection
//! and shared by reference.

pub use accounts::{Account, AccountType, derive_level};
pub use auxiliaries::{Auxiliary, AuxiliaryType, Contact, base_code};
pub use commands::{
    AccountNew, AccountUpdate, AuxiliaryInput, OpeningNew, Page, Paged, TemplateLineNew,
    TemplateNew, TemplateUpdate,
};
pub use currency::{Currency, ExchangeRate};
pub use error::{EngineError, ErrorKind};
pub use money::Money;
pub use ops::{
    AccountListFilter, AppliedTemplate, AuxiliaryListFilter, Engine, EngineBuilder,
    VoucherDetail, VoucherListFilter,
};
pub use reports::{
    Journal, JournalEntry, JournalFilter, JournalLine, LedgerFilter, LedgerRow, StateFilter,
    TrialBalance, TrialBalanceAmounts, TrialBalanceFilter, TrialBalanceRow,
};
pub use template_lines::{SkeletonLine, Side, TemplateLine, skeleton_lines};
pub use templates::VoucherTemplate;
pub use voucher_lines::{VoucherLine, VoucherTotals};
pub use vouchers::{EntryType, Origin, Voucher, VoucherHeader, VoucherState, VoucherType};

mod accounts;
mod auxiliaries;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
mod reports;
mod template_lines;
mod templates;
mod voucher_lines;
mod voucher_sequences;
mod vouchers;

type ResultEngine<T> = Result<T, EngineError>;
