use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success envelope: every 2xx body is `{"success": true, "data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error body returned with every 4xx/5xx status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Bs,
    Usd,
}

/// One page of a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub code: String,
        pub description: String,
        /// `asset`, `liability`, ... or the Spanish names; unknown tags are kept.
        pub account_type: String,
        pub parent_code: Option<String>,
        /// Derived from the code when missing.
        pub level: Option<i32>,
        pub currency: Option<Currency>,
        pub classifier: Option<String>,
        #[serde(default)]
        pub allows_auxiliary: bool,
        pub is_transactional: Option<bool>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub description: Option<String>,
        pub account_type: Option<String>,
        pub classifier: Option<String>,
        pub allows_auxiliary: Option<bool>,
        pub is_transactional: Option<bool>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        pub code_from: Option<String>,
        pub code_to: Option<String>,
        pub account_type: Option<String>,
        pub level: Option<i32>,
        pub active: Option<bool>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub code: String,
        pub description: String,
        pub parent_code: Option<String>,
        pub level: i32,
        pub account_type: String,
        pub currency: Currency,
        pub classifier: Option<String>,
        pub allows_auxiliary: bool,
        pub is_transactional: bool,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod auxiliary {
    use super::*;

    /// Body of both create and full update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuxiliaryUpsert {
        /// `Cliente`, `Proveedor`, `Banco`, `Caja`, `Empleado` or `Otro`.
        pub type_tag: String,
        /// Generated from type and name when missing on create.
        pub code: Option<String>,
        pub name: String,
        pub linked_account_code: Option<String>,
        pub currency: Option<Currency>,
        pub tax_id: Option<String>,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub department: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AuxiliaryList {
        pub type_tag: Option<String>,
        pub account_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuxiliaryView {
        pub id: Uuid,
        pub type_tag: String,
        pub code: String,
        pub name: String,
        pub linked_account_code: Option<String>,
        pub currency: Currency,
        pub is_bank_or_cash: bool,
        pub tax_id: Option<String>,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub department: Option<String>,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod template {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateLineNew {
        /// `DEBE` or `HABER`.
        pub side: String,
        pub account_code: Option<String>,
        #[serde(default)]
        pub account_is_fixed: bool,
        pub percentage: Option<Decimal>,
        #[serde(default)]
        pub is_locked: bool,
        #[serde(default)]
        pub allows_auxiliary: bool,
        pub role: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateNew {
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub voucher_type: String,
        #[serde(default)]
        pub lines: Vec<TemplateLineNew>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TemplateUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub voucher_type: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TemplateList {
        pub only_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateLineView {
        pub id: Uuid,
        pub order: i32,
        pub side: String,
        pub account_code: Option<String>,
        pub account_is_fixed: bool,
        pub percentage: Option<Decimal>,
        pub is_locked: bool,
        pub allows_auxiliary: bool,
        pub role: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateView {
        pub id: Uuid,
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub voucher_type: String,
        pub is_active: bool,
        pub lines: Vec<TemplateLineView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateApply {
        pub voucher_id: Uuid,
    }

    /// A zero-amount voucher line plus the template hints the form needs.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SkeletonLineView {
        pub order: i32,
        pub account_code: String,
        pub side: String,
        pub percentage: Option<Decimal>,
        pub is_locked: bool,
        pub account_is_fixed: bool,
        pub allows_auxiliary: bool,
        pub role: Option<String>,
        pub suggested_account: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppliedTemplateView {
        pub voucher_id: Uuid,
        pub template_code: String,
        pub template_name: String,
        pub voucher_type: String,
        pub lines: Vec<SkeletonLineView>,
    }
}

pub mod voucher {
    use super::*;

    /// Amounts are minor units (cents). Missing amounts are zero.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct VoucherLineInput {
        pub account_code: String,
        pub auxiliary_code: Option<String>,
        pub memo: Option<String>,
        #[serde(default)]
        pub debit_bs_minor: i64,
        #[serde(default)]
        pub credit_bs_minor: i64,
        #[serde(default)]
        pub debit_usd_minor: i64,
        #[serde(default)]
        pub credit_usd_minor: i64,
    }

    /// Body of both create and update. Enumerations default to
    /// `Contabilidad` / `Diario` / `Normal`, currency to BS and rate to 1.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherUpsert {
        pub date: NaiveDate,
        pub period: i32,
        pub fiscal_year: i32,
        pub origin: Option<String>,
        pub voucher_type: Option<String>,
        pub entry_type: Option<String>,
        pub currency: Option<Currency>,
        pub exchange_rate: Option<Decimal>,
        pub concept: Option<String>,
        pub beneficiary: Option<String>,
        pub check_number: Option<String>,
        #[serde(default)]
        pub lines: Vec<VoucherLineInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OpeningNew {
        pub fiscal_year: i32,
        pub date: NaiveDate,
        pub exchange_rate: Option<Decimal>,
        pub concept: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct VoucherList {
        pub state: Option<String>,
        pub voucher_type: Option<String>,
        pub fiscal_year: Option<i32>,
        pub period: Option<i32>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherLineView {
        pub order: i32,
        pub account_code: String,
        pub auxiliary_code: Option<String>,
        pub memo: Option<String>,
        pub debit_bs_minor: i64,
        pub credit_bs_minor: i64,
        pub debit_usd_minor: i64,
        pub credit_usd_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TotalsView {
        pub debit_bs_minor: i64,
        pub credit_bs_minor: i64,
        pub debit_usd_minor: i64,
        pub credit_usd_minor: i64,
        pub balanced: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherView {
        pub id: Uuid,
        pub number: Option<i64>,
        /// `BORRADOR` or `APROBADO`.
        pub state: String,
        pub origin: String,
        pub voucher_type: String,
        pub entry_type: String,
        pub date: NaiveDate,
        pub period: i32,
        pub fiscal_year: i32,
        pub currency: Currency,
        pub exchange_rate: Decimal,
        pub concept: Option<String>,
        pub beneficiary: Option<String>,
        pub check_number: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub approved_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherDetailView {
        pub voucher: VoucherView,
        pub lines: Vec<VoucherLineView>,
        pub totals: TotalsView,
    }
}

pub mod report {
    use super::*;
    use crate::voucher::{TotalsView, VoucherLineView, VoucherView};

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct JournalQuery {
        pub fiscal_year: Option<i32>,
        pub period: Option<i32>,
        pub entry_type: Option<String>,
        pub voucher_type: Option<String>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
        /// `APROBADO` (default), `BORRADOR` or `TODOS`.
        pub state: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JournalLineView {
        #[serde(flatten)]
        pub line: VoucherLineView,
        pub account_description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JournalEntryView {
        pub voucher: VoucherView,
        pub lines: Vec<JournalLineView>,
        pub totals: TotalsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JournalView {
        pub entries: Vec<JournalEntryView>,
        pub totals: TotalsView,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerQuery {
        pub state: Option<String>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
        pub fiscal_year: Option<i32>,
        pub period: Option<i32>,
        pub account_from: Option<String>,
        pub account_to: Option<String>,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerRowView {
        pub account_code: String,
        pub account_description: String,
        pub date: NaiveDate,
        pub voucher_id: Uuid,
        pub voucher_number: Option<i64>,
        pub entry_type: String,
        pub voucher_concept: Option<String>,
        pub line_memo: Option<String>,
        pub debit_minor: i64,
        pub credit_minor: i64,
        pub line_order: i32,
        pub running_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrialBalanceQuery {
        pub fiscal_year: i32,
        pub period: i32,
        pub state: Option<String>,
        pub code_from: Option<String>,
        pub code_to: Option<String>,
        pub max_level: Option<i32>,
        pub account_type: Option<String>,
        pub include_zero: Option<bool>,
        pub include_totals: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TrialBalanceAmountsView {
        pub debit_bs_minor: i64,
        pub credit_bs_minor: i64,
        pub balance_bs_minor: i64,
        pub debit_usd_minor: i64,
        pub credit_usd_minor: i64,
        pub balance_usd_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrialBalanceRowView {
        pub account_code: String,
        pub description: String,
        pub level: i32,
        pub account_type: String,
        #[serde(flatten)]
        pub amounts: TrialBalanceAmountsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrialBalanceView {
        pub rows: Vec<TrialBalanceRowView>,
        pub totals: Option<TrialBalanceAmountsView>,
    }
}
