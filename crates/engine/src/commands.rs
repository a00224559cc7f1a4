//! Command structs for engine operations.
//!
//! These types group parameters for write operations (accounts, auxiliaries,
//! templates, opening vouchers), keeping call sites readable and avoiding long
//! argument lists.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountType, AuxiliaryType, Contact, Currency, ExchangeRate, Side, VoucherType};

const DEFAULT_PAGE_LIMIT: u64 = 100;
const MAX_PAGE_LIMIT: u64 = 1000;

/// Create an account in the chart.
#[derive(Clone, Debug)]
pub struct AccountNew {
    pub code: String,
    pub description: String,
    pub account_type: AccountType,
    pub parent_code: Option<String>,
    /// Derived from `code` when absent.
    pub level: Option<i32>,
    pub currency: Currency,
    pub classifier: Option<String>,
    pub allows_auxiliary: bool,
    pub is_transactional: bool,
    pub is_active: bool,
}

impl AccountNew {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            account_type,
            parent_code: None,
            level: None,
            currency: Currency::default(),
            classifier: None,
            allows_auxiliary: false,
            is_transactional: true,
            is_active: true,
        }
    }

    #[must_use]
    pub fn parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    #[must_use]
    pub fn allows_auxiliary(mut self, value: bool) -> Self {
        self.allows_auxiliary = value;
        self
    }

    #[must_use]
    pub fn transactional(mut self, value: bool) -> Self {
        self.is_transactional = value;
        self
    }

    #[must_use]
    pub fn active(mut self, value: bool) -> Self {
        self.is_active = value;
        self
    }
}

/// Partial update of an account. `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct AccountUpdate {
    pub description: Option<String>,
    pub account_type: Option<AccountType>,
    pub classifier: Option<String>,
    pub allows_auxiliary: Option<bool>,
    pub is_transactional: Option<bool>,
    pub is_active: Option<bool>,
}

impl AccountUpdate {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn active(mut self, value: bool) -> Self {
        self.is_active = Some(value);
        self
    }

    #[must_use]
    pub fn allows_auxiliary(mut self, value: bool) -> Self {
        self.allows_auxiliary = Some(value);
        self
    }
}

/// Fields of an auxiliary, used both to create and to replace one.
#[derive(Clone, Debug)]
pub struct AuxiliaryInput {
    pub type_tag: AuxiliaryType,
    /// Generated from type and name when absent.
    pub code: Option<String>,
    pub name: String,
    pub linked_account_code: Option<String>,
    pub currency: Currency,
    pub contact: Contact,
    pub is_active: bool,
}

impl AuxiliaryInput {
    #[must_use]
    pub fn new(type_tag: AuxiliaryType, name: impl Into<String>) -> Self {
        Self {
            type_tag,
            code: None,
            name: name.into(),
            linked_account_code: None,
            currency: Currency::default(),
            contact: Contact::default(),
            is_active: true,
        }
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn linked_account(mut self, account_code: impl Into<String>) -> Self {
        self.linked_account_code = Some(account_code.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn contact(mut self, contact: Contact) -> Self {
        self.contact = contact;
        self
    }
}

/// One line of a template being created or edited.
#[derive(Clone, Debug)]
pub struct TemplateLineNew {
    pub side: Side,
    pub account_code: Option<String>,
    pub account_is_fixed: bool,
    pub percentage: Option<Decimal>,
    pub is_locked: bool,
    pub allows_auxiliary: bool,
    pub role: Option<String>,
}

impl TemplateLineNew {
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            account_code: None,
            account_is_fixed: false,
            percentage: None,
            is_locked: false,
            allows_auxiliary: false,
            role: None,
        }
    }

    /// Account copied onto every voucher the template is applied to.
    #[must_use]
    pub fn fixed_account(mut self, account_code: impl Into<String>) -> Self {
        self.account_code = Some(account_code.into());
        self.account_is_fixed = true;
        self
    }

    /// Account offered as a hint only.
    #[must_use]
    pub fn suggested_account(mut self, account_code: impl Into<String>) -> Self {
        self.account_code = Some(account_code.into());
        self.account_is_fixed = false;
        self
    }

    #[must_use]
    pub fn percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    #[must_use]
    pub fn locked(mut self, value: bool) -> Self {
        self.is_locked = value;
        self
    }

    #[must_use]
    pub fn allows_auxiliary(mut self, value: bool) -> Self {
        self.allows_auxiliary = value;
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Create a template with its lines.
#[derive(Clone, Debug)]
pub struct TemplateNew {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub voucher_type: VoucherType,
    pub lines: Vec<TemplateLineNew>,
}

impl TemplateNew {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, voucher_type: VoucherType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            voucher_type,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn line(mut self, line: TemplateLineNew) -> Self {
        self.lines.push(line);
        self
    }
}

/// Partial update of a template header.
#[derive(Clone, Debug, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub voucher_type: Option<VoucherType>,
    pub is_active: Option<bool>,
}

/// Opening entry (asiento de apertura) of a fiscal year.
#[derive(Clone, Debug)]
pub struct OpeningNew {
    pub fiscal_year: i32,
    pub date: NaiveDate,
    pub exchange_rate: ExchangeRate,
    pub concept: Option<String>,
}

/// 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results with totals for the whole query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}
