//! Chart of accounts (plan de cuentas).
//!
//! Accounts are identified per company by a hierarchical `code`. Plain digit
//! codes follow the `1-1-1-3-3` mask (`1`, `11`, `111`, `111001`,
//! `111001003`); codes written with `.` or `-` separators count their parts.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

const SEGMENT_MASK: [usize; 5] = [1, 1, 1, 3, 3];
const TRAILING_SEGMENT: usize = 3;

/// Account classification. Unknown tags are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
    Other(String),
}

impl AccountType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for AccountType {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "asset" | "activo" => Self::Asset,
            "liability" | "pasivo" => Self::Liability,
            "equity" | "patrimonio" => Self::Equity,
            "income" | "ingreso" | "ingresos" => Self::Income,
            "expense" | "gasto" | "gastos" | "egreso" | "egresos" => Self::Expense,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for AccountType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<AccountType> for String {
    fn from(value: AccountType) -> Self {
        value.as_str().to_string()
    }
}

/// Level of an account code: number of segments up to the last non-zero one.
#[must_use]
pub fn derive_level(code: &str) -> i32 {
    let code = code.trim();
    if code.contains(['.', '-']) {
        let parts = code.split(['.', '-']).filter(|s| !s.is_empty()).count();
        return i32::try_from(parts).unwrap_or(i32::MAX).max(1);
    }

    let mut widths = SEGMENT_MASK
        .into_iter()
        .chain(std::iter::repeat(TRAILING_SEGMENT));
    let mut rest = code.as_bytes();
    let mut index = 0;
    let mut level = 0;
    while !rest.is_empty() {
        let width = widths.next().unwrap_or(TRAILING_SEGMENT).min(rest.len());
        let (segment, tail) = rest.split_at(width);
        index += 1;
        if segment.iter().any(|b| *b != b'0') {
            level = index;
        }
        rest = tail;
    }
    level.max(1)
}

/// Checks that a code only uses ASCII alphanumerics and segment separators.
pub(crate) fn validate_code(code: &str) -> Result<String, EngineError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(EngineError::InvalidField(
            "account code must not be empty".to_string(),
        ));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(EngineError::InvalidField(format!(
            "invalid account code: {code}"
        )));
    }
    Ok(code.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub company_id: i64,
    pub code: String,
    pub description: String,
    pub parent_code: Option<String>,
    pub level: i32,
    pub account_type: AccountType,
    pub currency: Currency,
    pub classifier: Option<String>,
    pub allows_auxiliary: bool,
    pub is_transactional: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: i64,
    pub code: String,
    pub description: String,
    pub parent_code: Option<String>,
    pub level: i32,
    pub account_type: String,
    pub currency: String,
    pub classifier: Option<String>,
    pub allows_auxiliary: bool,
    pub is_transactional: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            company_id: ActiveValue::Set(account.company_id),
            code: ActiveValue::Set(account.code.clone()),
            description: ActiveValue::Set(account.description.clone()),
            parent_code: ActiveValue::Set(account.parent_code.clone()),
            level: ActiveValue::Set(account.level),
            account_type: ActiveValue::Set(account.account_type.as_str().to_string()),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            classifier: ActiveValue::Set(account.classifier.clone()),
            allows_auxiliary: ActiveValue::Set(account.allows_auxiliary),
            is_transactional: ActiveValue::Set(account.is_transactional),
            is_active: ActiveValue::Set(account.is_active),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidField("invalid account id".to_string()))?,
            company_id: model.company_id,
            code: model.code,
            description: model.description,
            parent_code: model.parent_code,
            level: model.level,
            account_type: AccountType::from(model.account_type),
            currency: Currency::try_from(model.currency.as_str())?,
            classifier: model.classifier,
            allows_auxiliary: model.allows_auxiliary,
            is_transactional: model.is_transactional,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
