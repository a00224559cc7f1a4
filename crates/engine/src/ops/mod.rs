use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, EngineError, ResultEngine, VoucherLine, VoucherTotals, accounts, auxiliaries,
    voucher_lines, vouchers,
};

mod approval;
mod chart;
mod lifecycle;
mod registry;
mod reporting;
mod templating;

pub use chart::AccountListFilter;
pub use lifecycle::{VoucherDetail, VoucherListFilter};
pub use registry::AuxiliaryListFilter;
pub use templating::AppliedTemplate;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// One async lock per company, held for the whole approval transaction.
    approval_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The connection the engine was built with.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    fn approval_lock(&self, company_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .approval_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(company_id).or_default().clone()
    }
}

fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

async fn find_account<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    code: &str,
) -> ResultEngine<Option<accounts::Model>> {
    Ok(accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id))
        .filter(accounts::Column::Code.eq(code))
        .one(db)
        .await?)
}

/// Code → description for every account of the company.
async fn account_descriptions<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
) -> ResultEngine<HashMap<String, String>> {
    Ok(accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.code, m.description))
        .collect())
}

async fn require_voucher<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    voucher_id: Uuid,
) -> ResultEngine<vouchers::Model> {
    vouchers::Entity::find_by_id(voucher_id.to_string())
        .filter(vouchers::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("voucher {voucher_id}")))
}

async fn load_lines<C: ConnectionTrait>(db: &C, voucher_id: Uuid) -> ResultEngine<Vec<VoucherLine>> {
    Ok(voucher_lines::Entity::find()
        .filter(voucher_lines::Column::VoucherId.eq(voucher_id.to_string()))
        .order_by_asc(voucher_lines::Column::LineOrder)
        .all(db)
        .await?
        .into_iter()
        .map(VoucherLine::from)
        .collect())
}

/// Delete-all then insert-all. Callers run it inside their transaction.
async fn replace_lines(
    db_tx: &DatabaseTransaction,
    voucher_id: Uuid,
    lines: &[VoucherLine],
) -> ResultEngine<()> {
    voucher_lines::Entity::delete_many()
        .filter(voucher_lines::Column::VoucherId.eq(voucher_id.to_string()))
        .exec(db_tx)
        .await?;
    for line in lines {
        voucher_lines::ActiveModel::for_voucher(voucher_id, line)
            .insert(db_tx)
            .await?;
    }
    Ok(())
}

/// Validates and renumbers lines before they are stored.
///
/// Every line needs an active account; auxiliaries need an auxiliary-enabled
/// account and must exist for the company. The debit and credit sums of the
/// whole voucher must fit in an `i64`.
async fn prepare_lines<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    lines: Vec<VoucherLine>,
) -> ResultEngine<Vec<VoucherLine>> {
    let mut prepared = Vec::with_capacity(lines.len());
    let mut accounts_seen: HashMap<String, Account> = HashMap::new();

    for (line, order) in lines.into_iter().zip(1..) {
        let account_code = line.account_code.trim().to_string();
        if account_code.is_empty() {
            return Err(EngineError::LineMissingAccount(order.to_string()));
        }
        if line.has_negative_amount() {
            return Err(EngineError::InvalidField(format!(
                "line {order}: amounts must not be negative"
            )));
        }

        if !accounts_seen.contains_key(&account_code) {
            let model = find_account(db, company_id, &account_code)
                .await?
                .ok_or_else(|| {
                    EngineError::InvalidAccount(format!("line {order}: {account_code} not found"))
                })?;
            accounts_seen.insert(account_code.clone(), Account::try_from(model)?);
        }
        let Some(account) = accounts_seen.get(&account_code) else {
            return Err(EngineError::InvalidAccount(account_code));
        };
        if !account.is_active {
            return Err(EngineError::InvalidAccount(format!(
                "line {order}: {account_code} is inactive"
            )));
        }

        let auxiliary_code = normalize_optional_text(line.auxiliary_code.as_deref());
        if let Some(aux_code) = &auxiliary_code {
            if !account.allows_auxiliary {
                return Err(EngineError::InvalidAccountLink(format!(
                    "line {order}: account {account_code} does not accept auxiliaries"
                )));
            }
            let exists = auxiliaries::Entity::find()
                .filter(auxiliaries::Column::CompanyId.eq(company_id))
                .filter(auxiliaries::Column::Code.eq(aux_code.as_str()))
                .one(db)
                .await?
                .is_some();
            if !exists {
                return Err(EngineError::InvalidAccountLink(format!(
                    "line {order}: auxiliary {aux_code} not found"
                )));
            }
        }

        prepared.push(VoucherLine {
            order,
            account_code,
            auxiliary_code,
            memo: normalize_optional_text(line.memo.as_deref()),
            ..line
        });
    }
    VoucherTotals::from_lines(&prepared)?;
    Ok(prepared)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            approval_locks: Mutex::new(HashMap::new()),
        })
    }
}
