use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, EngineError, EntryType, Journal, JournalFilter, LedgerFilter, LedgerRow,
    ResultEngine, TrialBalance, TrialBalanceFilter, Voucher, VoucherLine, VoucherState,
    VoucherType, accounts,
    reports::{build_journal, build_ledger, build_trial_balance},
    voucher_lines, vouchers,
};

use super::{Engine, account_descriptions, normalize_optional_text, with_tx};

/// Voucher-level conditions shared by the three reports.
#[derive(Clone, Debug, Default)]
struct VoucherScope {
    state: Option<VoucherState>,
    fiscal_year: Option<i32>,
    period: Option<i32>,
    entry_type: Option<EntryType>,
    voucher_type: Option<VoucherType>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

impl From<&JournalFilter> for VoucherScope {
    fn from(filter: &JournalFilter) -> Self {
        Self {
            state: filter.state.state(),
            fiscal_year: filter.fiscal_year,
            period: filter.period,
            entry_type: filter.entry_type,
            voucher_type: filter.voucher_type,
            date_from: filter.date_from,
            date_to: filter.date_to,
        }
    }
}

impl From<&LedgerFilter> for VoucherScope {
    fn from(filter: &LedgerFilter) -> Self {
        Self {
            state: filter.state.state(),
            fiscal_year: filter.fiscal_year,
            period: filter.period,
            date_from: filter.date_from,
            date_to: filter.date_to,
            ..Self::default()
        }
    }
}

impl From<&TrialBalanceFilter> for VoucherScope {
    fn from(filter: &TrialBalanceFilter) -> Self {
        Self {
            state: filter.state.state(),
            fiscal_year: Some(filter.fiscal_year),
            period: Some(filter.period),
            ..Self::default()
        }
    }
}

trait ApplyVoucherScope: QueryFilter + Sized {
    fn apply_scope(self, company_id: i64, scope: &VoucherScope) -> Self;
}

impl<T> ApplyVoucherScope for T
where
    T: QueryFilter + Sized,
{
    fn apply_scope(mut self, company_id: i64, scope: &VoucherScope) -> Self {
        self = self.filter(vouchers::Column::CompanyId.eq(company_id));
        if let Some(state) = scope.state {
            self = self.filter(vouchers::Column::State.eq(state.as_str()));
        }
        if let Some(year) = scope.fiscal_year {
            self = self.filter(vouchers::Column::FiscalYear.eq(year));
        }
        if let Some(period) = scope.period {
            self = self.filter(vouchers::Column::Period.eq(period));
        }
        if let Some(entry_type) = scope.entry_type {
            self = self.filter(vouchers::Column::EntryType.eq(entry_type.as_str()));
        }
        if let Some(voucher_type) = scope.voucher_type {
            self = self.filter(vouchers::Column::VoucherType.eq(voucher_type.as_str()));
        }
        if let Some(from) = scope.date_from {
            self = self.filter(vouchers::Column::Date.gte(from));
        }
        if let Some(to) = scope.date_to {
            self = self.filter(vouchers::Column::Date.lte(to));
        }
        self
    }
}

fn check_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(EngineError::InvalidField(
            "invalid range: date_from must not be after date_to".to_string(),
        ));
    }
    Ok(())
}

async fn scoped_vouchers<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    scope: &VoucherScope,
) -> ResultEngine<Vec<Voucher>> {
    vouchers::Entity::find()
        .apply_scope(company_id, scope)
        .all(db)
        .await?
        .into_iter()
        .map(Voucher::try_from)
        .collect()
}

/// Lines of the vouchers in scope, optionally restricted to an account range.
async fn scoped_lines<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    scope: &VoucherScope,
    account_from: Option<&str>,
    account_to: Option<&str>,
) -> ResultEngine<Vec<(Uuid, VoucherLine)>> {
    let mut query = voucher_lines::Entity::find()
        .inner_join(vouchers::Entity)
        .apply_scope(company_id, scope);
    if let Some(from) = account_from {
        query = query.filter(voucher_lines::Column::AccountCode.gte(from));
    }
    if let Some(to) = account_to {
        query = query.filter(voucher_lines::Column::AccountCode.lte(to));
    }

    query
        .all(db)
        .await?
        .into_iter()
        .map(|model| {
            let voucher_id = Uuid::parse_str(&model.voucher_id)
                .map_err(|_| EngineError::InvalidField("invalid voucher id".to_string()))?;
            Ok((voucher_id, VoucherLine::from(model)))
        })
        .collect()
}

impl Engine {
    /// Libro diario: vouchers in chronological order with their lines.
    pub async fn journal(&self, company_id: i64, filter: &JournalFilter) -> ResultEngine<Journal> {
        check_date_range(filter.date_from, filter.date_to)?;
        let scope = VoucherScope::from(filter);

        with_tx!(self, |db_tx| {
            let vouchers = scoped_vouchers(&db_tx, company_id, &scope).await?;
            let mut lines: HashMap<Uuid, Vec<VoucherLine>> = HashMap::new();
            for (voucher_id, line) in scoped_lines(&db_tx, company_id, &scope, None, None).await? {
                lines.entry(voucher_id).or_default().push(line);
            }
            let descriptions = account_descriptions(&db_tx, company_id).await?;
            build_journal(vouchers, lines, &descriptions)
        })
    }

    /// Libro mayor: one row per line in the account range, grouped by account.
    pub async fn general_ledger(
        &self,
        company_id: i64,
        filter: &LedgerFilter,
    ) -> ResultEngine<Vec<LedgerRow>> {
        check_date_range(filter.date_from, filter.date_to)?;
        let scope = VoucherScope::from(filter);
        let account_from = normalize_optional_text(filter.account_from.as_deref());
        let account_to = normalize_optional_text(filter.account_to.as_deref());

        with_tx!(self, |db_tx| {
            let vouchers: HashMap<Uuid, Voucher> = scoped_vouchers(&db_tx, company_id, &scope)
                .await?
                .into_iter()
                .map(|v| (v.id, v))
                .collect();
            let lines = scoped_lines(
                &db_tx,
                company_id,
                &scope,
                account_from.as_deref(),
                account_to.as_deref(),
            )
            .await?;
            let descriptions = account_descriptions(&db_tx, company_id).await?;
            build_ledger(&vouchers, lines, &descriptions, filter.currency)
        })
    }

    /// Balance de sumas y saldos for one fiscal year and period.
    pub async fn trial_balance(
        &self,
        company_id: i64,
        filter: &TrialBalanceFilter,
    ) -> ResultEngine<TrialBalance> {
        if !(1..=12).contains(&filter.period) {
            return Err(EngineError::InvalidField(format!(
                "period must be between 1 and 12, got {}",
                filter.period
            )));
        }
        let scope = VoucherScope::from(filter);

        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find()
                .filter(accounts::Column::CompanyId.eq(company_id))
                .filter(accounts::Column::IsActive.eq(true));
            if let Some(from) = normalize_optional_text(filter.code_from.as_deref()) {
                query = query.filter(accounts::Column::Code.gte(from));
            }
            if let Some(to) = normalize_optional_text(filter.code_to.as_deref()) {
                query = query.filter(accounts::Column::Code.lte(to));
            }
            if let Some(level) = filter.max_level {
                query = query.filter(accounts::Column::Level.lte(level));
            }
            if let Some(account_type) = &filter.account_type {
                query = query.filter(accounts::Column::AccountType.eq(account_type.as_str()));
            }
            let chart = query
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Account::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let movements = scoped_lines(&db_tx, company_id, &scope, None, None).await?;
            build_trial_balance(
                &chart,
                movements.iter().map(|(_, line)| line),
                filter.include_zero,
                filter.include_totals,
            )
        })
    }
}
