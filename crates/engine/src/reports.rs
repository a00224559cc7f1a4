//! Read-side reports: journal book, general ledger and trial balance.
//!
//! The functions here are pure: the engine loads vouchers, lines and accounts
//! inside one transaction and hands them over for joining, sorting and
//! aggregation. Unknown account descriptions degrade to an empty string.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Account, AccountType, Currency, EngineError, EntryType, Money, Voucher, VoucherLine,
    VoucherState, VoucherTotals, VoucherType,
};

/// Which vouchers a report reads. Reports default to approved vouchers only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateFilter {
    #[default]
    Approved,
    Draft,
    All,
}

impl StateFilter {
    /// The state to filter on, `None` for every state.
    #[must_use]
    pub fn state(self) -> Option<VoucherState> {
        match self {
            Self::Approved => Some(VoucherState::Aprobado),
            Self::Draft => Some(VoucherState::Borrador),
            Self::All => None,
        }
    }
}

impl TryFrom<&str> for StateFilter {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "APROBADO" | "APPROVED" => Ok(Self::Approved),
            "BORRADOR" | "DRAFT" => Ok(Self::Draft),
            "TODOS" | "ALL" => Ok(Self::All),
            other => Err(EngineError::InvalidField(format!(
                "invalid state filter: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct JournalFilter {
    pub fiscal_year: Option<i32>,
    pub period: Option<i32>,
    pub entry_type: Option<EntryType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub voucher_type: Option<VoucherType>,
    pub state: StateFilter,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub line: VoucherLine,
    pub account_description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub voucher: Voucher,
    pub lines: Vec<JournalLine>,
    pub totals: VoucherTotals,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub entries: Vec<JournalEntry>,
    pub totals: VoucherTotals,
}

/// Orders vouchers by date then number (drafts last within a date) and
/// attaches their lines in line order.
pub fn build_journal(
    mut vouchers: Vec<Voucher>,
    mut lines: HashMap<Uuid, Vec<VoucherLine>>,
    descriptions: &HashMap<String, String>,
) -> Result<Journal, EngineError> {
    vouchers.sort_by(|a, b| {
        (a.header.date, a.number.is_none(), a.number, a.created_at).cmp(&(
            b.header.date,
            b.number.is_none(),
            b.number,
            b.created_at,
        ))
    });

    let mut journal = Journal::default();
    for voucher in vouchers {
        let mut voucher_lines = lines.remove(&voucher.id).unwrap_or_default();
        voucher_lines.sort_by_key(|l| l.order);
        let totals = VoucherTotals::from_lines(&voucher_lines)?;
        journal.totals.accumulate(&totals)?;
        let lines = voucher_lines
            .into_iter()
            .map(|line| JournalLine {
                account_description: describe(descriptions, &line.account_code),
                line,
            })
            .collect();
        journal.entries.push(JournalEntry {
            voucher,
            lines,
            totals,
        });
    }
    Ok(journal)
}

#[derive(Clone, Debug, Default)]
pub struct LedgerFilter {
    pub state: StateFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub fiscal_year: Option<i32>,
    pub period: Option<i32>,
    pub account_from: Option<String>,
    pub account_to: Option<String>,
    /// Selects the BS or USD debit/credit pair.
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub account_code: String,
    pub account_description: String,
    pub date: NaiveDate,
    pub voucher_id: Uuid,
    pub voucher_number: Option<i64>,
    pub entry_type: EntryType,
    pub voucher_concept: Option<String>,
    pub line_memo: Option<String>,
    pub debit: Money,
    pub credit: Money,
    pub line_order: i32,
    /// Cumulative `debit - credit`, restarting at every account.
    pub running_balance: Money,
}

/// Joins lines to their vouchers and sorts by account, date, voucher number
/// (compared as text) and line order. Lines whose voucher is missing are
/// dropped.
pub fn build_ledger(
    vouchers: &HashMap<Uuid, Voucher>,
    lines: Vec<(Uuid, VoucherLine)>,
    descriptions: &HashMap<String, String>,
    currency: Currency,
) -> Result<Vec<LedgerRow>, EngineError> {
    let mut rows: Vec<LedgerRow> = lines
        .into_iter()
        .filter_map(|(voucher_id, line)| {
            let voucher = vouchers.get(&voucher_id)?;
            let (debit, credit) = line.amounts_in(currency);
            Some(LedgerRow {
                account_description: describe(descriptions, &line.account_code),
                account_code: line.account_code,
                date: voucher.header.date,
                voucher_id,
                voucher_number: voucher.number,
                entry_type: voucher.header.entry_type,
                voucher_concept: voucher.header.concept.clone(),
                line_memo: line.memo,
                debit,
                credit,
                line_order: line.order,
                running_balance: Money::ZERO,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.account_code
            .cmp(&b.account_code)
            .then(a.date.cmp(&b.date))
            .then_with(|| number_text(a.voucher_number).cmp(&number_text(b.voucher_number)))
            .then(a.line_order.cmp(&b.line_order))
    });

    let mut current: Option<String> = None;
    let mut balance = Money::ZERO;
    for row in &mut rows {
        if current.as_deref() != Some(row.account_code.as_str()) {
            current = Some(row.account_code.clone());
            balance = Money::ZERO;
        }
        balance = balance.try_add(row.debit)?.try_sub(row.credit)?;
        row.running_balance = balance;
    }
    Ok(rows)
}

fn number_text(number: Option<i64>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct TrialBalanceFilter {
    pub fiscal_year: i32,
    pub period: i32,
    pub state: StateFilter,
    pub code_from: Option<String>,
    pub code_to: Option<String>,
    /// Keeps accounts with `level <= max_level`.
    pub max_level: Option<i32>,
    pub account_type: Option<AccountType>,
    pub include_zero: bool,
    pub include_totals: bool,
}

impl TrialBalanceFilter {
    #[must_use]
    pub fn new(fiscal_year: i32, period: i32) -> Self {
        Self {
            fiscal_year,
            period,
            state: StateFilter::default(),
            code_from: None,
            code_to: None,
            max_level: None,
            account_type: None,
            include_zero: true,
            include_totals: false,
        }
    }

    #[must_use]
    pub fn state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn include_zero(mut self, value: bool) -> Self {
        self.include_zero = value;
        self
    }

    #[must_use]
    pub fn include_totals(mut self, value: bool) -> Self {
        self.include_totals = value;
        self
    }
}

/// Debit, credit and balance of one account (or of the totals row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceAmounts {
    pub debit_bs: Money,
    pub credit_bs: Money,
    pub balance_bs: Money,
    pub debit_usd: Money,
    pub credit_usd: Money,
    pub balance_usd: Money,
}

impl TrialBalanceAmounts {
    fn from_totals(totals: &VoucherTotals) -> Result<Self, EngineError> {
        Ok(Self {
            debit_bs: totals.debit_bs,
            credit_bs: totals.credit_bs,
            balance_bs: totals.debit_bs.try_sub(totals.credit_bs)?,
            debit_usd: totals.debit_usd,
            credit_usd: totals.credit_usd,
            balance_usd: totals.debit_usd.try_sub(totals.credit_usd)?,
        })
    }

    fn accumulate(&mut self, other: &TrialBalanceAmounts) -> Result<(), EngineError> {
        *self = Self {
            debit_bs: self.debit_bs.try_add(other.debit_bs)?,
            credit_bs: self.credit_bs.try_add(other.credit_bs)?,
            balance_bs: self.balance_bs.try_add(other.balance_bs)?,
            debit_usd: self.debit_usd.try_add(other.debit_usd)?,
            credit_usd: self.credit_usd.try_add(other.credit_usd)?,
            balance_usd: self.balance_usd.try_add(other.balance_usd)?,
        };
        Ok(())
    }

    /// `true` when the account saw no debit or credit in either currency.
    #[must_use]
    pub fn has_no_movement(&self) -> bool {
        self.debit_bs.is_zero()
            && self.credit_bs.is_zero()
            && self.debit_usd.is_zero()
            && self.credit_usd.is_zero()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_code: String,
    pub description: String,
    pub level: i32,
    pub account_type: AccountType,
    pub amounts: TrialBalanceAmounts,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub totals: Option<TrialBalanceAmounts>,
}

/// Left-joins per-account sums of `movements` onto `accounts`.
///
/// `accounts` is expected to be filtered already; the result is ordered by
/// account code.
pub fn build_trial_balance<'a>(
    accounts: &[Account],
    movements: impl IntoIterator<Item = &'a VoucherLine>,
    include_zero: bool,
    include_totals: bool,
) -> Result<TrialBalance, EngineError> {
    let mut sums: HashMap<&str, VoucherTotals> = HashMap::new();
    for line in movements {
        sums.entry(line.account_code.as_str())
            .or_default()
            .accumulate(&VoucherTotals::from_lines([line])?)?;
    }

    let mut rows = Vec::with_capacity(accounts.len());
    for account in accounts {
        let totals = sums
            .get(account.code.as_str())
            .copied()
            .unwrap_or_default();
        let amounts = TrialBalanceAmounts::from_totals(&totals)?;
        if !include_zero && amounts.has_no_movement() {
            continue;
        }
        rows.push(TrialBalanceRow {
            account_code: account.code.clone(),
            description: account.description.clone(),
            level: account.level,
            account_type: account.account_type.clone(),
            amounts,
        });
    }
    rows.sort_by(|a, b| a.account_code.cmp(&b.account_code));

    let totals = if include_totals {
        let mut acc = TrialBalanceAmounts::default();
        for row in &rows {
            acc.accumulate(&row.amounts)?;
        }
        Some(acc)
    } else {
        None
    };

    Ok(TrialBalance { rows, totals })
}

fn describe(descriptions: &HashMap<String, String>, code: &str) -> String {
    descriptions.get(code).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::VoucherHeader;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn voucher(day: u32, number: Option<i64>) -> Voucher {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut v = Voucher::draft(1, VoucherHeader::new(date(day), 1, 2024), now);
        v.number = number;
        if number.is_some() {
            v.state = VoucherState::Aprobado;
        }
        v
    }

    fn account(code: &str) -> Account {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Account {
            id: Uuid::new_v4(),
            company_id: 1,
            code: code.to_string(),
            description: format!("account {code}"),
            parent_code: None,
            level: crate::derive_level(code),
            account_type: AccountType::Asset,
            currency: Currency::Bs,
            classifier: None,
            allows_auxiliary: false,
            is_transactional: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn journal_orders_by_date_then_number() {
        let late = voucher(20, Some(1));
        let early_b = voucher(5, Some(3));
        let early_a = voucher(5, Some(2));
        let ids = [late.id, early_a.id, early_b.id];

        let journal = build_journal(
            vec![late, early_b, early_a],
            HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        let order: Vec<Uuid> = journal.entries.iter().map(|e| e.voucher.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn journal_resolves_missing_descriptions_to_empty() {
        let v = voucher(1, Some(1));
        let id = v.id;
        let lines = HashMap::from([(
            id,
            vec![
                VoucherLine {
                    order: 2,
                    ..VoucherLine::new("999").credit_bs(Money::new(500))
                },
                VoucherLine {
                    order: 1,
                    ..VoucherLine::new("111").debit_bs(Money::new(500))
                },
            ],
        )]);
        let descriptions = HashMap::from([("111".to_string(), "Caja".to_string())]);

        let journal = build_journal(vec![v], lines, &descriptions).unwrap();

        let entry = &journal.entries[0];
        assert_eq!(entry.lines[0].account_description, "Caja");
        assert_eq!(entry.lines[1].account_description, "");
        assert!(entry.totals.is_balanced());
        assert_eq!(journal.totals.debit_bs, Money::new(500));
    }

    #[test]
    fn ledger_compares_numbers_as_text_and_drops_orphans() {
        let v2 = voucher(10, Some(2));
        let v10 = voucher(10, Some(10));
        let vouchers: HashMap<Uuid, Voucher> =
            [(v2.id, v2.clone()), (v10.id, v10.clone())].into();
        let lines = vec![
            (v2.id, VoucherLine::new("111").debit_bs(Money::new(100))),
            (v10.id, VoucherLine::new("111").debit_bs(Money::new(50))),
            (Uuid::new_v4(), VoucherLine::new("111").debit_bs(Money::new(1))),
        ];

        let rows = build_ledger(&vouchers, lines, &HashMap::new(), Currency::Bs).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].voucher_number, Some(10));
        assert_eq!(rows[1].voucher_number, Some(2));
        assert_eq!(rows[1].running_balance, Money::new(150));
    }

    #[test]
    fn ledger_running_balance_restarts_per_account() {
        let v = voucher(3, Some(1));
        let vouchers: HashMap<Uuid, Voucher> = [(v.id, v.clone())].into();
        let lines = vec![
            (v.id, VoucherLine::new("111").debit_usd(Money::new(70))),
            (v.id, VoucherLine::new("211").credit_usd(Money::new(70))),
        ];

        let rows = build_ledger(&vouchers, lines, &HashMap::new(), Currency::Usd).unwrap();

        assert_eq!(rows[0].running_balance, Money::new(70));
        assert_eq!(rows[1].running_balance, Money::new(-70));
    }

    #[test]
    fn trial_balance_sums_to_zero_and_can_hide_idle_accounts() {
        let accounts = vec![account("111"), account("211"), account("511")];
        let movements = vec![
            VoucherLine::new("111").debit_bs(Money::new(1000)),
            VoucherLine::new("211").credit_bs(Money::new(1000)),
        ];

        let full = build_trial_balance(&accounts, &movements, true, true).unwrap();
        assert_eq!(full.rows.len(), 3);
        let total = Money::try_sum(full.rows.iter().map(|r| r.amounts.balance_bs)).unwrap();
        assert_eq!(total, Money::ZERO);
        assert_eq!(full.totals.unwrap().debit_bs, Money::new(1000));

        let active = build_trial_balance(&accounts, &movements, false, false).unwrap();
        let codes: Vec<&str> = active.rows.iter().map(|r| r.account_code.as_str()).collect();
        assert_eq!(codes, vec!["111", "211"]);
        assert!(active.totals.is_none());
    }

    #[test]
    fn report_sums_refuse_to_wrap() {
        let v = voucher(4, Some(1));
        let id = v.id;
        let huge = || VoucherLine::new("111").debit_bs(Money::new(i64::MAX));

        let journal = build_journal(
            vec![v.clone()],
            HashMap::from([(id, vec![huge(), huge()])]),
            &HashMap::new(),
        );
        assert!(matches!(journal, Err(EngineError::InvalidField(_))));

        let vouchers: HashMap<Uuid, Voucher> = [(id, v)].into();
        let ledger = build_ledger(
            &vouchers,
            vec![(id, huge()), (id, huge())],
            &HashMap::new(),
            Currency::Bs,
        );
        assert!(ledger.is_err());

        let movements = vec![huge(), huge()];
        assert!(build_trial_balance(&[account("111")], &movements, true, false).is_err());
    }
}
