//! CSV rendering of reports.

use csv::Writer;
use engine::{TrialBalance, TrialBalanceAmounts};
use serde::Serialize;

#[derive(Serialize)]
struct TrialBalanceCsvRow<'a> {
    account_code: &'a str,
    description: &'a str,
    level: Option<i32>,
    account_type: &'a str,
    debit_bs: String,
    credit_bs: String,
    balance_bs: String,
    debit_usd: String,
    credit_usd: String,
    balance_usd: String,
}

impl<'a> TrialBalanceCsvRow<'a> {
    fn new(
        account_code: &'a str,
        description: &'a str,
        level: Option<i32>,
        account_type: &'a str,
        amounts: &TrialBalanceAmounts,
    ) -> Self {
        Self {
            account_code,
            description,
            level,
            account_type,
            debit_bs: amounts.debit_bs.to_string(),
            credit_bs: amounts.credit_bs.to_string(),
            balance_bs: amounts.balance_bs.to_string(),
            debit_usd: amounts.debit_usd.to_string(),
            credit_usd: amounts.credit_usd.to_string(),
            balance_usd: amounts.balance_usd.to_string(),
        }
    }
}

/// Renders a trial balance as CSV with a header row. Amounts use two
/// decimals; the totals, when present, close the file as a `TOTAL` row.
pub fn trial_balance_csv(balance: &TrialBalance) -> csv::Result<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    for row in &balance.rows {
        writer.serialize(TrialBalanceCsvRow::new(
            &row.account_code,
            &row.description,
            Some(row.level),
            row.account_type.as_str(),
            &row.amounts,
        ))?;
    }
    if let Some(totals) = &balance.totals {
        writer.serialize(TrialBalanceCsvRow::new("TOTAL", "", None, "", totals))?;
    }

    writer.into_inner().map_err(|err| err.into_error().into())
}
