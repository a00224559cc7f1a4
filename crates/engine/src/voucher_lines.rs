//! Voucher lines: one debit/credit posting against an account.
//!
//! Each line carries both the BS and the USD pair. A voucher balances when the
//! debit and credit sums match in both currencies.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    /// 1-based position inside the voucher.
    pub order: i32,
    pub account_code: String,
    pub auxiliary_code: Option<String>,
    pub memo: Option<String>,
    pub debit_bs: Money,
    pub credit_bs: Money,
    pub debit_usd: Money,
    pub credit_usd: Money,
}

impl VoucherLine {
    #[must_use]
    pub fn new(account_code: impl Into<String>) -> Self {
        Self {
            account_code: account_code.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn auxiliary(mut self, code: impl Into<String>) -> Self {
        self.auxiliary_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn debit_bs(mut self, amount: Money) -> Self {
        self.debit_bs = amount;
        self
    }

    #[must_use]
    pub fn credit_bs(mut self, amount: Money) -> Self {
        self.credit_bs = amount;
        self
    }

    #[must_use]
    pub fn debit_usd(mut self, amount: Money) -> Self {
        self.debit_usd = amount;
        self
    }

    #[must_use]
    pub fn credit_usd(mut self, amount: Money) -> Self {
        self.credit_usd = amount;
        self
    }

    /// `(debit, credit)` pair for the given currency.
    #[must_use]
    pub fn amounts_in(&self, currency: Currency) -> (Money, Money) {
        match currency {
            Currency::Bs => (self.debit_bs, self.credit_bs),
            Currency::Usd => (self.debit_usd, self.credit_usd),
        }
    }

    pub(crate) fn has_negative_amount(&self) -> bool {
        [self.debit_bs, self.credit_bs, self.debit_usd, self.credit_usd]
            .iter()
            .any(|m| m.is_negative())
    }
}

/// Debit/credit sums of a set of lines in both currencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTotals {
    pub debit_bs: Money,
    pub credit_bs: Money,
    pub debit_usd: Money,
    pub credit_usd: Money,
}

impl VoucherTotals {
    /// Sums the lines; fails with `InvalidField` when a sum leaves the `i64`
    /// range.
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a VoucherLine>,
    ) -> Result<Self, EngineError> {
        lines.into_iter().try_fold(Self::default(), |mut acc, line| {
            acc.accumulate(&Self {
                debit_bs: line.debit_bs,
                credit_bs: line.credit_bs,
                debit_usd: line.debit_usd,
                credit_usd: line.credit_usd,
            })?;
            Ok(acc)
        })
    }

    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit_bs == self.credit_bs && self.debit_usd == self.credit_usd
    }

    /// Adds `other` in place. On overflow `self` is left untouched.
    pub fn accumulate(&mut self, other: &VoucherTotals) -> Result<(), EngineError> {
        *self = Self {
            debit_bs: self.debit_bs.try_add(other.debit_bs)?,
            credit_bs: self.credit_bs.try_add(other.credit_bs)?,
            debit_usd: self.debit_usd.try_add(other.debit_usd)?,
            credit_usd: self.credit_usd.try_add(other.credit_usd)?,
        };
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "voucher_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub voucher_id: String,
    pub line_order: i32,
    pub account_code: String,
    pub auxiliary_code: Option<String>,
    pub memo: Option<String>,
    pub debit_bs_minor: i64,
    pub credit_bs_minor: i64,
    pub debit_usd_minor: i64,
    pub credit_usd_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::vouchers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Vouchers,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_voucher(voucher_id: Uuid, line: &VoucherLine) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            voucher_id: ActiveValue::Set(voucher_id.to_string()),
            line_order: ActiveValue::Set(line.order),
            account_code: ActiveValue::Set(line.account_code.clone()),
            auxiliary_code: ActiveValue::Set(line.auxiliary_code.clone()),
            memo: ActiveValue::Set(line.memo.clone()),
            debit_bs_minor: ActiveValue::Set(line.debit_bs.minor()),
            credit_bs_minor: ActiveValue::Set(line.credit_bs.minor()),
            debit_usd_minor: ActiveValue::Set(line.debit_usd.minor()),
            credit_usd_minor: ActiveValue::Set(line.credit_usd.minor()),
        }
    }
}

impl From<Model> for VoucherLine {
    fn from(model: Model) -> Self {
        Self {
            order: model.line_order,
            account_code: model.account_code,
            auxiliary_code: model.auxiliary_code,
            memo: model.memo,
            debit_bs: Money::new(model.debit_bs_minor),
            credit_bs: Money::new(model.credit_bs_minor),
            debit_usd: Money::new(model.debit_usd_minor),
            credit_usd: Money::new(model.credit_usd_minor),
        }
    }
}
