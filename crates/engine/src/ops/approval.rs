//! Voucher approval and number assignment.
//!
//! Numbers come from a per-company counter row bumped inside the approval
//! transaction, so a rejected or rolled back approval never consumes a
//! number. Approvals of the same company are also serialised in process.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Voucher, VoucherState, VoucherTotals, voucher_sequences, vouchers,
};

use super::{Engine, VoucherDetail, load_lines, prepare_lines, require_voucher, with_tx};

/// Bumps and returns the company counter. Must run inside the approval
/// transaction.
async fn next_sequence(db_tx: &DatabaseTransaction, company_id: i64) -> ResultEngine<i64> {
    voucher_sequences::Entity::insert(voucher_sequences::ActiveModel {
        company_id: ActiveValue::Set(company_id),
        last_number: ActiveValue::Set(0),
    })
    .on_conflict(
        OnConflict::column(voucher_sequences::Column::CompanyId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db_tx)
    .await?;

    voucher_sequences::Entity::update_many()
        .col_expr(
            voucher_sequences::Column::LastNumber,
            Expr::col(voucher_sequences::Column::LastNumber).add(1),
        )
        .filter(voucher_sequences::Column::CompanyId.eq(company_id))
        .exec(db_tx)
        .await?;

    let row = voucher_sequences::Entity::find_by_id(company_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("voucher sequence {company_id}")))?;
    Ok(row.last_number)
}

impl Engine {
    /// Approves a draft: checks it is balanced in BS and USD, assigns the next
    /// company number and freezes it.
    pub async fn approve_voucher(
        &self,
        company_id: i64,
        voucher_id: Uuid,
    ) -> ResultEngine<VoucherDetail> {
        let lock = self.approval_lock(company_id);
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let voucher = Voucher::try_from(require_voucher(&db_tx, company_id, voucher_id).await?)?;
            if !voucher.is_draft() {
                tracing::warn!(company_id, %voucher_id, "approval of an approved voucher refused");
                return Err(EngineError::VoucherApproved(voucher_id.to_string()));
            }

            let lines = load_lines(&db_tx, voucher_id).await?;
            if lines.is_empty() {
                return Err(EngineError::InvalidField(
                    "a voucher needs at least one line to be approved".to_string(),
                ));
            }
            prepare_lines(&db_tx, company_id, lines.clone()).await?;

            let totals = VoucherTotals::from_lines(&lines)?;
            if !totals.is_balanced() {
                tracing::warn!(company_id, %voucher_id, ?totals, "unbalanced voucher refused");
                return Err(EngineError::Unbalanced(format!(
                    "BS debit {} credit {}, USD debit {} credit {}",
                    totals.debit_bs, totals.credit_bs, totals.debit_usd, totals.credit_usd
                )));
            }

            let number = next_sequence(&db_tx, company_id).await?;
            let now = Utc::now();
            let result = vouchers::Entity::update_many()
                .col_expr(vouchers::Column::Number, Expr::value(number))
                .col_expr(
                    vouchers::Column::State,
                    Expr::value(VoucherState::Aprobado.as_str()),
                )
                .col_expr(vouchers::Column::ApprovedAt, Expr::value(now))
                .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
                .filter(vouchers::Column::Id.eq(voucher_id.to_string()))
                .filter(vouchers::Column::State.eq(VoucherState::Borrador.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(EngineError::VoucherApproved(voucher_id.to_string()));
            }

            tracing::info!(company_id, %voucher_id, number, "voucher approved");
            Ok(VoucherDetail {
                voucher: Voucher {
                    number: Some(number),
                    state: VoucherState::Aprobado,
                    approved_at: Some(now),
                    updated_at: now,
                    ..voucher
                },
                lines,
                totals,
            })
        })
    }
}
