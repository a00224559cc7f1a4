use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, EntryType, OpeningNew, Page, Paged, ResultEngine, Voucher, VoucherHeader,
    VoucherLine, VoucherState, VoucherTotals, VoucherType, voucher_lines, vouchers,
};

use super::{
    Engine, load_lines, normalize_optional_text, prepare_lines, replace_lines, require_voucher,
    with_tx,
};

/// A voucher with its ordered lines and their sums.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherDetail {
    pub voucher: Voucher,
    pub lines: Vec<VoucherLine>,
    pub totals: VoucherTotals,
}

impl VoucherDetail {
    fn new(voucher: Voucher, lines: Vec<VoucherLine>) -> ResultEngine<Self> {
        let totals = VoucherTotals::from_lines(&lines)?;
        Ok(Self {
            voucher,
            lines,
            totals,
        })
    }
}

/// Filters for listing vouchers. Date bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct VoucherListFilter {
    pub state: Option<VoucherState>,
    pub voucher_type: Option<VoucherType>,
    pub fiscal_year: Option<i32>,
    pub period: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

trait ApplyVoucherFilters: QueryFilter + Sized {
    fn apply_voucher_filters(self, filter: &VoucherListFilter) -> Self;
}

impl<T> ApplyVoucherFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_voucher_filters(mut self, filter: &VoucherListFilter) -> Self {
        if let Some(state) = filter.state {
            self = self.filter(vouchers::Column::State.eq(state.as_str()));
        }
        if let Some(voucher_type) = filter.voucher_type {
            self = self.filter(vouchers::Column::VoucherType.eq(voucher_type.as_str()));
        }
        if let Some(year) = filter.fiscal_year {
            self = self.filter(vouchers::Column::FiscalYear.eq(year));
        }
        if let Some(period) = filter.period {
            self = self.filter(vouchers::Column::Period.eq(period));
        }
        if let Some(from) = filter.date_from {
            self = self.filter(vouchers::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            self = self.filter(vouchers::Column::Date.lte(to));
        }
        self
    }
}

fn normalize_header(header: VoucherHeader) -> ResultEngine<VoucherHeader> {
    header.validate()?;
    Ok(VoucherHeader {
        concept: normalize_optional_text(header.concept.as_deref()),
        beneficiary: normalize_optional_text(header.beneficiary.as_deref()),
        check_number: normalize_optional_text(header.check_number.as_deref()),
        ..header
    })
}

impl Engine {
    /// Creates a draft voucher. `lines` may be empty so a template can be
    /// applied afterwards.
    ///
    /// Header and lines are written in one transaction: a failing line leaves
    /// nothing behind.
    pub async fn create_voucher(
        &self,
        company_id: i64,
        header: VoucherHeader,
        lines: Vec<VoucherLine>,
    ) -> ResultEngine<VoucherDetail> {
        let header = normalize_header(header)?;

        with_tx!(self, |db_tx| {
            let lines = prepare_lines(&db_tx, company_id, lines).await?;
            let voucher = Voucher::draft(company_id, header, Utc::now());
            vouchers::ActiveModel::from(&voucher).insert(&db_tx).await?;
            replace_lines(&db_tx, voucher.id, &lines).await?;
            VoucherDetail::new(voucher, lines)
        })
    }

    /// Rewrites header and lines of a draft. Lines are replaced wholesale.
    pub async fn update_voucher(
        &self,
        company_id: i64,
        voucher_id: Uuid,
        header: VoucherHeader,
        lines: Vec<VoucherLine>,
    ) -> ResultEngine<VoucherDetail> {
        let header = normalize_header(header)?;

        with_tx!(self, |db_tx| {
            let current = Voucher::try_from(require_voucher(&db_tx, company_id, voucher_id).await?)?;
            if !current.is_draft() {
                return Err(EngineError::VoucherApproved(voucher_id.to_string()));
            }
            let lines = prepare_lines(&db_tx, company_id, lines).await?;

            let voucher = Voucher {
                header,
                updated_at: Utc::now(),
                ..current
            };
            let mut active = vouchers::ActiveModel::from(&voucher);
            active.id = ActiveValue::Unchanged(voucher_id.to_string());
            active.update(&db_tx).await?;
            replace_lines(&db_tx, voucher_id, &lines).await?;
            VoucherDetail::new(voucher, lines)
        })
    }

    /// Deletes a draft and its lines.
    pub async fn delete_voucher(&self, company_id: i64, voucher_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_voucher(&db_tx, company_id, voucher_id).await?;
            if VoucherState::try_from(model.state.as_str())? != VoucherState::Borrador {
                return Err(EngineError::VoucherApproved(voucher_id.to_string()));
            }
            voucher_lines::Entity::delete_many()
                .filter(voucher_lines::Column::VoucherId.eq(model.id.as_str()))
                .exec(&db_tx)
                .await?;
            vouchers::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn voucher(&self, company_id: i64, voucher_id: Uuid) -> ResultEngine<VoucherDetail> {
        with_tx!(self, |db_tx| {
            let voucher = Voucher::try_from(require_voucher(&db_tx, company_id, voucher_id).await?)?;
            let lines = load_lines(&db_tx, voucher_id).await?;
            VoucherDetail::new(voucher, lines)
        })
    }

    /// Lists voucher headers, newest first; drafts come after numbered
    /// vouchers of the same date.
    pub async fn list_vouchers(
        &self,
        company_id: i64,
        filter: &VoucherListFilter,
        page: Page,
    ) -> ResultEngine<Paged<Voucher>> {
        let paginator = vouchers::Entity::find()
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .apply_voucher_filters(filter)
            .order_by_desc(vouchers::Column::Date)
            .order_by_desc(vouchers::Column::Number)
            .order_by_desc(vouchers::Column::CreatedAt)
            .paginate(&self.database, page.limit);

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.page - 1)
            .await?
            .into_iter()
            .map(Voucher::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Paged {
            items,
            page: page.page,
            limit: page.limit,
            total,
            total_pages: total.div_ceil(page.limit),
        })
    }

    /// Creates the draft opening entry of a fiscal year. A company has at most
    /// one opening voucher per year.
    pub async fn create_opening_voucher(
        &self,
        company_id: i64,
        cmd: OpeningNew,
    ) -> ResultEngine<VoucherDetail> {
        let concept = normalize_optional_text(cmd.concept.as_deref())
            .unwrap_or_else(|| format!("Asiento de apertura gestión {}", cmd.fiscal_year));
        let header = VoucherHeader::new(cmd.date, 1, cmd.fiscal_year)
            .voucher_type(VoucherType::Diario)
            .entry_type(EntryType::Apertura)
            .exchange_rate(cmd.exchange_rate)
            .concept(concept);
        header.validate()?;

        let lock = self.approval_lock(company_id);
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let exists = vouchers::Entity::find()
                .filter(vouchers::Column::CompanyId.eq(company_id))
                .filter(vouchers::Column::FiscalYear.eq(cmd.fiscal_year))
                .filter(vouchers::Column::EntryType.eq(EntryType::Apertura.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::InvalidField(format!(
                    "an opening voucher already exists for fiscal year {}",
                    cmd.fiscal_year
                )));
            }

            let voucher = Voucher::draft(company_id, header, Utc::now());
            if let Err(err) = vouchers::ActiveModel::from(&voucher).insert(&db_tx).await {
                return Err(match err.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        EngineError::InvalidField(format!(
                            "an opening voucher already exists for fiscal year {}",
                            cmd.fiscal_year
                        ))
                    }
                    _ => err.into(),
                });
            }
            tracing::info!(
                company_id,
                fiscal_year = cmd.fiscal_year,
                voucher_id = %voucher.id,
                "opening voucher created"
            );
            VoucherDetail::new(voucher, Vec::new())
        })
    }
}
