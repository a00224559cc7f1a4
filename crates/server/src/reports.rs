//! Journal, general ledger and trial balance endpoints.

use api_types::{
    ApiResponse,
    report::{
        JournalEntryView, JournalLineView, JournalQuery, JournalView, LedgerQuery, LedgerRowView,
        TrialBalanceAmountsView, TrialBalanceQuery, TrialBalanceRowView, TrialBalanceView,
    },
};
use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use engine::{
    AccountType, EngineError, JournalFilter, LedgerFilter, LedgerRow, StateFilter,
    TrialBalanceAmounts, TrialBalanceFilter,
};

use crate::{
    ServerError, Tenant,
    export::trial_balance_csv,
    extract::{Json, Query},
    server::ServerState,
    views::{currency_in, line_view, parse_tag, totals_view, voucher_view},
};

fn state_filter(value: Option<&str>) -> Result<StateFilter, EngineError> {
    Ok(parse_tag(value)?.unwrap_or_default())
}

fn amounts_view(amounts: &TrialBalanceAmounts) -> TrialBalanceAmountsView {
    TrialBalanceAmountsView {
        debit_bs_minor: amounts.debit_bs.minor(),
        credit_bs_minor: amounts.credit_bs.minor(),
        balance_bs_minor: amounts.balance_bs.minor(),
        debit_usd_minor: amounts.debit_usd.minor(),
        credit_usd_minor: amounts.credit_usd.minor(),
        balance_usd_minor: amounts.balance_usd.minor(),
    }
}

fn ledger_row_view(row: LedgerRow) -> LedgerRowView {
    LedgerRowView {
        account_code: row.account_code,
        account_description: row.account_description,
        date: row.date,
        voucher_id: row.voucher_id,
        voucher_number: row.voucher_number,
        entry_type: row.entry_type.as_str().to_string(),
        voucher_concept: row.voucher_concept,
        line_memo: row.line_memo,
        debit_minor: row.debit.minor(),
        credit_minor: row.credit.minor(),
        line_order: row.line_order,
        running_balance_minor: row.running_balance.minor(),
    }
}

fn trial_balance_filter(query: TrialBalanceQuery) -> Result<TrialBalanceFilter, EngineError> {
    let mut filter = TrialBalanceFilter::new(query.fiscal_year, query.period)
        .state(state_filter(query.state.as_deref())?)
        .include_zero(query.include_zero.unwrap_or(true))
        .include_totals(query.include_totals.unwrap_or(false));
    filter.code_from = query.code_from;
    filter.code_to = query.code_to;
    filter.max_level = query.max_level;
    filter.account_type = query.account_type.as_deref().map(AccountType::from);
    Ok(filter)
}

pub async fn journal(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<JournalQuery>,
) -> Result<Json<ApiResponse<JournalView>>, ServerError> {
    let filter = JournalFilter {
        fiscal_year: query.fiscal_year,
        period: query.period,
        entry_type: parse_tag(query.entry_type.as_deref())?,
        date_from: query.date_from,
        date_to: query.date_to,
        voucher_type: parse_tag(query.voucher_type.as_deref())?,
        state: state_filter(query.state.as_deref())?,
    };
    let journal = state.engine.journal(tenant.company_id, &filter).await?;

    let entries = journal
        .entries
        .into_iter()
        .map(|entry| JournalEntryView {
            totals: totals_view(&entry.totals),
            voucher: voucher_view(entry.voucher),
            lines: entry
                .lines
                .into_iter()
                .map(|line| JournalLineView {
                    line: line_view(line.line),
                    account_description: line.account_description,
                })
                .collect(),
        })
        .collect();

    Ok(Json(ApiResponse::ok(JournalView {
        entries,
        totals: totals_view(&journal.totals),
    })))
}

pub async fn ledger(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerRowView>>>, ServerError> {
    let filter = LedgerFilter {
        state: state_filter(query.state.as_deref())?,
        date_from: query.date_from,
        date_to: query.date_to,
        fiscal_year: query.fiscal_year,
        period: query.period,
        account_from: query.account_from,
        account_to: query.account_to,
        currency: query.currency.map(currency_in).unwrap_or_default(),
    };
    let rows = state
        .engine
        .general_ledger(tenant.company_id, &filter)
        .await?;

    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(ledger_row_view).collect(),
    )))
}

pub async fn trial_balance(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<TrialBalanceQuery>,
) -> Result<Json<ApiResponse<TrialBalanceView>>, ServerError> {
    let filter = trial_balance_filter(query)?;
    let balance = state
        .engine
        .trial_balance(tenant.company_id, &filter)
        .await?;

    Ok(Json(ApiResponse::ok(TrialBalanceView {
        rows: balance
            .rows
            .iter()
            .map(|row| TrialBalanceRowView {
                account_code: row.account_code.clone(),
                description: row.description.clone(),
                level: row.level,
                account_type: row.account_type.as_str().to_string(),
                amounts: amounts_view(&row.amounts),
            })
            .collect(),
        totals: balance.totals.as_ref().map(amounts_view),
    })))
}

/// Same rows as [`trial_balance`], always with the totals row, as CSV.
pub async fn trial_balance_export(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<TrialBalanceQuery>,
) -> Result<Response, ServerError> {
    let filter = trial_balance_filter(query)?.include_totals(true);
    let balance = state
        .engine
        .trial_balance(tenant.company_id, &filter)
        .await?;
    let body = trial_balance_csv(&balance)?;

    tracing::info!(
        company_id = tenant.company_id,
        subject = %tenant.subject,
        rows = balance.rows.len(),
        "trial balance exported"
    );

    let disposition = format!(
        "attachment; filename=\"balance_{}_{:02}.csv\"",
        filter.fiscal_year, filter.period
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
