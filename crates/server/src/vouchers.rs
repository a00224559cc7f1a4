//! Voucher lifecycle endpoints.

use api_types::{
    ApiResponse, PagedResponse,
    voucher::{OpeningNew, VoucherDetailView, VoucherList, VoucherUpsert, VoucherView},
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use engine::{EngineError, ExchangeRate, Page, VoucherHeader, VoucherLine, VoucherListFilter};
use uuid::Uuid;

use crate::{
    ServerError, Tenant,
    extract::{Json, Path, Query},
    server::ServerState,
    views::{currency_in, detail_view, line_in, paged, parse_tag, voucher_view},
};

fn exchange_rate(value: Option<rust_decimal::Decimal>) -> Result<ExchangeRate, EngineError> {
    value.map_or(Ok(ExchangeRate::ONE), ExchangeRate::new)
}

fn header_and_lines(
    payload: VoucherUpsert,
) -> Result<(VoucherHeader, Vec<VoucherLine>), EngineError> {
    let mut header = VoucherHeader::new(payload.date, payload.period, payload.fiscal_year)
        .exchange_rate(exchange_rate(payload.exchange_rate)?);
    if let Some(origin) = parse_tag(payload.origin.as_deref())? {
        header = header.origin(origin);
    }
    if let Some(voucher_type) = parse_tag(payload.voucher_type.as_deref())? {
        header = header.voucher_type(voucher_type);
    }
    if let Some(entry_type) = parse_tag(payload.entry_type.as_deref())? {
        header = header.entry_type(entry_type);
    }
    if let Some(currency) = payload.currency {
        header = header.currency(currency_in(currency));
    }
    header.concept = payload.concept;
    header.beneficiary = payload.beneficiary;
    header.check_number = payload.check_number;

    let lines = payload.lines.into_iter().map(line_in).collect();
    Ok((header, lines))
}

pub async fn create(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Json(payload): Json<VoucherUpsert>,
) -> Result<(StatusCode, Json<ApiResponse<VoucherDetailView>>), ServerError> {
    let (header, lines) = header_and_lines(payload)?;
    let detail = state
        .engine
        .create_voucher(tenant.company_id, header, lines)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(detail_view(detail))),
    ))
}

pub async fn opening(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Json(payload): Json<OpeningNew>,
) -> Result<(StatusCode, Json<ApiResponse<VoucherDetailView>>), ServerError> {
    let cmd = engine::OpeningNew {
        fiscal_year: payload.fiscal_year,
        date: payload.date,
        exchange_rate: exchange_rate(payload.exchange_rate)?,
        concept: payload.concept,
    };
    let detail = state
        .engine
        .create_opening_voucher(tenant.company_id, cmd)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(detail_view(detail))),
    ))
}

pub async fn list(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<VoucherList>,
) -> Result<Json<ApiResponse<PagedResponse<VoucherView>>>, ServerError> {
    let filter = VoucherListFilter {
        state: parse_tag(query.state.as_deref())?,
        voucher_type: parse_tag(query.voucher_type.as_deref())?,
        fiscal_year: query.fiscal_year,
        period: query.period,
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let page = state
        .engine
        .list_vouchers(
            tenant.company_id,
            &filter,
            Page::new(query.page, query.limit),
        )
        .await?;

    Ok(Json(ApiResponse::ok(paged(page, voucher_view))))
}

pub async fn get(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoucherDetailView>>, ServerError> {
    let detail = state.engine.voucher(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(detail_view(detail))))
}

pub async fn update(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VoucherUpsert>,
) -> Result<Json<ApiResponse<VoucherDetailView>>, ServerError> {
    let (header, lines) = header_and_lines(payload)?;
    let detail = state
        .engine
        .update_voucher(tenant.company_id, id, header, lines)
        .await?;
    Ok(Json(ApiResponse::ok(detail_view(detail))))
}

pub async fn delete(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_voucher(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(())))
}

pub async fn approve(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoucherDetailView>>, ServerError> {
    let detail = state.engine.approve_voucher(tenant.company_id, id).await?;
    tracing::info!(
        company_id = tenant.company_id,
        subject = %tenant.subject,
        voucher_id = %id,
        number = ?detail.voucher.number,
        "approval requested over http"
    );
    Ok(Json(ApiResponse::ok(detail_view(detail))))
}
