//! Chart of accounts endpoints.

use api_types::{
    ApiResponse, PagedResponse,
    account::{AccountList, AccountNew, AccountUpdate, AccountView},
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use engine::{AccountListFilter, AccountType, Page};

use crate::{
    ServerError, Tenant,
    extract::{Json, Path, Query},
    server::ServerState,
    views::{account_view, currency_in, paged},
};

pub async fn create(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), ServerError> {
    let cmd = engine::AccountNew {
        code: payload.code,
        description: payload.description,
        account_type: AccountType::from(payload.account_type.as_str()),
        parent_code: payload.parent_code,
        level: payload.level,
        currency: payload.currency.map(currency_in).unwrap_or_default(),
        classifier: payload.classifier,
        allows_auxiliary: payload.allows_auxiliary,
        is_transactional: payload.is_transactional.unwrap_or(true),
        is_active: payload.is_active.unwrap_or(true),
    };
    let account = state.engine.create_account(tenant.company_id, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(account_view(account))),
    ))
}

pub async fn list(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<ApiResponse<PagedResponse<AccountView>>>, ServerError> {
    let filter = AccountListFilter {
        code_from: query.code_from,
        code_to: query.code_to,
        account_type: query.account_type.as_deref().map(AccountType::from),
        level: query.level,
        active: query.active,
    };
    let page = state
        .engine
        .list_accounts(
            tenant.company_id,
            &filter,
            Page::new(query.page, query.limit),
        )
        .await?;

    Ok(Json(ApiResponse::ok(paged(page, account_view))))
}

pub async fn get(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    let account = state.engine.account(tenant.company_id, &code).await?;
    Ok(Json(ApiResponse::ok(account_view(account))))
}

pub async fn update(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    let cmd = engine::AccountUpdate {
        description: payload.description,
        account_type: payload.account_type.as_deref().map(AccountType::from),
        classifier: payload.classifier,
        allows_auxiliary: payload.allows_auxiliary,
        is_transactional: payload.is_transactional,
        is_active: payload.is_active,
    };
    let account = state
        .engine
        .update_account(tenant.company_id, &code, cmd)
        .await?;

    Ok(Json(ApiResponse::ok(account_view(account))))
}
