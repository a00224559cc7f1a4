//! Auxiliary registry endpoints.

use api_types::{
    ApiResponse,
    auxiliary::{AuxiliaryList, AuxiliaryUpsert, AuxiliaryView},
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use engine::{AuxiliaryInput, AuxiliaryListFilter, AuxiliaryType, Contact, EngineError};
use uuid::Uuid;

use crate::{
    ServerError, Tenant,
    extract::{Json, Path, Query},
    server::ServerState,
    views::{auxiliary_view, currency_in, parse_tag},
};

fn input_from(payload: AuxiliaryUpsert) -> Result<AuxiliaryInput, EngineError> {
    Ok(AuxiliaryInput {
        type_tag: AuxiliaryType::try_from(payload.type_tag.as_str())?,
        code: payload.code,
        name: payload.name,
        linked_account_code: payload.linked_account_code,
        currency: payload.currency.map(currency_in).unwrap_or_default(),
        contact: Contact {
            tax_id: payload.tax_id,
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            department: payload.department,
        },
        is_active: payload.is_active.unwrap_or(true),
    })
}

pub async fn create(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Json(payload): Json<AuxiliaryUpsert>,
) -> Result<(StatusCode, Json<ApiResponse<AuxiliaryView>>), ServerError> {
    let auxiliary = state
        .engine
        .create_auxiliary(tenant.company_id, input_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(auxiliary_view(auxiliary))),
    ))
}

pub async fn list(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<AuxiliaryList>,
) -> Result<Json<ApiResponse<Vec<AuxiliaryView>>>, ServerError> {
    let filter = AuxiliaryListFilter {
        type_tag: parse_tag(query.type_tag.as_deref())?,
        account_code: query.account_code,
    };
    let auxiliaries = state
        .engine
        .list_auxiliaries(tenant.company_id, &filter)
        .await?;

    Ok(Json(ApiResponse::ok(
        auxiliaries.into_iter().map(auxiliary_view).collect(),
    )))
}

pub async fn get(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AuxiliaryView>>, ServerError> {
    let auxiliary = state.engine.auxiliary(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(auxiliary_view(auxiliary))))
}

pub async fn update(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AuxiliaryUpsert>,
) -> Result<Json<ApiResponse<AuxiliaryView>>, ServerError> {
    let auxiliary = state
        .engine
        .update_auxiliary(tenant.company_id, id, input_from(payload)?)
        .await?;
    Ok(Json(ApiResponse::ok(auxiliary_view(auxiliary))))
}

pub async fn delete(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_auxiliary(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(())))
}
