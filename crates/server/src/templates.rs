//! Voucher template endpoints.

use api_types::{
    ApiResponse,
    template::{
        AppliedTemplateView, TemplateApply, TemplateLineNew, TemplateList, TemplateNew,
        TemplateUpdate, TemplateView,
    },
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use engine::{EngineError, Side, VoucherType};
use uuid::Uuid;

use crate::{
    ServerError, Tenant,
    extract::{Json, Path, Query},
    server::ServerState,
    views::{applied_view, parse_tag, template_view},
};

fn line_from(payload: TemplateLineNew) -> Result<engine::TemplateLineNew, EngineError> {
    Ok(engine::TemplateLineNew {
        side: Side::try_from(payload.side.as_str())?,
        account_code: payload.account_code,
        account_is_fixed: payload.account_is_fixed,
        percentage: payload.percentage,
        is_locked: payload.is_locked,
        allows_auxiliary: payload.allows_auxiliary,
        role: payload.role,
    })
}

pub async fn create(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Json(payload): Json<TemplateNew>,
) -> Result<(StatusCode, Json<ApiResponse<TemplateView>>), ServerError> {
    let cmd = engine::TemplateNew {
        code: payload.code,
        name: payload.name,
        description: payload.description,
        voucher_type: VoucherType::try_from(payload.voucher_type.as_str())?,
        lines: payload
            .lines
            .into_iter()
            .map(line_from)
            .collect::<Result<Vec<_>, _>>()?,
    };
    let template = state.engine.create_template(tenant.company_id, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(template_view(template))),
    ))
}

pub async fn list(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Query(query): Query<TemplateList>,
) -> Result<Json<ApiResponse<Vec<TemplateView>>>, ServerError> {
    let templates = state
        .engine
        .list_templates(tenant.company_id, query.only_active.unwrap_or(false))
        .await?;
    Ok(Json(ApiResponse::ok(
        templates.into_iter().map(template_view).collect(),
    )))
}

pub async fn get(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TemplateView>>, ServerError> {
    let template = state.engine.template(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(template_view(template))))
}

pub async fn update(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TemplateUpdate>,
) -> Result<Json<ApiResponse<TemplateView>>, ServerError> {
    let cmd = engine::TemplateUpdate {
        name: payload.name,
        description: payload.description,
        voucher_type: parse_tag(payload.voucher_type.as_deref())?,
        is_active: payload.is_active,
    };
    let template = state
        .engine
        .update_template(tenant.company_id, id, cmd)
        .await?;
    Ok(Json(ApiResponse::ok(template_view(template))))
}

pub async fn delete(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_template(tenant.company_id, id).await?;
    Ok(Json(ApiResponse::ok(())))
}

pub async fn add_line(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TemplateLineNew>,
) -> Result<(StatusCode, Json<ApiResponse<TemplateView>>), ServerError> {
    let template = state
        .engine
        .add_template_line(tenant.company_id, id, line_from(payload)?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(template_view(template))),
    ))
}

pub async fn update_line(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path((id, line_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TemplateLineNew>,
) -> Result<Json<ApiResponse<TemplateView>>, ServerError> {
    let template = state
        .engine
        .update_template_line(tenant.company_id, id, line_id, line_from(payload)?)
        .await?;
    Ok(Json(ApiResponse::ok(template_view(template))))
}

pub async fn delete_line(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path((id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<TemplateView>>, ServerError> {
    let template = state
        .engine
        .delete_template_line(tenant.company_id, id, line_id)
        .await?;
    Ok(Json(ApiResponse::ok(template_view(template))))
}

/// Replaces the lines of draft `voucher_id` with this template's skeleton.
pub async fn apply(
    Extension(tenant): Extension<Tenant>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TemplateApply>,
) -> Result<Json<ApiResponse<AppliedTemplateView>>, ServerError> {
    let template = state.engine.template(tenant.company_id, id).await?;
    let applied = state
        .engine
        .apply_template(tenant.company_id, query.voucher_id, &template.code)
        .await?;
    Ok(Json(ApiResponse::ok(applied_view(applied))))
}
