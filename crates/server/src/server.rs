use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use engine::{Engine, EngineError};

use std::sync::Arc;

use crate::{
    Action, Authorizer, ServerError, Tenant, accounts, auxiliaries, reports, templates, vouchers,
};

static COMPANY_HEADER: HeaderName = HeaderName::from_static("x-company-id");
static USER_HEADER: HeaderName = HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub authorizer: Arc<dyn Authorizer>,
}

/// Resolves the tenant from `x-company-id`/`x-user-id` and checks the
/// subject may perform the request.
async fn tenant(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let company_id = request
        .headers()
        .get(&COMPANY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            ServerError::Unauthorized("missing or invalid x-company-id header".to_string())
        })?;
    let subject = request
        .headers()
        .get(&USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("anonymous")
        .to_string();

    let action = if request.method() == Method::GET {
        Action::Read
    } else {
        Action::Write
    };
    if !state.authorizer.allows(&subject, action) {
        tracing::warn!(company_id, subject = %subject, %action, "request refused");
        return Err(EngineError::Forbidden(format!("{subject} may not {action}")).into());
    }

    request.extensions_mut().insert(Tenant {
        company_id,
        subject,
    });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/{code}", get(accounts::get).put(accounts::update))
        .route(
            "/auxiliaries",
            get(auxiliaries::list).post(auxiliaries::create),
        )
        .route(
            "/auxiliaries/{id}",
            get(auxiliaries::get)
                .put(auxiliaries::update)
                .delete(auxiliaries::delete),
        )
        .route("/templates", get(templates::list).post(templates::create))
        .route(
            "/templates/{id}",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        .route("/templates/{id}/lines", post(templates::add_line))
        .route(
            "/templates/{id}/lines/{line_id}",
            put(templates::update_line).delete(templates::delete_line),
        )
        .route("/templates/{id}/apply", post(templates::apply))
        .route("/vouchers", get(vouchers::list).post(vouchers::create))
        .route("/vouchers/opening", post(vouchers::opening))
        .route(
            "/vouchers/{id}",
            get(vouchers::get)
                .put(vouchers::update)
                .delete(vouchers::delete),
        )
        .route("/vouchers/{id}/approve", post(vouchers::approve))
        .route("/reports/journal", get(reports::journal))
        .route("/reports/ledger", get(reports::ledger))
        .route("/reports/trial-balance", get(reports::trial_balance))
        .route(
            "/reports/trial-balance/export",
            get(reports::trial_balance_export),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), tenant))
        .with_state(state)
}

pub async fn run(engine: Engine, authorizer: Arc<dyn Authorizer>, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, authorizer, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    authorizer: Arc<dyn Authorizer>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        authorizer,
    };

    axum::serve(listener, router(state)).await
}
