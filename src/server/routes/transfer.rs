use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::{get, post},
};
use std::convert::Infallible;
use tower_http::limit::RequestBodyLimitLayer;

use super::open_session;
use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::transfer::{ImportReport, RefreshReport, export_items, import_text, refresh_metadata};

pub async fn import_list(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
    body: String,
) -> Result<Json<ImportReport>, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    let report = import_text(&mut session, state.metadata.as_ref(), &body).await;
    Ok(Json(report))
}

pub async fn export_list(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
) -> Result<impl IntoResponse, ViewVaultError> {
    let session = open_session(&state, &uid, &selector).await?;
    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        export_items(session.items()),
    ))
}

pub async fn refresh_vault(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
) -> Result<Json<RefreshReport>, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    let report = refresh_metadata(
        &mut session,
        state.metadata.as_ref(),
        state.refresh_batch_size,
    )
    .await;
    Ok(Json(report))
}

pub fn router(import_body_limit: usize) -> Router<ViewVaultState> {
    Router::new()
        .route(
            "/users/{uid}/vaults/{vault}/import",
            post(import_list)
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(import_body_limit))
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/users/{uid}/vaults/{vault}/export", get(export_list))
        .route("/users/{uid}/vaults/{vault}/refresh", post(refresh_vault))
}
