use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::RequestError;
use crate::models::resource::{
    CatalogRow, CreateResourceRequest, CreateResourceResponse, ResourceId,
};
use crate::models::vote::{VoteDirection, VoteRow};
use crate::server::state::AppState;

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.server.port);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/search/:search_term", get(search_resources))
        .route("/cat_tags/:search_term", get(search_tags))
        .route("/upvote/:id", post(upvote))
        .route("/downvote/:id", post(downvote))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CatalogRow>>, RequestError> {
    let rows = state.db_connection.list_resources().await?;
    Ok(Json(rows))
}

pub async fn search_resources(
    State(state): State<Arc<AppState>>,
    Path(search_term): Path<String>,
) -> Result<Json<Vec<CatalogRow>>, RequestError> {
    let rows = state.db_connection.search_resources(&search_term).await?;
    Ok(Json(rows))
}

pub async fn search_tags(
    State(state): State<Arc<AppState>>,
    Path(search_term): Path<String>,
) -> Result<Json<Vec<CatalogRow>>, RequestError> {
    let rows = state.db_connection.search_tags(&search_term).await?;
    Ok(Json(rows))
}

pub async fn upvote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ResourceId>,
) -> Result<Json<Vec<VoteRow>>, RequestError> {
    let row = state.db_connection.apply_vote(id, VoteDirection::Up).await?;
    Ok(Json(vec![row]))
}

pub async fn downvote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ResourceId>,
) -> Result<Json<Vec<VoteRow>>, RequestError> {
    let row = state
        .db_connection
        .apply_vote(id, VoteDirection::Down)
        .await?;
    Ok(Json(vec![row]))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<Json<CreateResourceResponse>, RequestError> {
    let response = state.db_connection.create_resource(&request).await?;
    Ok(Json(response))
}
