use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::ApiContext;
use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    error::{ApiError, ErrorCode},
    protocol::{CardFilter, ColumnFilter, NewBoard, NewCard, NewColumn},
};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "kanban store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/boards", get(http_list_boards).post(http_create_board))
        .route(
            "/boards/:board_id",
            get(http_get_board)
                .put(http_update_board)
                .delete(http_delete_board),
        )
        .route("/columns", get(http_list_columns).post(http_create_column))
        .route(
            "/columns/:column_id",
            axum::routing::put(http_update_column).delete(http_delete_column),
        )
        .route("/cards", get(http_list_cards).post(http_create_card))
        .route(
            "/cards/:card_id",
            get(http_get_card)
                .put(http_update_card)
                .delete(http_delete_card),
        )
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        reject(ApiError::new(ErrorCode::Internal, e.to_string()))
    })?;
    Ok("ok")
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

fn deleted() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

async fn http_list_boards(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Board>>> {
    let boards = server_api::list_boards(&state.api).await.map_err(reject)?;
    Ok(Json(boards))
}

async fn http_get_board(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Board>> {
    let board = server_api::get_board(&state.api, &BoardId(board_id))
        .await
        .map_err(reject)?;
    Ok(Json(board))
}

async fn http_create_board(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = server_api::create_board(&state.api, req)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn http_update_board(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
    Json(req): Json<NewBoard>,
) -> ApiResult<Json<Board>> {
    let board = server_api::update_board(&state.api, &BoardId(board_id), req)
        .await
        .map_err(reject)?;
    Ok(Json(board))
}

async fn http_delete_board(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    server_api::delete_board(&state.api, &BoardId(board_id))
        .await
        .map_err(reject)?;
    Ok(deleted())
}

async fn http_list_columns(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ColumnFilter>,
) -> ApiResult<Json<Vec<Column>>> {
    let columns = server_api::list_columns(&state.api, &filter)
        .await
        .map_err(reject)?;
    Ok(Json(columns))
}

async fn http_create_column(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewColumn>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    let column = server_api::create_column(&state.api, req)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(column)))
}

async fn http_update_column(
    State(state): State<Arc<AppState>>,
    Path(column_id): Path<String>,
    Json(req): Json<NewColumn>,
) -> ApiResult<Json<Column>> {
    let column = server_api::update_column(&state.api, &ColumnId(column_id), req)
        .await
        .map_err(reject)?;
    Ok(Json(column))
}

async fn http_delete_column(
    State(state): State<Arc<AppState>>,
    Path(column_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    server_api::delete_column(&state.api, &ColumnId(column_id))
        .await
        .map_err(reject)?;
    Ok(deleted())
}

async fn http_list_cards(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<CardFilter>,
) -> ApiResult<Json<Vec<Card>>> {
    let cards = server_api::list_cards(&state.api, &filter)
        .await
        .map_err(reject)?;
    Ok(Json(cards))
}

async fn http_get_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
) -> ApiResult<Json<Card>> {
    let card = server_api::get_card(&state.api, &CardId(card_id))
        .await
        .map_err(reject)?;
    Ok(Json(card))
}

async fn http_create_card(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewCard>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let card = server_api::create_card(&state.api, req)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn http_update_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    Json(req): Json<NewCard>,
) -> ApiResult<Json<Card>> {
    let card = server_api::update_card(&state.api, &CardId(card_id), req)
        .await
        .map_err(reject)?;
    Ok(Json(card))
}

async fn http_delete_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    server_api::delete_card(&state.api, &CardId(card_id))
        .await
        .map_err(reject)?;
    Ok(deleted())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/end_to_end_tests.rs"]
mod end_to_end_tests;
