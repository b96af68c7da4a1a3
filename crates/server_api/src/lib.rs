//! Store operations behind the board/column/card routes.
//!
//! Validation mirrors the data model: titles are required, a card needs a
//! description, and a card may only point at a column of its own board.
//! Deletes never cascade.

use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    error::{ApiError, ErrorCode},
    protocol::{CardFilter, ColumnFilter, NewBoard, NewCard, NewColumn},
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_boards(ctx: &ApiContext) -> Result<Vec<Board>, ApiError> {
    ctx.storage.list_boards().await.map_err(internal)
}

pub async fn get_board(ctx: &ApiContext, board_id: &BoardId) -> Result<Board, ApiError> {
    ctx.storage
        .get_board(board_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("board", board_id))
}

pub async fn create_board(ctx: &ApiContext, board: NewBoard) -> Result<Board, ApiError> {
    require_text("title", &board.title)?;
    let board = ctx.storage.create_board(board).await.map_err(internal)?;
    info!(board_id = %board.id, "board created");
    Ok(board)
}

pub async fn update_board(
    ctx: &ApiContext,
    board_id: &BoardId,
    board: NewBoard,
) -> Result<Board, ApiError> {
    require_text("title", &board.title)?;
    ctx.storage
        .update_board(board_id, board)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("board", board_id))
}

pub async fn delete_board(ctx: &ApiContext, board_id: &BoardId) -> Result<(), ApiError> {
    if !ctx.storage.delete_board(board_id).await.map_err(internal)? {
        return Err(ApiError::not_found("board", board_id));
    }
    info!(%board_id, "board deleted");
    Ok(())
}

pub async fn list_columns(
    ctx: &ApiContext,
    filter: &ColumnFilter,
) -> Result<Vec<Column>, ApiError> {
    ctx.storage.list_columns(filter).await.map_err(internal)
}

pub async fn create_column(ctx: &ApiContext, column: NewColumn) -> Result<Column, ApiError> {
    validate_column(ctx, &column).await?;
    let column = ctx.storage.create_column(column).await.map_err(internal)?;
    info!(column_id = %column.id, board_id = %column.board_id, "column created");
    Ok(column)
}

pub async fn update_column(
    ctx: &ApiContext,
    column_id: &ColumnId,
    column: NewColumn,
) -> Result<Column, ApiError> {
    validate_column(ctx, &column).await?;
    ctx.storage
        .update_column(column_id, column)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("column", column_id))
}

pub async fn delete_column(ctx: &ApiContext, column_id: &ColumnId) -> Result<(), ApiError> {
    if !ctx.storage.delete_column(column_id).await.map_err(internal)? {
        return Err(ApiError::not_found("column", column_id));
    }
    info!(%column_id, "column deleted");
    Ok(())
}

pub async fn get_card(ctx: &ApiContext, card_id: &CardId) -> Result<Card, ApiError> {
    ctx.storage
        .get_card(card_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("card", card_id))
}

pub async fn list_cards(ctx: &ApiContext, filter: &CardFilter) -> Result<Vec<Card>, ApiError> {
    ctx.storage.list_cards(filter).await.map_err(internal)
}

pub async fn create_card(ctx: &ApiContext, card: NewCard) -> Result<Card, ApiError> {
    validate_card(ctx, &card).await?;
    let card = ctx.storage.create_card(card).await.map_err(internal)?;
    info!(card_id = %card.id, column_id = %card.column_id, "card created");
    Ok(card)
}

pub async fn update_card(
    ctx: &ApiContext,
    card_id: &CardId,
    card: NewCard,
) -> Result<Card, ApiError> {
    validate_card(ctx, &card).await?;
    ctx.storage
        .update_card(card_id, card)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("card", card_id))
}

pub async fn delete_card(ctx: &ApiContext, card_id: &CardId) -> Result<(), ApiError> {
    if !ctx.storage.delete_card(card_id).await.map_err(internal)? {
        return Err(ApiError::not_found("card", card_id));
    }
    info!(%card_id, "card deleted");
    Ok(())
}

async fn validate_column(ctx: &ApiContext, column: &NewColumn) -> Result<(), ApiError> {
    require_text("title", &column.title)?;
    let board = ctx
        .storage
        .get_board(&column.board_id)
        .await
        .map_err(internal)?;
    if board.is_none() {
        return Err(ApiError::validation(format!(
            "board {} does not exist",
            column.board_id
        )));
    }
    Ok(())
}

async fn validate_card(ctx: &ApiContext, card: &NewCard) -> Result<(), ApiError> {
    require_text("title", &card.title)?;
    require_text("description", &card.description)?;
    let column = ctx
        .storage
        .get_column(&card.column_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            ApiError::validation(format!("column {} does not exist", card.column_id))
        })?;
    if column.board_id != card.board_id {
        return Err(ApiError::validation(format!(
            "column {} does not belong to board {}",
            card.column_id, card.board_id
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
