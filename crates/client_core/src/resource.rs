//! Typed access to the board store.
//!
//! Each call maps to exactly one HTTP request (except
//! [`ResourceClient::update_card_description`], which reads before it
//! writes). Nothing is retried here; a failed request fails the caller.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    error::ApiError,
    protocol::{CardFilter, ColumnFilter, NewBoard, NewCard, NewColumn},
};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<Board>>;
    async fn fetch_board(&self, board_id: &BoardId) -> Result<Board>;
    async fn create_board(&self, board: &NewBoard) -> Result<Board>;
    async fn update_board(&self, board_id: &BoardId, board: &NewBoard) -> Result<Board>;
    async fn delete_board(&self, board_id: &BoardId) -> Result<()>;

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>>;
    async fn create_column(&self, column: &NewColumn) -> Result<Column>;
    async fn update_column(&self, column_id: &ColumnId, column: &NewColumn) -> Result<Column>;
    async fn delete_column(&self, column_id: &ColumnId) -> Result<()>;

    async fn fetch_card(&self, card_id: &CardId) -> Result<Card>;
    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>>;
    async fn create_card(&self, card: &NewCard) -> Result<Card>;
    async fn update_card(&self, card_id: &CardId, card: &NewCard) -> Result<Card>;
    async fn delete_card(&self, card_id: &CardId) -> Result<()>;

    /// Fetches the stored card and writes it back with a new description, so
    /// fields the caller never saw are preserved.
    async fn update_card_description(&self, card_id: &CardId, description: &str) -> Result<Card> {
        let mut card = self.fetch_card(card_id).await?.to_payload();
        card.description = description.to_string();
        self.update_card(card_id, &card).await
    }
}

pub struct RestClient {
    http: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        what: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let operation = format!("{method} {path}");
        debug!(%operation, "store request");

        let request = build(self.http.request(method, format!("{}{path}", self.base_url)));
        let response = request.send().await.map_err(|error| {
            warn!(%operation, %error, "store unreachable");
            ClientError::transport(&operation, error)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(%operation, "store returned not found");
            return Err(ClientError::not_found(what));
        }
        if !status.is_success() {
            let message = match response.json::<ApiError>().await {
                Ok(api_error) => api_error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            warn!(%operation, status = status.as_u16(), %message, "store rejected request");
            return Err(ClientError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        what: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T> {
        let operation = format!("{method} {path}");
        self.send(method, path, what, build)
            .await?
            .json::<T>()
            .await
            .map_err(|error| {
                warn!(%operation, %error, "undecodable store response");
                ClientError::transport(operation, error)
            })
    }
}

#[async_trait]
impl ResourceClient for RestClient {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.send_json(Method::GET, "/boards", "boards", |req| req)
            .await
    }

    async fn fetch_board(&self, board_id: &BoardId) -> Result<Board> {
        self.send_json(
            Method::GET,
            &format!("/boards/{board_id}"),
            &format!("board {board_id}"),
            |req| req,
        )
        .await
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        self.send_json(Method::POST, "/boards", "boards", |req| req.json(board))
            .await
    }

    async fn update_board(&self, board_id: &BoardId, board: &NewBoard) -> Result<Board> {
        self.send_json(
            Method::PUT,
            &format!("/boards/{board_id}"),
            &format!("board {board_id}"),
            |req| req.json(board),
        )
        .await
    }

    async fn delete_board(&self, board_id: &BoardId) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/boards/{board_id}"),
            &format!("board {board_id}"),
            |req| req,
        )
        .await?;
        Ok(())
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let filter = ColumnFilter {
            board_id: Some(board_id.clone()),
        };
        self.send_json(Method::GET, "/columns", "columns", |req| req.query(&filter))
            .await
    }

    async fn create_column(&self, column: &NewColumn) -> Result<Column> {
        self.send_json(Method::POST, "/columns", "columns", |req| req.json(column))
            .await
    }

    async fn update_column(&self, column_id: &ColumnId, column: &NewColumn) -> Result<Column> {
        self.send_json(
            Method::PUT,
            &format!("/columns/{column_id}"),
            &format!("column {column_id}"),
            |req| req.json(column),
        )
        .await
    }

    async fn delete_column(&self, column_id: &ColumnId) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/columns/{column_id}"),
            &format!("column {column_id}"),
            |req| req,
        )
        .await?;
        Ok(())
    }

    async fn fetch_card(&self, card_id: &CardId) -> Result<Card> {
        self.send_json(
            Method::GET,
            &format!("/cards/{card_id}"),
            &format!("card {card_id}"),
            |req| req,
        )
        .await
    }

    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        self.send_json(Method::GET, "/cards", "cards", |req| req.query(filter))
            .await
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card> {
        self.send_json(Method::POST, "/cards", "cards", |req| req.json(card))
            .await
    }

    async fn update_card(&self, card_id: &CardId, card: &NewCard) -> Result<Card> {
        self.send_json(
            Method::PUT,
            &format!("/cards/{card_id}"),
            &format!("card {card_id}"),
            |req| req.json(card),
        )
        .await
    }

    async fn delete_card(&self, card_id: &CardId) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/cards/{card_id}"),
            &format!("card {card_id}"),
            |req| req,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
