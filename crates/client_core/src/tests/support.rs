//! In-memory store double for coordinator and page tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    protocol::{CardFilter, NewBoard, NewCard, NewColumn},
};
use tokio::sync::Notify;

use crate::{
    error::{ClientError, Result},
    resource::ResourceClient,
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    boards: Vec<Board>,
    columns: Vec<Column>,
    cards: Vec<Card>,
}

impl Tables {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    failing_card_deletes: Mutex<HashSet<CardId>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn seed_board(&self, title: &str) -> Board {
        let mut tables = self.tables.lock().expect("tables");
        let board = NewBoard::new(title).into_record(BoardId::new(tables.next_id()));
        tables.boards.push(board.clone());
        board
    }

    pub(crate) fn seed_column(&self, board_id: &BoardId, title: &str) -> Column {
        let mut tables = self.tables.lock().expect("tables");
        let column =
            NewColumn::new(title, board_id.clone()).into_record(ColumnId::new(tables.next_id()));
        tables.columns.push(column.clone());
        column
    }

    pub(crate) fn seed_card(&self, column: &Column, title: &str, description: &str) -> Card {
        let mut tables = self.tables.lock().expect("tables");
        let card = NewCard {
            title: title.to_string(),
            description: description.to_string(),
            column_id: column.id.clone(),
            board_id: column.board_id.clone(),
        }
        .into_record(CardId::new(tables.next_id()));
        tables.cards.push(card.clone());
        card
    }

    pub(crate) fn boards(&self) -> Vec<Board> {
        self.tables.lock().expect("tables").boards.clone()
    }

    pub(crate) fn columns(&self) -> Vec<Column> {
        self.tables.lock().expect("tables").columns.clone()
    }

    pub(crate) fn cards(&self) -> Vec<Card> {
        self.tables.lock().expect("tables").cards.clone()
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls").len()
    }

    pub(crate) fn count_of(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .expect("calls")
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub(crate) fn fail_operation(&self, operation: &'static str) {
        self.failing.lock().expect("failing").insert(operation);
    }

    pub(crate) fn fail_card_delete(&self, card_id: &CardId) {
        self.failing_card_deletes
            .lock()
            .expect("failing")
            .insert(card_id.clone());
    }

    /// Holds `operation` until the returned handle is notified.
    pub(crate) fn pause_operation(&self, operation: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .expect("gates")
            .insert(operation, Arc::clone(&gate));
        gate
    }

    async fn enter(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().expect("calls").push(operation);
        let gate = self.gates.lock().expect("gates").get(operation).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().expect("failing").contains(operation) {
            return Err(ClientError::transport(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for MemoryStore {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.enter("list_boards").await?;
        Ok(self.boards())
    }

    async fn fetch_board(&self, board_id: &BoardId) -> Result<Board> {
        self.enter("fetch_board").await?;
        self.boards()
            .into_iter()
            .find(|board| &board.id == board_id)
            .ok_or_else(|| ClientError::not_found(format!("board {board_id}")))
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        self.enter("create_board").await?;
        let mut tables = self.tables.lock().expect("tables");
        let record = board.clone().into_record(BoardId::new(tables.next_id()));
        tables.boards.push(record.clone());
        Ok(record)
    }

    async fn update_board(&self, board_id: &BoardId, board: &NewBoard) -> Result<Board> {
        self.enter("update_board").await?;
        let mut tables = self.tables.lock().expect("tables");
        let slot = tables
            .boards
            .iter_mut()
            .find(|existing| &existing.id == board_id)
            .ok_or_else(|| ClientError::not_found(format!("board {board_id}")))?;
        *slot = board.clone().into_record(board_id.clone());
        Ok(slot.clone())
    }

    async fn delete_board(&self, board_id: &BoardId) -> Result<()> {
        self.enter("delete_board").await?;
        let mut tables = self.tables.lock().expect("tables");
        let before = tables.boards.len();
        tables.boards.retain(|board| &board.id != board_id);
        if tables.boards.len() == before {
            return Err(ClientError::not_found(format!("board {board_id}")));
        }
        Ok(())
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        self.enter("list_columns").await?;
        Ok(self
            .columns()
            .into_iter()
            .filter(|column| &column.board_id == board_id)
            .collect())
    }

    async fn create_column(&self, column: &NewColumn) -> Result<Column> {
        self.enter("create_column").await?;
        let mut tables = self.tables.lock().expect("tables");
        let record = column.clone().into_record(ColumnId::new(tables.next_id()));
        tables.columns.push(record.clone());
        Ok(record)
    }

    async fn update_column(&self, column_id: &ColumnId, column: &NewColumn) -> Result<Column> {
        self.enter("update_column").await?;
        let mut tables = self.tables.lock().expect("tables");
        let slot = tables
            .columns
            .iter_mut()
            .find(|existing| &existing.id == column_id)
            .ok_or_else(|| ClientError::not_found(format!("column {column_id}")))?;
        *slot = column.clone().into_record(column_id.clone());
        Ok(slot.clone())
    }

    async fn delete_column(&self, column_id: &ColumnId) -> Result<()> {
        self.enter("delete_column").await?;
        let mut tables = self.tables.lock().expect("tables");
        let before = tables.columns.len();
        tables.columns.retain(|column| &column.id != column_id);
        if tables.columns.len() == before {
            return Err(ClientError::not_found(format!("column {column_id}")));
        }
        Ok(())
    }

    async fn fetch_card(&self, card_id: &CardId) -> Result<Card> {
        self.enter("fetch_card").await?;
        self.cards()
            .into_iter()
            .find(|card| &card.id == card_id)
            .ok_or_else(|| ClientError::not_found(format!("card {card_id}")))
    }

    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        self.enter("list_cards").await?;
        Ok(self
            .cards()
            .into_iter()
            .filter(|card| filter.board_id.as_ref().map_or(true, |id| &card.board_id == id))
            .filter(|card| {
                filter
                    .column_id
                    .as_ref()
                    .map_or(true, |id| &card.column_id == id)
            })
            .collect())
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card> {
        self.enter("create_card").await?;
        let mut tables = self.tables.lock().expect("tables");
        let record = card.clone().into_record(CardId::new(tables.next_id()));
        tables.cards.push(record.clone());
        Ok(record)
    }

    async fn update_card(&self, card_id: &CardId, card: &NewCard) -> Result<Card> {
        self.enter("update_card").await?;
        let mut tables = self.tables.lock().expect("tables");
        let slot = tables
            .cards
            .iter_mut()
            .find(|existing| &existing.id == card_id)
            .ok_or_else(|| ClientError::not_found(format!("card {card_id}")))?;
        *slot = card.clone().into_record(card_id.clone());
        Ok(slot.clone())
    }

    async fn delete_card(&self, card_id: &CardId) -> Result<()> {
        self.enter("delete_card").await?;
        if self
            .failing_card_deletes
            .lock()
            .expect("failing")
            .contains(card_id)
        {
            return Err(ClientError::Status {
                operation: format!("DELETE /cards/{card_id}"),
                status: 500,
                message: "database is locked".into(),
            });
        }
        let mut tables = self.tables.lock().expect("tables");
        let before = tables.cards.len();
        tables.cards.retain(|card| &card.id != card_id);
        if tables.cards.len() == before {
            return Err(ClientError::not_found(format!("card {card_id}")));
        }
        Ok(())
    }
}
