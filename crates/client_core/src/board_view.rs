//! A single board page: the board, its columns in order, each column's
//! cards, and the transient form state around them.
//!
//! Every mutation goes to the store first and is applied to the view only
//! after the store confirms it. Failed or rejected operations leave the
//! view exactly as it was.

use std::sync::Arc;

use futures::future::try_join_all;
use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    protocol::{CardFilter, NewCard, NewColumn},
};
use tokio::sync::broadcast;
use tracing::info;

use crate::{
    cascade::{CascadeCoordinator, CascadeReport},
    error::{ClientError, Result},
    resource::ResourceClient,
    view::{require_text, ViewCell, ViewEvent},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BoardPhase {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDraft {
    pub title: String,
    pub description: String,
}

/// Form state that belongs to one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnUiState {
    pub show_card_inputs: bool,
    pub card_draft: CardDraft,
    /// Pending title while the column header is being edited.
    pub title_edit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: Column,
    pub cards: Vec<Card>,
    pub ui: ColumnUiState,
}

impl ColumnView {
    fn new(column: Column, cards: Vec<Card>) -> Self {
        Self {
            column,
            cards,
            ui: ColumnUiState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEdit {
    pub card_id: CardId,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardViewState {
    board_id: BoardId,
    phase: BoardPhase,
    board: Option<Board>,
    columns: Vec<ColumnView>,
    new_column_title: String,
    card_edit: Option<CardEdit>,
}

impl BoardViewState {
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            phase: BoardPhase::Loading,
            board: None,
            columns: Vec::new(),
            new_column_title: String::new(),
            card_edit: None,
        }
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn phase(&self) -> &BoardPhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == BoardPhase::Ready
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn columns(&self) -> &[ColumnView] {
        &self.columns
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|view| &view.column.id == column_id)
    }

    fn column_mut(&mut self, column_id: &ColumnId) -> Option<&mut ColumnView> {
        self.columns
            .iter_mut()
            .find(|view| &view.column.id == column_id)
    }

    pub fn cards(&self, column_id: &ColumnId) -> Option<&[Card]> {
        self.column(column_id).map(|view| view.cards.as_slice())
    }

    pub fn find_card(&self, card_id: &CardId) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|view| view.cards.iter())
            .find(|card| &card.id == card_id)
    }

    pub fn new_column_title(&self) -> &str {
        &self.new_column_title
    }

    pub fn card_edit(&self) -> Option<&CardEdit> {
        self.card_edit.as_ref()
    }

    pub fn set_new_column_title(&mut self, title: impl Into<String>) {
        self.new_column_title = title.into();
    }

    pub fn toggle_card_inputs(&mut self, column_id: &ColumnId) {
        if let Some(view) = self.column_mut(column_id) {
            view.ui.show_card_inputs = !view.ui.show_card_inputs;
        }
    }

    pub fn set_card_draft(&mut self, column_id: &ColumnId, draft: CardDraft) {
        if let Some(view) = self.column_mut(column_id) {
            view.ui.card_draft = draft;
        }
    }

    /// Only one column header is editable at a time.
    pub fn begin_column_edit(&mut self, column_id: &ColumnId) {
        for view in &mut self.columns {
            view.ui.title_edit = if &view.column.id == column_id {
                Some(view.column.title.clone())
            } else {
                None
            };
        }
    }

    pub fn set_column_edit_title(&mut self, column_id: &ColumnId, title: impl Into<String>) {
        if let Some(edit) = self
            .column_mut(column_id)
            .and_then(|view| view.ui.title_edit.as_mut())
        {
            *edit = title.into();
        }
    }

    pub fn cancel_column_edit(&mut self, column_id: &ColumnId) {
        if let Some(view) = self.column_mut(column_id) {
            view.ui.title_edit = None;
        }
    }

    pub fn begin_card_edit(&mut self, card_id: &CardId) {
        self.card_edit = self.find_card(card_id).map(|card| CardEdit {
            card_id: card.id.clone(),
            draft: card.description.clone(),
        });
    }

    pub fn set_card_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.card_edit.as_mut() {
            edit.draft = text.into();
        }
    }

    pub fn cancel_card_edit(&mut self) {
        self.card_edit = None;
    }

    pub(crate) fn apply_loaded(&mut self, board: Board, columns: Vec<(Column, Vec<Card>)>) {
        self.board = Some(board);
        self.columns = columns
            .into_iter()
            .map(|(column, cards)| ColumnView::new(column, cards))
            .collect();
        self.card_edit = None;
        self.phase = BoardPhase::Ready;
    }

    /// A failed reload keeps the board that is already on screen.
    pub(crate) fn apply_load_failed(&mut self, message: String) {
        if !self.is_ready() {
            self.phase = BoardPhase::Failed(message);
        }
    }

    pub(crate) fn apply_column_added(&mut self, column: Column) {
        self.columns.push(ColumnView::new(column, Vec::new()));
        self.new_column_title.clear();
    }

    pub(crate) fn apply_column_renamed(&mut self, column: Column) -> bool {
        match self.column_mut(&column.id) {
            Some(view) => {
                view.column = column;
                view.ui.title_edit = None;
                true
            }
            None => false,
        }
    }

    pub(crate) fn apply_column_deleted(&mut self, column_id: &ColumnId) -> bool {
        let before = self.columns.len();
        self.columns.retain(|view| &view.column.id != column_id);
        if let Some(edit) = &self.card_edit {
            if self.find_card(&edit.card_id).is_none() {
                self.card_edit = None;
            }
        }
        self.columns.len() != before
    }

    pub(crate) fn apply_card_added(&mut self, card: Card) -> bool {
        match self.column_mut(&card.column_id) {
            Some(view) => {
                view.cards.push(card);
                true
            }
            None => false,
        }
    }

    pub(crate) fn apply_card_description(&mut self, card_id: &CardId, description: String) -> bool {
        let Some(card) = self
            .columns
            .iter_mut()
            .flat_map(|view| view.cards.iter_mut())
            .find(|card| &card.id == card_id)
        else {
            return false;
        };
        card.description = description;
        if self
            .card_edit
            .as_ref()
            .is_some_and(|edit| &edit.card_id == card_id)
        {
            self.card_edit = None;
        }
        true
    }

    pub(crate) fn apply_card_deleted(&mut self, column_id: &ColumnId, card_id: &CardId) -> bool {
        let Some(view) = self.column_mut(column_id) else {
            return false;
        };
        let before = view.cards.len();
        view.cards.retain(|card| &card.id != card_id);
        let removed = view.cards.len() != before;
        if self
            .card_edit
            .as_ref()
            .is_some_and(|edit| &edit.card_id == card_id)
        {
            self.card_edit = None;
        }
        removed
    }
}

pub struct BoardPage {
    client: Arc<dyn ResourceClient>,
    cascade: CascadeCoordinator,
    board_id: BoardId,
    view: ViewCell<BoardViewState>,
}

impl BoardPage {
    /// Mounts the page in the loading phase; call [`Self::load`] to fill it.
    pub fn mount(client: Arc<dyn ResourceClient>, board_id: BoardId) -> Arc<Self> {
        Arc::new(Self {
            cascade: CascadeCoordinator::new(Arc::clone(&client)),
            client,
            view: ViewCell::new(BoardViewState::new(board_id.clone())),
            board_id,
        })
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.view.subscribe()
    }

    pub async fn snapshot(&self) -> Option<BoardViewState> {
        self.view.snapshot().await
    }

    pub async fn is_mounted(&self) -> bool {
        self.view.is_mounted().await
    }

    pub async fn unmount(&self) {
        self.view.unmount().await;
    }

    /// Local form changes: toggling inputs, typing drafts, entering or
    /// leaving edit mode. Returns false once the page is unmounted.
    pub async fn edit(&self, f: impl FnOnce(&mut BoardViewState)) -> bool {
        self.view.update(f).await.is_some()
    }

    /// Board, then its columns, then every column's cards concurrently.
    pub async fn load(&self) -> Result<()> {
        match self.fetch_tree().await {
            Ok((board, columns)) => {
                info!(board_id = %self.board_id, columns = columns.len(), "board loaded");
                self.view
                    .update(|state| state.apply_loaded(board, columns))
                    .await;
                Ok(())
            }
            Err(error) => {
                let message = error.to_string();
                self.view
                    .update(|state| state.apply_load_failed(message))
                    .await;
                Err(self.view.fail("load_board", error))
            }
        }
    }

    async fn fetch_tree(&self) -> Result<(Board, Vec<(Column, Vec<Card>)>)> {
        let board = self.client.fetch_board(&self.board_id).await?;
        let columns = self.client.list_columns(&self.board_id).await?;
        let filters: Vec<_> = columns
            .iter()
            .map(|column| CardFilter::board_column(self.board_id.clone(), column.id.clone()))
            .collect();
        let cards = try_join_all(filters.iter().map(|filter| self.client.list_cards(filter))).await?;
        Ok((board, columns.into_iter().zip(cards).collect()))
    }

    pub async fn add_column(&self, title: &str) -> Result<Column> {
        let operation = "add_column";
        require_text("column title", title).map_err(|e| self.view.fail(operation, e))?;
        self.ensure_ready(operation).await?;

        let column = self
            .client
            .create_column(&NewColumn::new(title, self.board_id.clone()))
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_column_added(column.clone()))
            .await;
        Ok(column)
    }

    /// Adds a column from the title typed into the new-column field.
    pub async fn submit_new_column(&self) -> Result<Column> {
        let title = self
            .view
            .read_mounted("add_column", |state| state.new_column_title.clone())
            .await?;
        self.add_column(&title).await
    }

    pub async fn rename_column(&self, column_id: &ColumnId, title: &str) -> Result<Column> {
        let operation = "rename_column";
        require_text("column title", title).map_err(|e| self.view.fail(operation, e))?;
        self.ensure_column(operation, column_id).await?;

        let column = self
            .client
            .update_column(column_id, &NewColumn::new(title, self.board_id.clone()))
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_column_renamed(column.clone()))
            .await;
        Ok(column)
    }

    /// Commits the pending header edit of a column.
    pub async fn save_column_edit(&self, column_id: &ColumnId) -> Result<Column> {
        let title = self
            .view
            .read_mounted("rename_column", |state| {
                state
                    .column(column_id)
                    .and_then(|view| view.ui.title_edit.clone())
            })
            .await?
            .ok_or_else(|| {
                self.view.fail(
                    "rename_column",
                    ClientError::validation(format!("column {column_id} is not being edited")),
                )
            })?;
        self.rename_column(column_id, &title).await
    }

    pub async fn delete_column(&self, column_id: &ColumnId) -> Result<CascadeReport> {
        let operation = "delete_column";
        self.ensure_column(operation, column_id).await?;

        let report = self
            .cascade
            .delete_column(column_id)
            .await
            .map_err(|e| self.view.fail(operation, e.into()))?;
        self.view
            .update(|state| state.apply_column_deleted(column_id))
            .await;
        Ok(report)
    }

    pub async fn add_card(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: &str,
    ) -> Result<Card> {
        let operation = "add_card";
        require_text("card title", title)
            .and_then(|()| require_text("card description", description))
            .map_err(|e| self.view.fail(operation, e))?;
        self.ensure_column(operation, column_id).await?;

        let card = self
            .client
            .create_card(&NewCard {
                title: title.to_string(),
                description: description.to_string(),
                column_id: column_id.clone(),
                board_id: self.board_id.clone(),
            })
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_card_added(card.clone()))
            .await;
        Ok(card)
    }

    /// Adds a card from the column's draft fields, then clears and hides
    /// them.
    pub async fn submit_card_draft(&self, column_id: &ColumnId) -> Result<Card> {
        let draft = self
            .view
            .read_mounted("add_card", |state| {
                state.column(column_id).map(|view| view.ui.card_draft.clone())
            })
            .await?
            .unwrap_or_default();
        let card = self
            .add_card(column_id, &draft.title, &draft.description)
            .await?;
        self.view
            .update(|state| {
                if let Some(view) = state.column_mut(column_id) {
                    view.ui.card_draft = CardDraft::default();
                    view.ui.show_card_inputs = false;
                }
            })
            .await;
        Ok(card)
    }

    pub async fn edit_card_description(&self, card_id: &CardId, text: &str) -> Result<Card> {
        let operation = "edit_card_description";
        require_text("card description", text).map_err(|e| self.view.fail(operation, e))?;
        self.ensure_ready(operation).await?;
        let known = self
            .view
            .read(|state| state.find_card(card_id).is_some())
            .await
            .unwrap_or(false);
        if !known {
            return Err(self
                .view
                .fail(operation, ClientError::not_found(format!("card {card_id}"))));
        }

        let card = self
            .client
            .update_card_description(card_id, text)
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_card_description(card_id, card.description.clone()))
            .await;
        Ok(card)
    }

    /// Commits the pending description edit.
    pub async fn save_card_edit(&self) -> Result<Card> {
        let edit = self
            .view
            .read_mounted("edit_card_description", |state| state.card_edit.clone())
            .await?
            .ok_or_else(|| {
                self.view.fail(
                    "edit_card_description",
                    ClientError::validation("no card is being edited"),
                )
            })?;
        self.edit_card_description(&edit.card_id, &edit.draft).await
    }

    pub async fn delete_card(&self, card_id: &CardId, column_id: &ColumnId) -> Result<()> {
        let operation = "delete_card";
        self.ensure_column(operation, column_id).await?;
        let in_column = self
            .view
            .read_mounted(operation, |state| {
                state
                    .cards(column_id)
                    .is_some_and(|cards| cards.iter().any(|card| &card.id == card_id))
            })
            .await?;
        if !in_column {
            return Err(self.view.fail(
                operation,
                ClientError::not_found(format!("card {card_id} in column {column_id}")),
            ));
        }

        self.client
            .delete_card(card_id)
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_card_deleted(column_id, card_id))
            .await;
        Ok(())
    }

    async fn ensure_ready(&self, operation: &'static str) -> Result<()> {
        if self
            .view
            .read_mounted(operation, BoardViewState::is_ready)
            .await?
        {
            return Ok(());
        }
        Err(self.view.fail(
            operation,
            ClientError::Inactive(format!("board {} is not loaded", self.board_id)),
        ))
    }

    async fn ensure_column(&self, operation: &'static str, column_id: &ColumnId) -> Result<()> {
        self.ensure_ready(operation).await?;
        let known = self
            .view
            .read(|state| state.column(column_id).is_some())
            .await
            .unwrap_or(false);
        if known {
            Ok(())
        } else {
            Err(self
                .view
                .fail(operation, ClientError::not_found(format!("column {column_id}"))))
        }
    }
}

#[cfg(test)]
#[path = "tests/board_view_tests.rs"]
mod tests;
