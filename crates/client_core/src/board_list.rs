use std::sync::Arc;

use shared::{
    domain::{Board, BoardId},
    protocol::NewBoard,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::{
    board_view::BoardPhase,
    cascade::{CascadeCoordinator, CascadeReport},
    error::{ClientError, Result},
    resource::ResourceClient,
    view::{require_text, ViewCell, ViewEvent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRename {
    pub board_id: BoardId,
    pub draft: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardListState {
    phase: BoardPhase,
    boards: Vec<Board>,
    new_board_title: String,
    is_creating: bool,
    rename: Option<BoardRename>,
}

impl BoardListState {
    pub fn phase(&self) -> &BoardPhase {
        &self.phase
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn new_board_title(&self) -> &str {
        &self.new_board_title
    }

    pub fn is_creating(&self) -> bool {
        self.is_creating
    }

    pub fn rename(&self) -> Option<&BoardRename> {
        self.rename.as_ref()
    }

    pub fn begin_create(&mut self) {
        self.is_creating = true;
    }

    pub fn set_new_board_title(&mut self, title: impl Into<String>) {
        self.new_board_title = title.into();
    }

    pub fn cancel_create(&mut self) {
        self.is_creating = false;
        self.new_board_title.clear();
    }

    pub fn begin_rename(&mut self, board_id: &BoardId) {
        self.rename = self
            .boards
            .iter()
            .find(|board| &board.id == board_id)
            .map(|board| BoardRename {
                board_id: board.id.clone(),
                draft: board.title.clone(),
            });
    }

    pub fn set_rename_title(&mut self, title: impl Into<String>) {
        if let Some(rename) = self.rename.as_mut() {
            rename.draft = title.into();
        }
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    fn apply_renamed(&mut self, board: Board) {
        if let Some(existing) = self.boards.iter_mut().find(|b| b.id == board.id) {
            existing.title = board.title;
        }
        if self
            .rename
            .as_ref()
            .is_some_and(|rename| rename.board_id == board.id)
        {
            self.rename = None;
        }
    }

    fn apply_deleted(&mut self, board_id: &BoardId) {
        self.boards.retain(|board| &board.id != board_id);
        if self
            .rename
            .as_ref()
            .is_some_and(|rename| &rename.board_id == board_id)
        {
            self.rename = None;
        }
    }
}

/// The list of all boards with create, rename and delete.
pub struct BoardListPage {
    client: Arc<dyn ResourceClient>,
    cascade: CascadeCoordinator,
    view: ViewCell<BoardListState>,
}

impl BoardListPage {
    pub fn mount(client: Arc<dyn ResourceClient>) -> Arc<Self> {
        Arc::new(Self {
            cascade: CascadeCoordinator::new(Arc::clone(&client)),
            client,
            view: ViewCell::new(BoardListState::default()),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.view.subscribe()
    }

    pub async fn snapshot(&self) -> Option<BoardListState> {
        self.view.snapshot().await
    }

    pub async fn unmount(&self) {
        self.view.unmount().await;
    }

    pub async fn edit(&self, f: impl FnOnce(&mut BoardListState)) -> bool {
        self.view.update(f).await.is_some()
    }

    pub async fn load(&self) -> Result<()> {
        match self.client.list_boards().await {
            Ok(boards) => {
                info!(boards = boards.len(), "boards loaded");
                self.view
                    .update(|state| {
                        state.boards = boards;
                        state.phase = BoardPhase::Ready;
                    })
                    .await;
                Ok(())
            }
            Err(error) => {
                let message = error.to_string();
                self.view
                    .update(|state| {
                        if state.phase != BoardPhase::Ready {
                            state.phase = BoardPhase::Failed(message);
                        }
                    })
                    .await;
                Err(self.view.fail("load_boards", error))
            }
        }
    }

    pub async fn create_board(&self, title: &str) -> Result<Board> {
        let operation = "create_board";
        require_text("board title", title).map_err(|e| self.view.fail(operation, e))?;
        self.ensure_ready(operation).await?;

        let board = self
            .client
            .create_board(&NewBoard::new(title))
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| {
                state.boards.push(board.clone());
                state.new_board_title.clear();
                state.is_creating = false;
            })
            .await;
        Ok(board)
    }

    /// Creates a board from the title typed into the create form.
    pub async fn submit_create(&self) -> Result<Board> {
        let title = self
            .view
            .read_mounted("create_board", |state| state.new_board_title.clone())
            .await?;
        self.create_board(&title).await
    }

    pub async fn rename_board(&self, board_id: &BoardId, title: &str) -> Result<Board> {
        let operation = "rename_board";
        require_text("board title", title).map_err(|e| self.view.fail(operation, e))?;
        self.ensure_listed(operation, board_id).await?;

        let board = self
            .client
            .update_board(board_id, &NewBoard::new(title))
            .await
            .map_err(|e| self.view.fail(operation, e))?;
        self.view
            .update(|state| state.apply_renamed(board.clone()))
            .await;
        Ok(board)
    }

    pub async fn save_rename(&self) -> Result<Board> {
        let rename = self
            .view
            .read_mounted("rename_board", |state| state.rename.clone())
            .await?
            .ok_or_else(|| {
                self.view.fail(
                    "rename_board",
                    ClientError::validation("no board is being renamed"),
                )
            })?;
        self.rename_board(&rename.board_id, &rename.draft).await
    }

    pub async fn delete_board(&self, board_id: &BoardId) -> Result<CascadeReport> {
        let operation = "delete_board";
        self.ensure_listed(operation, board_id).await?;

        let report = self
            .cascade
            .delete_board(board_id)
            .await
            .map_err(|e| self.view.fail(operation, e.into()))?;
        self.view
            .update(|state| state.apply_deleted(board_id))
            .await;
        Ok(report)
    }

    async fn ensure_ready(&self, operation: &'static str) -> Result<()> {
        let ready = self
            .view
            .read_mounted(operation, |state| state.phase == BoardPhase::Ready)
            .await?;
        if ready {
            Ok(())
        } else {
            Err(self.view.fail(
                operation,
                ClientError::Inactive("board list is not loaded".into()),
            ))
        }
    }

    async fn ensure_listed(&self, operation: &'static str, board_id: &BoardId) -> Result<()> {
        self.ensure_ready(operation).await?;
        let listed = self
            .view
            .read_mounted(operation, |state| {
                state.boards.iter().any(|board| &board.id == board_id)
            })
            .await?;
        if listed {
            Ok(())
        } else {
            Err(self
                .view
                .fail(operation, ClientError::not_found(format!("board {board_id}"))))
        }
    }
}

#[cfg(test)]
#[path = "tests/board_list_tests.rs"]
mod tests;
