//! Request bodies. None of these carry an id: the store assigns one on create
//! and takes it from the path on update.

use serde::{Deserialize, Serialize};

use crate::domain::{Board, BoardId, Card, CardId, Column, ColumnId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
}

impl NewBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn into_record(self, id: BoardId) -> Board {
        Board {
            id,
            title: self.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub title: String,
    pub board_id: BoardId,
}

impl NewColumn {
    pub fn new(title: impl Into<String>, board_id: BoardId) -> Self {
        Self {
            title: title.into(),
            board_id,
        }
    }

    pub fn into_record(self, id: ColumnId) -> Column {
        Column {
            id,
            title: self.title,
            board_id: self.board_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub title: String,
    pub description: String,
    pub column_id: ColumnId,
    pub board_id: BoardId,
}

impl NewCard {
    pub fn into_record(self, id: CardId) -> Card {
        Card {
            id,
            title: self.title,
            description: self.description,
            column_id: self.column_id,
            board_id: self.board_id,
        }
    }
}

/// Query string for `GET /columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
}

/// Query string for `GET /cards`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
}

impl CardFilter {
    pub fn column(column_id: ColumnId) -> Self {
        Self {
            board_id: None,
            column_id: Some(column_id),
        }
    }

    pub fn board_column(board_id: BoardId, column_id: ColumnId) -> Self {
        Self {
            board_id: Some(board_id),
            column_id: Some(column_id),
        }
    }
}
