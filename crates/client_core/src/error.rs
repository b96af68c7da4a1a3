use std::fmt;

use shared::domain::{BoardId, ColumnId};
use thiserror::Error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// How a failure is presented: validation problems are shown inline next
/// to the form, everything else as an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    NotFound,
}

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Inactive(String),
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("{operation} failed with status {status}: {message}")]
    Status {
        operation: String,
        status: u16,
        message: String,
    },
    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },
    #[error(transparent)]
    Cascade(#[from] CascadeError),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn transport(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Inactive(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Status { .. } | Self::Transport { .. } => ErrorKind::Transport,
            Self::Cascade(err) => err.source.kind(),
        }
    }

    /// Not-found is reported the same way as any other failed request.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::NotFound)
    }
}

/// The step of a cascading delete that did not complete. Everything before
/// it has already been applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    ListCards { column_id: ColumnId },
    DeleteCards {
        column_id: ColumnId,
        failed: usize,
        total: usize,
    },
    DeleteColumn { column_id: ColumnId },
    ListColumns { board_id: BoardId },
    DeleteBoard { board_id: BoardId },
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListCards { column_id } => write!(f, "listing cards of column {column_id}"),
            Self::DeleteCards {
                column_id,
                failed,
                total,
            } => write!(
                f,
                "deleting cards of column {column_id} ({failed} of {total} failed)"
            ),
            Self::DeleteColumn { column_id } => write!(f, "deleting column {column_id}"),
            Self::ListColumns { board_id } => write!(f, "listing columns of board {board_id}"),
            Self::DeleteBoard { board_id } => write!(f, "deleting board {board_id}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("cascade delete stopped while {step}: {source}")]
pub struct CascadeError {
    pub step: CascadeStep,
    pub source: Box<ClientError>,
}

impl CascadeError {
    pub fn new(step: CascadeStep, source: ClientError) -> Self {
        Self {
            step,
            source: Box::new(source),
        }
    }
}
