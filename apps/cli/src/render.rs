//! Plain-text output for the terminal.

use std::fmt::Write as _;

use client_core::{BoardViewState, ClientError, ErrorKind, SessionError};
use shared::domain::Board;

pub fn board_list(boards: &[Board]) -> String {
    if boards.is_empty() {
        return "no boards yet\n".into();
    }
    let mut out = String::new();
    for board in boards {
        let _ = writeln!(out, "{}\t{}", board.id, board.title);
    }
    out
}

pub fn board(state: &BoardViewState) -> String {
    let mut out = String::new();
    if let Some(board) = state.board() {
        let _ = writeln!(out, "{} ({})", board.title, board.id);
    }
    for view in state.columns() {
        let _ = writeln!(out, "\n[{}] {}", view.column.id, view.column.title);
        if view.cards.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for card in &view.cards {
            let _ = writeln!(out, "  - [{}] {}: {}", card.id, card.title, card.description);
        }
    }
    out
}

/// Validation problems read as input errors, everything else as a failed
/// operation.
pub fn describe_error(error: &anyhow::Error) -> String {
    if let Some(error) = error.downcast_ref::<ClientError>() {
        return match error.kind() {
            ErrorKind::Validation => format!("invalid input: {error}"),
            ErrorKind::NotFound => format!("not found: {error}"),
            ErrorKind::Transport => format!("request failed: {error}"),
        };
    }
    if let Some(error) = error.downcast_ref::<SessionError>() {
        return match error {
            SessionError::Unauthenticated => "not logged in; run `kanban login` first".into(),
            other => other.to_string(),
        };
    }
    format!("error: {error:#}")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
