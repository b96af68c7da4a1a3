use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

use shared::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    protocol::{CardFilter, ColumnFilter, NewBoard, NewCard, NewColumn},
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own database, so an
        // in-memory store is pinned to one long-lived connection.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        let rows = sqlx::query("SELECT id, title FROM boards ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(board_from_row).collect())
    }

    pub async fn get_board(&self, board_id: &BoardId) -> Result<Option<Board>> {
        let row = sqlx::query("SELECT id, title FROM boards WHERE id = ?")
            .bind(board_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(board_from_row))
    }

    pub async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let board = board.into_record(BoardId(new_id()));
        sqlx::query("INSERT INTO boards (id, title) VALUES (?, ?)")
            .bind(board.id.as_str())
            .bind(&board.title)
            .execute(&self.pool)
            .await
            .context("failed to insert board")?;
        Ok(board)
    }

    pub async fn update_board(&self, board_id: &BoardId, board: NewBoard) -> Result<Option<Board>> {
        let result = sqlx::query("UPDATE boards SET title = ? WHERE id = ?")
            .bind(&board.title)
            .bind(board_id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(board.into_record(board_id.clone())))
    }

    /// Removes the board row only; columns and cards that reference it stay.
    pub async fn delete_board(&self, board_id: &BoardId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(board_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_columns(&self, filter: &ColumnFilter) -> Result<Vec<Column>> {
        let rows = sqlx::query(
            "SELECT id, title, board_id FROM board_columns
             WHERE (?1 IS NULL OR board_id = ?1)
             ORDER BY rowid",
        )
        .bind(filter.board_id.as_ref().map(BoardId::as_str))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(column_from_row).collect())
    }

    pub async fn get_column(&self, column_id: &ColumnId) -> Result<Option<Column>> {
        let row = sqlx::query("SELECT id, title, board_id FROM board_columns WHERE id = ?")
            .bind(column_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(column_from_row))
    }

    pub async fn create_column(&self, column: NewColumn) -> Result<Column> {
        let column = column.into_record(ColumnId(new_id()));
        sqlx::query("INSERT INTO board_columns (id, title, board_id) VALUES (?, ?, ?)")
            .bind(column.id.as_str())
            .bind(&column.title)
            .bind(column.board_id.as_str())
            .execute(&self.pool)
            .await
            .context("failed to insert column")?;
        Ok(column)
    }

    pub async fn update_column(
        &self,
        column_id: &ColumnId,
        column: NewColumn,
    ) -> Result<Option<Column>> {
        let result = sqlx::query("UPDATE board_columns SET title = ?, board_id = ? WHERE id = ?")
            .bind(&column.title)
            .bind(column.board_id.as_str())
            .bind(column_id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(column.into_record(column_id.clone())))
    }

    /// Removes the column row only; its cards stay.
    pub async fn delete_column(&self, column_id: &ColumnId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = ?")
            .bind(column_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let rows = sqlx::query(
            "SELECT id, title, description, column_id, board_id FROM cards
             WHERE (?1 IS NULL OR board_id = ?1)
               AND (?2 IS NULL OR column_id = ?2)
             ORDER BY rowid",
        )
        .bind(filter.board_id.as_ref().map(BoardId::as_str))
        .bind(filter.column_id.as_ref().map(ColumnId::as_str))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(card_from_row).collect())
    }

    pub async fn get_card(&self, card_id: &CardId) -> Result<Option<Card>> {
        let row = sqlx::query(
            "SELECT id, title, description, column_id, board_id FROM cards WHERE id = ?",
        )
        .bind(card_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(card_from_row))
    }

    pub async fn create_card(&self, card: NewCard) -> Result<Card> {
        let card = card.into_record(CardId(new_id()));
        sqlx::query(
            "INSERT INTO cards (id, title, description, column_id, board_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(card.id.as_str())
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.column_id.as_str())
        .bind(card.board_id.as_str())
        .execute(&self.pool)
        .await
        .context("failed to insert card")?;
        Ok(card)
    }

    pub async fn update_card(&self, card_id: &CardId, card: NewCard) -> Result<Option<Card>> {
        let result = sqlx::query(
            "UPDATE cards SET title = ?, description = ?, column_id = ?, board_id = ? WHERE id = ?",
        )
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.column_id.as_str())
        .bind(card.board_id.as_str())
        .bind(card_id.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(card.into_record(card_id.clone())))
    }

    pub async fn delete_card(&self, card_id: &CardId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(card_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn board_from_row(row: &SqliteRow) -> Board {
    Board {
        id: BoardId(row.get("id")),
        title: row.get("title"),
    }
}

fn column_from_row(row: &SqliteRow) -> Column {
    Column {
        id: ColumnId(row.get("id")),
        title: row.get("title"),
        board_id: BoardId(row.get("board_id")),
    }
}

fn card_from_row(row: &SqliteRow) -> Card {
    Card {
        id: CardId(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        column_id: ColumnId(row.get("column_id")),
        board_id: BoardId(row.get("board_id")),
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
