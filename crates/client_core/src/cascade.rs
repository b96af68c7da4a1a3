//! Client-side cascading deletes.
//!
//! The store keeps no referential integrity, so children are removed before
//! their parent. A failure stops the cascade where it is: cards deleted
//! before a failed step stay deleted and the parent is left in place.

use std::sync::Arc;

use futures::future::join_all;
use shared::{
    domain::{BoardId, ColumnId},
    protocol::CardFilter,
};
use tracing::{info, warn};

use crate::{
    error::{CascadeError, CascadeStep},
    resource::ResourceClient,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
    pub columns_deleted: usize,
    pub cards_deleted: usize,
}

impl CascadeReport {
    fn absorb(&mut self, other: CascadeReport) {
        self.columns_deleted += other.columns_deleted;
        self.cards_deleted += other.cards_deleted;
    }
}

#[derive(Clone)]
pub struct CascadeCoordinator {
    client: Arc<dyn ResourceClient>,
}

impl CascadeCoordinator {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    /// Deletes every card of the column concurrently, then the column once
    /// all card deletes have settled.
    pub async fn delete_column(&self, column_id: &ColumnId) -> Result<CascadeReport, CascadeError> {
        let cards = self
            .client
            .list_cards(&CardFilter::column(column_id.clone()))
            .await
            .map_err(|source| {
                CascadeError::new(
                    CascadeStep::ListCards {
                        column_id: column_id.clone(),
                    },
                    source,
                )
            })?;

        let total = cards.len();
        let outcomes = join_all(cards.iter().map(|card| self.client.delete_card(&card.id))).await;

        let mut failed = 0;
        let mut first_error = None;
        for (card, outcome) in cards.iter().zip(outcomes) {
            if let Err(error) = outcome {
                warn!(%column_id, card_id = %card.id, %error, "card delete failed during cascade");
                failed += 1;
                first_error.get_or_insert(error);
            }
        }
        if let Some(source) = first_error {
            return Err(CascadeError::new(
                CascadeStep::DeleteCards {
                    column_id: column_id.clone(),
                    failed,
                    total,
                },
                source,
            ));
        }

        self.client.delete_column(column_id).await.map_err(|source| {
            CascadeError::new(
                CascadeStep::DeleteColumn {
                    column_id: column_id.clone(),
                },
                source,
            )
        })?;

        info!(%column_id, cards_deleted = total, "column deleted with its cards");
        Ok(CascadeReport {
            columns_deleted: 1,
            cards_deleted: total,
        })
    }

    /// Runs [`Self::delete_column`] for each column of the board, one column
    /// at a time, then deletes the board.
    pub async fn delete_board(&self, board_id: &BoardId) -> Result<CascadeReport, CascadeError> {
        let columns = self.client.list_columns(board_id).await.map_err(|source| {
            CascadeError::new(
                CascadeStep::ListColumns {
                    board_id: board_id.clone(),
                },
                source,
            )
        })?;

        let mut report = CascadeReport::default();
        for column in &columns {
            report.absorb(self.delete_column(&column.id).await?);
        }

        self.client.delete_board(board_id).await.map_err(|source| {
            CascadeError::new(
                CascadeStep::DeleteBoard {
                    board_id: board_id.clone(),
                },
                source,
            )
        })?;

        info!(
            %board_id,
            columns_deleted = report.columns_deleted,
            cards_deleted = report.cards_deleted,
            "board deleted with its columns"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "tests/cascade_tests.rs"]
mod tests;
