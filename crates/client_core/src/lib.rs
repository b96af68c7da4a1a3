//! Client side of the kanban board: typed store access, cascading deletes,
//! page view state and the login session.

pub mod board_list;
pub mod board_view;
pub mod cascade;
pub mod error;
pub mod resource;
pub mod session;
mod view;

pub use board_list::{BoardListPage, BoardListState, BoardRename};
pub use board_view::{
    BoardPage, BoardPhase, BoardViewState, CardDraft, CardEdit, ColumnUiState, ColumnView,
};
pub use cascade::{CascadeCoordinator, CascadeReport};
pub use error::{CascadeError, CascadeStep, ClientError, ErrorKind};
pub use resource::{ResourceClient, RestClient, DEFAULT_API_BASE_URL};
pub use session::{Session, SessionError};
pub use view::ViewEvent;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
