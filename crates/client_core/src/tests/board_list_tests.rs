use super::*;
use crate::{
    error::{CascadeError, CascadeStep, ErrorKind},
    test_support::MemoryStore,
};

async fn loaded_list(store: &Arc<MemoryStore>) -> Arc<BoardListPage> {
    let page = BoardListPage::mount(store.clone());
    page.load().await.expect("load");
    page
}

async fn state(page: &BoardListPage) -> BoardListState {
    page.snapshot().await.expect("mounted")
}

#[tokio::test]
async fn load_lists_boards_in_store_order() {
    let store = MemoryStore::new();
    let first = store.seed_board("Sprint 1");
    let second = store.seed_board("Backlog");

    let page = loaded_list(&store).await;

    let view = state(&page).await;
    assert_eq!(view.phase(), &BoardPhase::Ready);
    assert_eq!(view.boards(), &[first, second]);
}

#[tokio::test]
async fn load_failure_is_reported() {
    let store = MemoryStore::new();
    store.fail_operation("list_boards");
    let page = BoardListPage::mount(store.clone());

    let err = page.load().await.expect_err("store down");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(state(&page).await.phase(), BoardPhase::Failed(_)));
}

#[tokio::test]
async fn create_form_submits_and_resets() {
    let store = MemoryStore::new();
    let page = loaded_list(&store).await;
    page.edit(|s| {
        s.begin_create();
        s.set_new_board_title("Roadmap");
    })
    .await;

    let board = page.submit_create().await.expect("create");

    let view = state(&page).await;
    assert_eq!(board.title, "Roadmap");
    assert_eq!(view.boards(), &[board]);
    assert!(!view.is_creating());
    assert_eq!(view.new_board_title(), "");
}

#[tokio::test]
async fn blank_title_never_reaches_the_store() {
    let store = MemoryStore::new();
    let page = loaded_list(&store).await;
    let calls = store.call_count();
    page.edit(|s| {
        s.begin_create();
        s.set_new_board_title("  ");
    })
    .await;

    let err = page.submit_create().await.expect_err("blank title");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.call_count(), calls);
    assert!(state(&page).await.is_creating());
}

#[tokio::test]
async fn rename_flow_updates_the_title() {
    let store = MemoryStore::new();
    let board = store.seed_board("Sprint 1");
    let page = loaded_list(&store).await;
    page.edit(|s| {
        s.begin_rename(&board.id);
        s.set_rename_title("Sprint 2");
    })
    .await;

    page.save_rename().await.expect("rename");

    let view = state(&page).await;
    assert_eq!(view.boards()[0].title, "Sprint 2");
    assert_eq!(view.rename(), None);
    assert_eq!(store.boards()[0].title, "Sprint 2");
}

#[tokio::test]
async fn cancelled_rename_restores_nothing_remotely() {
    let store = MemoryStore::new();
    let board = store.seed_board("Sprint 1");
    let page = loaded_list(&store).await;
    let calls = store.call_count();
    page.edit(|s| {
        s.begin_rename(&board.id);
        s.set_rename_title("Other");
        s.cancel_rename();
    })
    .await;

    page.save_rename().await.expect_err("nothing to save");

    assert_eq!(store.call_count(), calls);
    assert_eq!(state(&page).await.boards()[0].title, "Sprint 1");
}

#[tokio::test]
async fn delete_cascades_through_the_board() {
    let store = MemoryStore::new();
    let board = store.seed_board("Sprint 1");
    let column = store.seed_column(&board.id, "To Do");
    store.seed_card(&column, "A", "a");
    let page = loaded_list(&store).await;

    let report = page.delete_board(&board.id).await.expect("delete");

    assert_eq!(report.columns_deleted, 1);
    assert_eq!(report.cards_deleted, 1);
    assert!(state(&page).await.boards().is_empty());
    assert!(store.columns().is_empty());
    assert!(store.cards().is_empty());
}

#[tokio::test]
async fn failed_delete_keeps_the_board_listed() {
    let store = MemoryStore::new();
    let board = store.seed_board("Sprint 1");
    let page = loaded_list(&store).await;
    store.fail_operation("delete_board");

    let err = page.delete_board(&board.id).await.expect_err("store down");

    assert!(matches!(
        err,
        ClientError::Cascade(CascadeError {
            step: CascadeStep::DeleteBoard { .. },
            ..
        })
    ));
    assert_eq!(state(&page).await.boards(), &[board]);
}

#[tokio::test]
async fn create_waits_for_the_list() {
    let store = MemoryStore::new();
    let page = BoardListPage::mount(store.clone());

    let err = page.create_board("Roadmap").await.expect_err("not loaded");

    assert!(matches!(err, ClientError::Inactive(_)));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn rename_needs_a_listed_board() {
    let store = MemoryStore::new();
    let page = loaded_list(&store).await;
    let hidden = store.seed_board("Created elsewhere");
    let calls = store.call_count();

    let err = page
        .rename_board(&hidden.id, "Renamed")
        .await
        .expect_err("not in the list");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.call_count(), calls);
    assert_eq!(store.boards()[0].title, "Created elsewhere");
}

#[tokio::test]
async fn create_submit_after_unmount_is_inactive() {
    let store = MemoryStore::new();
    let page = loaded_list(&store).await;
    page.edit(|s| s.set_new_board_title("Roadmap")).await;
    page.unmount().await;

    let err = page.submit_create().await.expect_err("unmounted");

    assert!(matches!(err, ClientError::Inactive(_)));
    assert!(store.boards().is_empty());
}
