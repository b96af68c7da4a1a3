use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{BoardListPage, BoardPage, ResourceClient, RestClient, Session};
use shared::domain::{BoardId, CardId, ColumnId};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "kanban", version, about = "Kanban boards from the terminal")]
struct Cli {
    /// Base URL of the board store; overrides kanban.toml and KANBAN_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with the demo account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Boards {
        #[command(subcommand)]
        action: BoardsAction,
    },
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },
    Column {
        #[command(subcommand)]
        action: ColumnAction,
    },
    Card {
        #[command(subcommand)]
        action: CardAction,
    },
}

#[derive(Subcommand, Debug)]
enum BoardsAction {
    List,
    Create { title: String },
    Rename { board_id: String, title: String },
    /// Deletes the board with all of its columns and cards.
    Delete { board_id: String },
}

#[derive(Subcommand, Debug)]
enum BoardAction {
    Show { board_id: String },
}

#[derive(Subcommand, Debug)]
enum ColumnAction {
    Add {
        board_id: String,
        title: String,
    },
    Rename {
        board_id: String,
        column_id: String,
        title: String,
    },
    /// Deletes the column and its cards.
    Delete { board_id: String, column_id: String },
}

#[derive(Subcommand, Debug)]
enum CardAction {
    Add {
        board_id: String,
        column_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    Edit {
        board_id: String,
        card_id: String,
        #[arg(long)]
        description: String,
    },
    Delete {
        board_id: String,
        column_id: String,
        card_id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("{}", render::describe_error(&error));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings(cli.api_url);
    let mut session = Session::init(&settings.session_path);

    if let Command::Login { email, password } = &cli.command {
        session.login(email, password)?;
        println!("logged in as {email}");
        return Ok(());
    }
    session.require_authenticated()?;

    let client: Arc<dyn ResourceClient> = Arc::new(RestClient::new(settings.api_base_url));
    match cli.command {
        Command::Login { .. } => bail!("login is handled before the session guard"),
        Command::Logout => {
            session.teardown()?;
            println!("logged out");
        }
        Command::Boards { action } => boards(client, action).await?,
        Command::Board {
            action: BoardAction::Show { board_id },
        } => {
            let page = open_board(client, board_id).await?;
            print_board(&page).await;
        }
        Command::Column { action } => column(client, action).await?,
        Command::Card { action } => card(client, action).await?,
    }
    Ok(())
}

async fn boards(client: Arc<dyn ResourceClient>, action: BoardsAction) -> Result<()> {
    let page = BoardListPage::mount(client);
    page.load().await?;
    match action {
        BoardsAction::List => {
            if let Some(state) = page.snapshot().await {
                print!("{}", render::board_list(state.boards()));
            }
        }
        BoardsAction::Create { title } => {
            let board = page.create_board(&title).await?;
            println!("created board {} ({})", board.title, board.id);
        }
        BoardsAction::Rename { board_id, title } => {
            let board = page.rename_board(&BoardId::new(board_id), &title).await?;
            println!("renamed board {} to {}", board.id, board.title);
        }
        BoardsAction::Delete { board_id } => {
            let board_id = BoardId::new(board_id);
            let report = page.delete_board(&board_id).await?;
            println!(
                "deleted board {board_id} with {} columns and {} cards",
                report.columns_deleted, report.cards_deleted
            );
        }
    }
    page.unmount().await;
    Ok(())
}

async fn column(client: Arc<dyn ResourceClient>, action: ColumnAction) -> Result<()> {
    match action {
        ColumnAction::Add { board_id, title } => {
            let page = open_board(client, board_id).await?;
            let column = page.add_column(&title).await?;
            println!("added column {} ({})", column.title, column.id);
        }
        ColumnAction::Rename {
            board_id,
            column_id,
            title,
        } => {
            let page = open_board(client, board_id).await?;
            let column = page.rename_column(&ColumnId::new(column_id), &title).await?;
            println!("renamed column {} to {}", column.id, column.title);
        }
        ColumnAction::Delete {
            board_id,
            column_id,
        } => {
            let page = open_board(client, board_id).await?;
            let column_id = ColumnId::new(column_id);
            let report = page.delete_column(&column_id).await?;
            println!(
                "deleted column {column_id} with {} cards",
                report.cards_deleted
            );
        }
    }
    Ok(())
}

async fn card(client: Arc<dyn ResourceClient>, action: CardAction) -> Result<()> {
    match action {
        CardAction::Add {
            board_id,
            column_id,
            title,
            description,
        } => {
            let page = open_board(client, board_id).await?;
            let card = page
                .add_card(&ColumnId::new(column_id), &title, &description)
                .await?;
            println!("added card {} ({})", card.title, card.id);
        }
        CardAction::Edit {
            board_id,
            card_id,
            description,
        } => {
            let page = open_board(client, board_id).await?;
            let card = page
                .edit_card_description(&CardId::new(card_id), &description)
                .await?;
            println!("updated card {}", card.id);
        }
        CardAction::Delete {
            board_id,
            column_id,
            card_id,
        } => {
            let page = open_board(client, board_id).await?;
            let card_id = CardId::new(card_id);
            page.delete_card(&card_id, &ColumnId::new(column_id)).await?;
            println!("deleted card {card_id}");
        }
    }
    Ok(())
}

async fn open_board(client: Arc<dyn ResourceClient>, board_id: String) -> Result<Arc<BoardPage>> {
    let page = BoardPage::mount(client, BoardId::new(board_id));
    page.load().await?;
    Ok(page)
}

async fn print_board(page: &BoardPage) {
    if let Some(state) = page.snapshot().await {
        print!("{}", render::board(&state));
    }
}
