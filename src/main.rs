//! life_client - terminal client for the life backend
//!
//! Lists records, follows a chat room live and runs the normalizers over
//! captured payloads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use life_client::api::BackendClient;
use life_client::chat::{parse_stream_event, ChatSession, UiMessage};
use life_client::config::ClientConfig;
use life_client::context::OwnerContext;
use life_client::errors::AppError;
use life_client::models::ChatMessageDraft;
use life_client::normalize::{
    adapt_in_chat_message, adapt_in_chat_messages, adapt_in_chat_room, adapt_in_diary,
    adapt_in_ledger_row, adapt_in_product_detail, adapt_in_product_summary, adapt_in_reservation,
    adapt_in_task, parse_lenient, unwrap_list,
};
use life_client::stomp::ChatSubscription;

#[derive(Parser)]
#[command(name = "life_client")]
#[command(about = "Terminal client for the life backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Owner id to act as (overrides OWNER_ID)
    #[arg(long, global = true)]
    owner: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List chat rooms
    Rooms,
    /// List tasks
    Tasks,
    /// List diary entries
    Diaries,
    /// List ledger rows with the running balance
    Ledger,
    /// List reservations
    Reservations,
    /// List shop products
    Products,
    /// Show one shop product
    Product { product_id: i64 },
    /// Follow a chat room live; lines typed on stdin are sent to the room
    Chat { room_id: i64 },
    /// Send one message to a chat room
    Send { room_id: i64, message: String },
    /// Normalize a captured JSON payload (file or stdin) and print it
    Normalize {
        #[arg(value_enum)]
        entity: Entity,
        file: Option<PathBuf>,
    },
    /// Fold a captured stream of chat events into the final message list
    Replay {
        /// JSON array or one JSON value per line
        file: PathBuf,
        /// History response to seed the session with
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Task,
    Diary,
    Ledger,
    Reservation,
    Room,
    Message,
    Product,
    ProductDetail,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "life_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = &cli.owner {
        config.owner = OwnerContext::from_raw(raw);
    }

    if let Err(err) = run(cli.command, &config).await {
        if let Some(app) = err.downcast_ref::<AppError>() {
            if app.is_rejected() {
                eprintln!("Rejected by server: {app}");
                std::process::exit(2);
            }
            if app.is_transport() {
                eprintln!("Could not reach {}: {app}", config.api_base_url);
                std::process::exit(3);
            }
        }
        return Err(err);
    }
    Ok(())
}

async fn run(command: Commands, config: &ClientConfig) -> Result<()> {
    match command {
        Commands::Rooms => {
            let client = BackendClient::new(config)?;
            for room in client.list_chat_rooms().await? {
                println!(
                    "{:>6}  {}  {}",
                    room.id.map(|id| id.to_string()).unwrap_or_default(),
                    room.display_name(),
                    room.last_msg_content.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Tasks => {
            let client = BackendClient::new(config)?;
            for task in client.list_tasks().await? {
                println!(
                    "[{}] {}  {}",
                    task.status_cd,
                    task.display_title(),
                    task.due_dt.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Diaries => {
            let client = BackendClient::new(config)?;
            for diary in client.list_diaries().await? {
                println!(
                    "{}  {}",
                    diary.diary_dt.as_deref().unwrap_or("----------"),
                    diary.display_title()
                );
            }
        }
        Commands::Ledger => {
            let client = BackendClient::new(config)?;
            let rows = client.list_ledger().await?;
            for row in &rows {
                println!(
                    "{}  {:>12.0}  {}",
                    row.use_dt.as_deref().unwrap_or("----------"),
                    row.signed_amount(),
                    row.category_nm.as_deref().unwrap_or("")
                );
            }
            println!("balance: {:.0}", life_client::normalize::ledger_balance(&rows));
        }
        Commands::Reservations => {
            let client = BackendClient::new(config)?;
            print_json(&client.list_reservations().await?)?;
        }
        Commands::Products => {
            let client = BackendClient::new(config)?;
            for product in client.list_products().await? {
                println!(
                    "{:>6}  {}  {}",
                    product.product_id.map(|id| id.to_string()).unwrap_or_default(),
                    product.product_nm.as_deref().unwrap_or(""),
                    product
                        .effective_price()
                        .map(|p| format!("{p:.0}"))
                        .unwrap_or_default()
                );
            }
        }
        Commands::Product { product_id } => {
            let client = BackendClient::new(config)?;
            print_json(&client.product_detail(product_id).await?)?;
        }
        Commands::Chat { room_id } => follow_room(config, room_id).await?,
        Commands::Send { room_id, message } => {
            let subscription = ChatSubscription::connect(config, room_id).await?;
            let mut draft = ChatMessageDraft::text(room_id, message);
            draft.sender_id = config.owner.owner_id;
            subscription.send(&draft)?;
            subscription.close().await;
        }
        Commands::Normalize { entity, file } => {
            let raw = read_input(file.as_deref()).await?;
            print_json(&normalize(entity, &parse_lenient(&raw)))?;
        }
        Commands::Replay { file, history } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut session = ChatSession::new();
            for value in json_values(&raw) {
                if let Some(event) = parse_stream_event(&value) {
                    session.ingest(event);
                }
            }
            match history {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    session.seed_history(adapt_in_chat_messages(&parse_lenient(&raw)));
                }
                None => session.history_failed(),
            }
            print_json(session.messages())?;
        }
    }
    Ok(())
}

/// Subscribes first, then loads history; live lines arriving meanwhile are
/// held by the session until history is in.
async fn follow_room(config: &ClientConfig, room_id: i64) -> Result<()> {
    let client = BackendClient::new(config)?;
    if let Err(e) = client.join_room(room_id).await {
        warn!("Joining room {room_id} failed: {e}");
    }

    let mut subscription = ChatSubscription::connect(config, room_id).await?;
    let mut session = ChatSession::new();
    let history = client.chat_history(room_id);
    tokio::pin!(history);
    let mut history_pending = true;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            result = &mut history, if history_pending => {
                history_pending = false;
                match result {
                    Ok(entries) => session.seed_history(entries),
                    Err(e) => {
                        warn!("Loading history failed: {e}");
                        session.history_failed();
                    }
                }
                for message in session.messages() {
                    println!("{}", render(message, &config.owner));
                }
            }
            event = subscription.next_event() => {
                let Some(event) = event else {
                    info!("Chat stream ended");
                    break;
                };
                if let Some(index) = session.ingest(event) {
                    let message = &session.messages()[index];
                    if !message.is_streaming() {
                        println!("{}", render(message, &config.owner));
                    }
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) if !line.trim().is_empty() => {
                        let mut draft = ChatMessageDraft::text(room_id, line.trim());
                        draft.sender_id = config.owner.owner_id;
                        subscription.send(&draft)?;
                    }
                    Some(_) => {}
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.close().await;
    Ok(())
}

fn render(message: &UiMessage, owner: &OwnerContext) -> String {
    let who = if message.is_mine(owner) {
        "me".to_string()
    } else {
        message
            .sender_nm
            .clone()
            .or_else(|| message.sender_id.map(|id| format!("#{id}")))
            .unwrap_or_else(|| "?".to_string())
    };
    let mut line = format!(
        "{}  {who}: {}",
        message.sent_dt.as_deref().unwrap_or("-"),
        message.content
    );
    if let Some(translated) = &message.translated_text {
        line.push_str(&format!("\n    ({translated})"));
    }
    line
}

fn normalize(entity: Entity, raw: &Value) -> Value {
    fn each<T: Serialize>(raw: &Value, adapt: fn(&Value) -> T) -> Value {
        let out = match unwrap_list(raw) {
            Some(items) => serde_json::to_value(items.iter().map(adapt).collect::<Vec<_>>()),
            None => serde_json::to_value(adapt(raw)),
        };
        out.unwrap_or(Value::Null)
    }

    match entity {
        Entity::Task => each(raw, adapt_in_task),
        Entity::Diary => each(raw, adapt_in_diary),
        Entity::Ledger => each(raw, adapt_in_ledger_row),
        Entity::Reservation => each(raw, adapt_in_reservation),
        Entity::Room => each(raw, adapt_in_chat_room),
        Entity::Message => each(raw, adapt_in_chat_message),
        Entity::Product => each(raw, adapt_in_product_summary),
        Entity::ProductDetail => each(raw, adapt_in_product_detail),
    }
}

/// A JSON document, or failing that one JSON value per line.
fn json_values(raw: &str) -> Vec<Value> {
    match parse_lenient(raw) {
        Value::Array(items) => items,
        Value::Null => raw
            .lines()
            .map(parse_lenient)
            .filter(|v| !v.is_null())
            .collect(),
        single => vec![single],
    }
}

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw).await?;
            Ok(raw)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
