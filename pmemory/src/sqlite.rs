use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pchat::{Chat, ChatError, ChatFuture, ChatMessage, ChatStore};
use pcommon::ChatId;
use pprovider::Role;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug)]
pub struct SqliteChatStore {
    connection: Mutex<Connection>,
}

impl SqliteChatStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                ChatError::store(format!("failed to create sqlite parent directory: {error}"))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            ChatError::store(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, ChatError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            ChatError::store(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn open_default() -> Result<Self, ChatError> {
        Self::new(default_sqlite_path())
    }

    fn from_connection(connection: Connection) -> Result<Self, ChatError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                ChatError::store(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ChatError> {
        self.connection
            .lock()
            .map_err(|_| ChatError::store("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), ChatError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS chats (
                chat_id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL,
                company_id TEXT NOT NULL,
                title TEXT NOT NULL,
                model TEXT NOT NULL,
                total_tokens INTEGER NOT NULL,
                max_history_messages INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp_secs INTEGER NOT NULL,
                timestamp_nanos INTEGER NOT NULL,
                token_count INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_messages_chat_position
            ON chat_messages(chat_id, position);
            ",
        )
        .map_err(|error| {
            ChatError::store(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }
}

impl ChatStore for SqliteChatStore {
    fn get<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<Option<Chat>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;

            let chat = conn
                .query_row(
                    "
                    SELECT organization_id, company_id, title, model, total_tokens, max_history_messages
                    FROM chats
                    WHERE chat_id = ?1
                    ",
                    params![chat_id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, i64>(5)?,
                        ))
                    },
                )
                .optional()
                .map_err(|error| {
                    ChatError::store(format!("failed to load chat row: {error}"))
                })?;

            let Some((organization_id, company_id, title, model, total_tokens, max_history)) = chat
            else {
                return Ok(None);
            };

            let mut chat = Chat::new(chat_id.clone(), organization_id, company_id, model)
                .with_title(title)
                .with_history_window(max_history.max(0) as usize);
            chat.total_tokens = total_tokens.max(0) as u64;

            let mut stmt = conn
                .prepare(
                    "
                    SELECT role, content, timestamp_secs, timestamp_nanos, token_count
                    FROM chat_messages
                    WHERE chat_id = ?1
                    ORDER BY position ASC
                    ",
                )
                .map_err(|error| {
                    ChatError::store(format!("failed to prepare message query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![chat_id.as_str()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .map_err(|error| {
                    ChatError::store(format!("failed to query message rows: {error}"))
                })?;

            for row in rows {
                let (role, content, secs, nanos, token_count) = row.map_err(|error| {
                    ChatError::store(format!("failed to read message row: {error}"))
                })?;
                chat.messages.push(ChatMessage {
                    role: role_from_str(&role)?,
                    content,
                    timestamp: decode_system_time(secs, nanos)?,
                    token_count: token_count.max(0) as u32,
                });
            }

            Ok(Some(chat))
        })
    }

    // One transaction per save keeps the per-id read-modify-write contract:
    // a concurrent reader sees either the previous transcript or the new
    // one, never a partially replaced window.
    fn save<'a>(&'a self, chat: Chat) -> ChatFuture<'a, Result<Chat, ChatError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                ChatError::store(format!("failed to begin save transaction: {error}"))
            })?;

            tx.execute(
                "
                INSERT INTO chats (
                    chat_id,
                    organization_id,
                    company_id,
                    title,
                    model,
                    total_tokens,
                    max_history_messages
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(chat_id) DO UPDATE SET
                    organization_id = excluded.organization_id,
                    company_id = excluded.company_id,
                    title = excluded.title,
                    model = excluded.model,
                    total_tokens = excluded.total_tokens,
                    max_history_messages = excluded.max_history_messages
                ",
                params![
                    chat.id.as_str(),
                    chat.organization_id.as_str(),
                    chat.company_id.as_str(),
                    &chat.title,
                    &chat.model,
                    chat.total_tokens as i64,
                    chat.max_history_messages as i64,
                ],
            )
            .map_err(|error| ChatError::store(format!("failed to upsert chat row: {error}")))?;

            tx.execute(
                "DELETE FROM chat_messages WHERE chat_id = ?1",
                params![chat.id.as_str()],
            )
            .map_err(|error| {
                ChatError::store(format!("failed to clear message rows: {error}"))
            })?;

            for (position, message) in chat.messages.iter().enumerate() {
                let (secs, nanos) = encode_system_time(message.timestamp)?;
                tx.execute(
                    "
                    INSERT INTO chat_messages (
                        chat_id,
                        position,
                        role,
                        content,
                        timestamp_secs,
                        timestamp_nanos,
                        token_count
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ",
                    params![
                        chat.id.as_str(),
                        position as i64,
                        role_to_str(message.role),
                        &message.content,
                        secs,
                        nanos,
                        i64::from(message.token_count),
                    ],
                )
                .map_err(|error| {
                    ChatError::store(format!("failed to write message row: {error}"))
                })?;
            }

            tx.commit().map_err(|error| {
                ChatError::store(format!("failed to commit save transaction: {error}"))
            })?;

            Ok(chat)
        })
    }

    fn delete<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                ChatError::store(format!("failed to begin delete transaction: {error}"))
            })?;

            let removed = tx
                .execute("DELETE FROM chats WHERE chat_id = ?1", params![chat_id.as_str()])
                .map_err(|error| {
                    ChatError::store(format!("failed to delete chat row: {error}"))
                })?;
            tx.execute(
                "DELETE FROM chat_messages WHERE chat_id = ?1",
                params![chat_id.as_str()],
            )
            .map_err(|error| {
                ChatError::store(format!("failed to delete message rows: {error}"))
            })?;

            tx.commit().map_err(|error| {
                ChatError::store(format!("failed to commit delete transaction: {error}"))
            })?;

            Ok(removed > 0)
        })
    }
}

fn encode_system_time(value: SystemTime) -> Result<(i64, i64), ChatError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        ChatError::invalid_request(format!("timestamp predates unix epoch: {error}"))
    })?;
    Ok((
        duration.as_secs() as i64,
        i64::from(duration.subsec_nanos()),
    ))
}

fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, ChatError> {
    if seconds < 0 {
        return Err(ChatError::store(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        )));
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(ChatError::store(format!(
            "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
        )));
    }
    Ok(UNIX_EPOCH + Duration::new(seconds as u64, nanos as u32))
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn role_from_str(value: &str) -> Result<Role, ChatError> {
    match value {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        _ => Err(ChatError::store(format!(
            "unknown message role value '{value}'"
        ))),
    }
}

pub fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("PMEMORY_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".palaver").join("pmemory.sqlite3");
    }

    PathBuf::from("pmemory.sqlite3")
}
