use anyhow::{Context as _, anyhow};
use parsec_domain::{PersistedAppState, PersistedHistory, PersistedSession};
use rusqlite::{Connection, OptionalExtension as _, Transaction, params};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::time::unix_epoch_seconds_now;

const LATEST_SCHEMA_VERSION: u32 = 1;
const SESSION_KEY: &str = "session";
const HISTORY_KEY: &str = "history";

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/migrations/0001_init.sql"
    )),
)];

/// Handle to a SQLite key-value store owned by a dedicated worker thread.
#[derive(Clone)]
pub struct SqliteStore {
    tx: mpsc::Sender<DbCommand>,
}

enum DbCommand {
    LoadAppState {
        reply: mpsc::Sender<anyhow::Result<PersistedAppState>>,
    },
    SaveAppState {
        snapshot: Box<PersistedAppState>,
        reply: mpsc::Sender<anyhow::Result<()>>,
    },
    GetText {
        key: String,
        reply: mpsc::Sender<anyhow::Result<Option<String>>>,
    },
    SetText {
        key: String,
        value: Option<String>,
        reply: mpsc::Sender<anyhow::Result<()>>,
    },
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<DbCommand>();

        std::thread::Builder::new()
            .name("parsec-sqlite".to_owned())
            .spawn(move || {
                let mut db = SqliteDatabase::open(&db_path);
                if let Err(err) = &db {
                    tracing::error!(
                        error = %format!("{err:#}"),
                        path = %db_path.display(),
                        "failed to open sqlite store"
                    );
                }
                while let Ok(cmd) = rx.recv() {
                    match (&mut db, cmd) {
                        (Ok(db), DbCommand::LoadAppState { reply }) => {
                            let _ = reply.send(db.load_app_state());
                        }
                        (Ok(db), DbCommand::SaveAppState { snapshot, reply }) => {
                            let _ = reply.send(db.save_app_state(&snapshot));
                        }
                        (Ok(db), DbCommand::GetText { key, reply }) => {
                            let _ = reply.send(db.get_text(&key));
                        }
                        (Ok(db), DbCommand::SetText { key, value, reply }) => {
                            let _ = reply.send(db.set_text(&key, value.as_deref()));
                        }
                        (Err(err), cmd) => respond_db_open_error(err, cmd),
                    }
                }
            })
            .context("failed to spawn sqlite worker thread")?;

        Ok(Self { tx })
    }

    pub fn load_app_state(&self) -> anyhow::Result<PersistedAppState> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::LoadAppState { reply: reply_tx })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }

    pub fn save_app_state(&self, snapshot: PersistedAppState) -> anyhow::Result<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::SaveAppState {
                snapshot: Box::new(snapshot),
                reply: reply_tx,
            })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }

    pub fn get_text(&self, key: impl Into<String>) -> anyhow::Result<Option<String>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::GetText {
                key: key.into(),
                reply: reply_tx,
            })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }

    /// `None` deletes the key.
    pub fn set_text(&self, key: impl Into<String>, value: Option<String>) -> anyhow::Result<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::SetText {
                key: key.into(),
                value,
                reply: reply_tx,
            })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }
}

fn respond_db_open_error(err: &anyhow::Error, cmd: DbCommand) {
    let message = format!("{err:#}");
    match cmd {
        DbCommand::LoadAppState { reply } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
        DbCommand::SaveAppState { reply, .. } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
        DbCommand::GetText { reply, .. } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
        DbCommand::SetText { reply, .. } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
    }
}

struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut conn = Connection::open(db_path)
            .with_context(|| format!("failed to open sqlite db {}", db_path.display()))?;

        configure_connection(&mut conn).context("failed to configure sqlite connection")?;
        apply_migrations(&mut conn).context("failed to apply sqlite migrations")?;

        Ok(Self { conn })
    }

    /// Missing keys load as `None` so a fresh database restores the default state.
    fn load_app_state(&mut self) -> anyhow::Result<PersistedAppState> {
        let session = self
            .get_text(SESSION_KEY)?
            .map(|raw| serde_json::from_str::<PersistedSession>(&raw))
            .transpose()
            .context("failed to decode persisted session")?;
        let history = self
            .get_text(HISTORY_KEY)?
            .map(|raw| serde_json::from_str::<PersistedHistory>(&raw))
            .transpose()
            .context("failed to decode persisted history")?;

        Ok(PersistedAppState { session, history })
    }

    fn save_app_state(&mut self, snapshot: &PersistedAppState) -> anyhow::Result<()> {
        let session = snapshot
            .session
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("failed to encode session")?;
        let history = snapshot
            .history
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("failed to encode history")?;

        let now = unix_epoch_seconds_now();
        let tx = self.conn.transaction()?;
        write_text(&tx, SESSION_KEY, session.as_deref(), now)?;
        write_text(&tx, HISTORY_KEY, history.as_deref(), now)?;
        tx.commit().context("failed to commit app state")?;
        Ok(())
    }

    fn get_text(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_settings_text WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to load text value {key}"))
    }

    fn set_text(&mut self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        let now = unix_epoch_seconds_now();
        let tx = self.conn.transaction()?;
        write_text(&tx, key, value, now)?;
        tx.commit()?;
        Ok(())
    }
}

fn write_text(tx: &Transaction<'_>, key: &str, value: Option<&str>, now: i64) -> anyhow::Result<()> {
    match value {
        Some(value) => {
            tx.execute(
                "INSERT INTO app_settings_text (key, value, created_at, updated_at)
                 VALUES (?1, ?2, COALESCE((SELECT created_at FROM app_settings_text WHERE key = ?1), ?3), ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context(|| format!("failed to store text value {key}"))?;
        }
        None => {
            tx.execute("DELETE FROM app_settings_text WHERE key = ?1", params![key])
                .with_context(|| format!("failed to delete text value {key}"))?;
        }
    }
    Ok(())
}

fn configure_connection(conn: &mut Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )
    .context("failed to apply sqlite PRAGMAs")?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> anyhow::Result<()> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .context("failed to read user_version")? as u32;

    if current > LATEST_SCHEMA_VERSION {
        return Err(anyhow!(
            "sqlite schema version is newer than this build: db={}, app={}",
            current,
            LATEST_SCHEMA_VERSION
        ));
    }

    if current == LATEST_SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch("BEGIN IMMEDIATE;")
        .context("failed to begin migration transaction")?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration v{version:04}"))?;
        conn.pragma_update(None, "user_version", *version as i64)
            .context("failed to update user_version")?;
    }

    conn.execute_batch("COMMIT;")
        .context("failed to commit migration transaction")?;
    Ok(())
}
