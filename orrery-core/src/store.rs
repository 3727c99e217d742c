//! SQLite-backed conversation store.
//!
//! Design goals:
//! - One durable row per conversation holding the full record as JSON
//! - A per-conversation FIFO queue of deferred effects, drained atomically
//! - Location descriptions keyed by grid coordinates
//! - WAL mode for concurrent reads during the response hot path
//! - Optional CRC-32 checksums to detect save corruption
//! - Backup support via SQLite's online-backup API.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::effects::Effect;
use crate::error::{OrreryError, Result};
use crate::task::TaskState;
use crate::types::{
    baseline_state, AffectState, ConversationId, GridCoords, Message, TraitConfigMap,
};

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 (ISO 3309 / ITU-T V.42) of `data`, as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// ConversationRecord
// ---------------------------------------------------------------------------

/// Everything persisted for one conversation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationRecord {
    /// Conversation identity.
    pub id: ConversationId,
    /// Frozen per-trait parameters, copied from the template at creation.
    pub trait_config: TraitConfigMap,
    /// Current trait values.
    pub personality_state: AffectState,
    /// Recent user sentiment labels, oldest first.
    pub recent_user_sentiments: Vec<String>,
    /// Is the repetition penalty currently active?
    pub repetitive_sentiment_penalty_active: bool,
    /// Task state machine.
    pub task: TaskState,
    /// Message history.
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Create a fresh record from a trait template, every trait at baseline.
    #[must_use]
    pub fn new(id: ConversationId, template: &TraitConfigMap) -> Self {
        Self {
            id,
            trait_config: template.clone(),
            personality_state: baseline_state(template),
            recent_user_sentiments: Vec::new(),
            repetitive_sentiment_penalty_active: false,
            task: TaskState::default(),
            messages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationStore
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS conversations (
        conversation_id TEXT PRIMARY KEY,
        data            BLOB NOT NULL,
        updated_at      TEXT NOT NULL,
        checksum        TEXT
    );
    CREATE TABLE IF NOT EXISTS effects_queue (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        conversation_id TEXT NOT NULL,
        data            BLOB NOT NULL,
        enqueued_at     TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_effects_conversation
        ON effects_queue (conversation_id);
    CREATE TABLE IF NOT EXISTS locations (
        conversation_id TEXT NOT NULL,
        x               INTEGER NOT NULL,
        y               INTEGER NOT NULL,
        description     TEXT NOT NULL,
        updated_at      TEXT NOT NULL,
        PRIMARY KEY (conversation_id, x, y)
    );
";

/// Handle to an open SQLite database holding conversation records.
///
/// The connection sits behind a mutex so the store can be shared across
/// async tasks; every call holds it only for the duration of one statement
/// or transaction.
pub struct ConversationStore {
    conn: Mutex<Connection>,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConversationStore {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if it does not exist. WAL mode is enabled when
    /// `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "conversation store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    // ------------------------------------------------------------------
    // Conversation CRUD
    // ------------------------------------------------------------------

    /// Save (upsert) a conversation record.
    ///
    /// The record is serialised to JSON. If `config.checksum_enabled` is
    /// true, a CRC-32 of the JSON bytes is stored alongside the data.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Serialization`] if JSON encoding fails, or
    /// [`OrreryError::Database`] on SQLite failures.
    pub fn save(&self, record: &ConversationRecord) -> Result<()> {
        let start = Instant::now();
        let json =
            serde_json::to_vec(record).map_err(|e| OrreryError::Serialization(e.to_string()))?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        self.conn.lock().execute(
            "INSERT INTO conversations (conversation_id, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(conversation_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![record.id.to_string(), json, now, checksum],
        )?;

        debug!(
            conversation = %record.id,
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "saved conversation"
        );
        Ok(())
    }

    /// Load a conversation record.
    ///
    /// Returns `None` if no row exists. If checksums are enabled and the
    /// stored checksum doesn't match, a warning is logged but the data is
    /// still returned.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Serialization`] if JSON decoding fails, or
    /// [`OrreryError::Database`] on SQLite failures.
    pub fn load(&self, id: ConversationId) -> Result<Option<ConversationRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT data, checksum FROM conversations WHERE conversation_id = ?1")?;

        let result: Option<(Vec<u8>, Option<String>)> = stmt
            .query_row(params![id.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        drop(stmt);
        drop(conn);

        let Some((data, stored_checksum)) = result else {
            return Ok(None);
        };

        if self.config.checksum_enabled {
            if let Some(ref expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if *expected != actual {
                    warn!(
                        conversation = %id,
                        expected = %expected,
                        actual = %actual,
                        "checksum mismatch, possible save corruption"
                    );
                }
            }
        }

        let record: ConversationRecord =
            serde_json::from_slice(&data).map_err(|e| OrreryError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }

    /// Delete a conversation record and everything keyed to it.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn delete(&self, id: ConversationId) -> Result<()> {
        let id_str = id.to_string();
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM conversations WHERE conversation_id = ?1",
            params![id_str],
        )?;
        conn.execute(
            "DELETE FROM effects_queue WHERE conversation_id = ?1",
            params![id_str],
        )?;
        conn.execute(
            "DELETE FROM locations WHERE conversation_id = ?1",
            params![id_str],
        )?;
        Ok(())
    }

    /// List all stored conversation IDs.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn list(&self) -> Result<Vec<ConversationId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT conversation_id FROM conversations")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .filter_map(|s| s.parse().ok().map(ConversationId))
            .collect();
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Effects queue
    // ------------------------------------------------------------------

    /// Append an effect to a conversation's queue.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Serialization`] if JSON encoding fails, or
    /// [`OrreryError::Database`] on SQLite failures.
    pub fn enqueue_effect(&self, id: ConversationId, effect: &Effect) -> Result<()> {
        let json =
            serde_json::to_vec(effect).map_err(|e| OrreryError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        self.conn.lock().execute(
            "INSERT INTO effects_queue (conversation_id, data, enqueued_at)
             VALUES (?1, ?2, ?3)",
            params![id.to_string(), json, now],
        )?;
        Ok(())
    }

    /// Number of effects waiting for a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn pending_count(&self, id: ConversationId) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM effects_queue WHERE conversation_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        #[allow(clippy::cast_sign_loss)]
        Ok(count as usize)
    }

    /// Atomically remove and return a conversation's queued effects in
    /// enqueue order.
    ///
    /// Select and delete run in one transaction, so each effect is handed
    /// out at most once even if processing later fails.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Serialization`] if a queued payload fails to
    /// decode, or [`OrreryError::Database`] on SQLite failures. A decode
    /// failure aborts the transaction and leaves the queue intact.
    pub fn pop_effects(&self, id: ConversationId) -> Result<Vec<Effect>> {
        let id_str = id.to_string();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let effects = {
            let mut stmt = tx.prepare(
                "SELECT data FROM effects_queue WHERE conversation_id = ?1 ORDER BY id ASC",
            )?;
            let rows: Vec<Vec<u8>> = stmt
                .query_map(params![id_str], |row| row.get(0))?
                .collect::<std::result::Result<_, _>>()?;
            rows.into_iter()
                .map(|data| {
                    serde_json::from_slice(&data)
                        .map_err(|e| OrreryError::Serialization(e.to_string()))
                })
                .collect::<Result<Vec<Effect>>>()?
        };

        tx.execute(
            "DELETE FROM effects_queue WHERE conversation_id = ?1",
            params![id_str],
        )?;
        tx.commit()?;

        debug!(conversation = %id, count = effects.len(), "drained effect queue");
        Ok(effects)
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    /// Current description of a location, if one has been written.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn location_description(
        &self,
        id: ConversationId,
        coords: GridCoords,
    ) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let description = conn
            .query_row(
                "SELECT description FROM locations
                 WHERE conversation_id = ?1 AND x = ?2 AND y = ?3",
                params![id.to_string(), coords.x, coords.y],
                |row| row.get(0),
            )
            .optional()?;
        Ok(description)
    }

    /// Upsert a location description.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn save_location_description(
        &self,
        id: ConversationId,
        coords: GridCoords,
        description: &str,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.lock().execute(
            "INSERT INTO locations (conversation_id, x, y, description, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(conversation_id, x, y) DO UPDATE SET
                description = excluded.description,
                updated_at = excluded.updated_at",
            params![id.to_string(), coords.x, coords.y, description, now],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Back up the database to `dest_path` using SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let conn = self.conn.lock();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;
        info!(dest = %dest_path.as_ref().display(), "database backup completed");
        Ok(())
    }

    /// Create a numbered backup alongside the database file, rotating old
    /// backups so that at most `config.backup_count` are kept.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] or [`OrreryError::Io`] on failure.
    pub fn create_rotating_backup(&self) -> Result<()> {
        if self.db_path.as_os_str() == ":memory:" {
            return Ok(());
        }
        let max = self.config.backup_count;

        // Rotate existing backups, highest first so nothing is overwritten.
        for i in (1..max).rev() {
            let src = self.backup_path(i);
            let dst = self.backup_path(i + 1);
            if src.exists() {
                std::fs::rename(&src, &dst)?;
            }
        }
        let oldest = self.backup_path(max + 1);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }

        self.backup(self.backup_path(1))?;
        debug!(max_backups = max, "rotating backup created");
        Ok(())
    }

    /// Path to a numbered backup file (e.g. `conversations.db.bak.1`).
    fn backup_path(&self, n: u32) -> PathBuf {
        let mut name = self.db_path.as_os_str().to_os_string();
        name.push(format!(".bak.{n}"));
        PathBuf::from(name)
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Run `PRAGMA integrity_check`; true means the database is sound.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] if the check query itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String =
            self.conn
                .lock()
                .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Reclaim unused space by running `VACUUM`.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Database`] on SQLite failures.
    pub fn vacuum(&self) -> Result<()> {
        self.conn.lock().execute_batch("VACUUM;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_trait_template;
    use crate::types::Message;

    fn store() -> ConversationStore {
        ConversationStore::open_in_memory(&PersistenceConfig::default()).expect("open")
    }

    fn record() -> ConversationRecord {
        ConversationRecord::new(ConversationId::new(), &default_trait_template())
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = store();
        let mut rec = record();
        rec.messages.push(Message::user("hello"));
        rec.personality_state.insert("trust".to_string(), 0.8);
        // A value with no short decimal form must survive byte-exact.
        rec.personality_state
            .insert("skepticism".to_string(), 0.019_148_049_122_110_634);
        store.save(&rec).expect("save");
        let loaded = store.load(rec.id).expect("load").expect("exists");
        assert_eq!(loaded, rec);
    }

    #[test]
    fn load_missing_returns_none() {
        let store = store();
        assert!(store.load(ConversationId::new()).expect("load").is_none());
    }

    #[test]
    fn delete_removes_everything() {
        let store = store();
        let rec = record();
        store.save(&rec).expect("save");
        store
            .enqueue_effect(
                rec.id,
                &Effect::UserSentiment {
                    message: "hi".into(),
                },
            )
            .expect("enqueue");
        store
            .save_location_description(rec.id, GridCoords { x: 0, y: 0 }, "a quiet square")
            .expect("save location");

        store.delete(rec.id).expect("delete");
        assert!(store.load(rec.id).expect("load").is_none());
        assert_eq!(store.pending_count(rec.id).expect("count"), 0);
        assert!(store
            .location_description(rec.id, GridCoords { x: 0, y: 0 })
            .expect("query")
            .is_none());
    }

    #[test]
    fn queue_preserves_enqueue_order() {
        let store = store();
        let id = ConversationId::new();
        for i in 0..4 {
            store
                .enqueue_effect(
                    id,
                    &Effect::UserSentiment {
                        message: format!("m{i}"),
                    },
                )
                .expect("enqueue");
        }
        assert_eq!(store.pending_count(id).expect("count"), 4);

        let effects = store.pop_effects(id).expect("pop");
        let texts: Vec<_> = effects
            .iter()
            .map(|e| match e {
                Effect::UserSentiment { message } => message.as_str(),
                _ => panic!("unexpected effect"),
            })
            .collect();
        assert_eq!(texts, ["m0", "m1", "m2", "m3"]);
        assert_eq!(store.pending_count(id).expect("count"), 0);
    }

    #[test]
    fn pop_is_scoped_to_one_conversation() {
        let store = store();
        let a = ConversationId::new();
        let b = ConversationId::new();
        store
            .enqueue_effect(a, &Effect::UserSentiment { message: "a".into() })
            .expect("enqueue");
        store
            .enqueue_effect(b, &Effect::UserSentiment { message: "b".into() })
            .expect("enqueue");

        let drained = store.pop_effects(a).expect("pop");
        assert_eq!(drained.len(), 1);
        assert_eq!(store.pending_count(b).expect("count"), 1);
    }

    #[test]
    fn unknown_effect_payload_survives_the_queue() {
        let store = store();
        let id = ConversationId::new();
        let now = Utc::now().to_rfc3339();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO effects_queue (conversation_id, data, enqueued_at)
                 VALUES (?1, ?2, ?3)",
                params![id.to_string(), br#"{"type":"future_thing"}"#.to_vec(), now],
            )
            .expect("insert");
        let effects = store.pop_effects(id).expect("pop");
        assert_eq!(effects, vec![Effect::Unknown]);
    }

    #[test]
    fn location_description_upserts() {
        let store = store();
        let id = ConversationId::new();
        let coords = GridCoords { x: 2, y: 5 };
        store
            .save_location_description(id, coords, "an empty tavern")
            .expect("save");
        store
            .save_location_description(id, coords, "a tavern wrecked by a brawl")
            .expect("update");
        let description = store
            .location_description(id, coords)
            .expect("query")
            .expect("exists");
        assert_eq!(description, "a tavern wrecked by a brawl");
    }

    #[test]
    fn integrity_check_passes() {
        assert!(store().integrity_check().expect("check"));
    }

    #[test]
    fn file_based_open_and_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("conversations.db");
        let config = PersistenceConfig::default();
        let store = ConversationStore::open(&db_path, &config).expect("open");
        let rec = record();
        store.save(&rec).expect("save");

        let backup_path = dir.path().join("conversations_backup.db");
        store.backup(&backup_path).expect("backup");

        let restored = ConversationStore::open(&backup_path, &config).expect("open backup");
        let loaded = restored.load(rec.id).expect("load").expect("exists");
        assert_eq!(loaded.id, rec.id);
    }

    #[test]
    fn rotating_backup_keeps_at_most_n() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("conversations.db");
        let mut config = PersistenceConfig::default();
        config.backup_count = 2;
        let store = ConversationStore::open(&db_path, &config).expect("open");
        store.save(&record()).expect("save");

        store.create_rotating_backup().expect("backup 1");
        store.create_rotating_backup().expect("backup 2");
        store.create_rotating_backup().expect("backup 3");

        let bak = |n: u32| {
            let mut p = db_path.as_os_str().to_os_string();
            p.push(format!(".bak.{n}"));
            PathBuf::from(p)
        };
        assert!(bak(1).exists());
        assert!(bak(2).exists());
        assert!(!bak(3).exists());
    }

    #[test]
    fn crc32_matches_reference_vector() {
        assert_eq!(crc32_compute(b"123456789"), 0xCBF4_3926);
    }
}
