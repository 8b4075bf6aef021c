// Persistence collaborators: load/save a string blob under a named key

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const CURRENT_VERSION: u32 = 1;

/// Name of the directory created under a store root
pub const STORE_DIR: &str = ".todostore";

/// Key the task array is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "tasks";

/// Key/value storage for the serialized task collection
///
/// Errors are the collaborator's concern: `TaskStore` logs them and carries on.
pub trait Persistence {
    /// Read the blob, `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<String>>;

    /// Replace the blob
    fn save(&mut self, data: &str) -> Result<()>;
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&mut self, data: &str) -> Result<()> {
        (**self).save(data)
    }
}

/// Validate a storage key
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

/// Create `<root>/.todostore` with its .gitignore and .version files
fn prepare_store_dir(root: &Path) -> Result<PathBuf> {
    let base_path = root.join(STORE_DIR);
    fs::create_dir_all(&base_path).context("Failed to create store directory")?;

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(
            gitignore_path,
            "todostore.db\ntodostore.db-shm\ntodostore.db-wal\n*.tmp\n*.lock\n",
        )?;
    }

    let version_path = base_path.join(".version");
    if !version_path.exists() {
        fs::write(version_path, CURRENT_VERSION.to_string())?;
    }

    Ok(base_path)
}

// ============================================================================
// In-memory
// ============================================================================

/// Holds the blob in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    data: Option<String>,
    saves: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob, as if saved by an earlier session
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            saves: 0,
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &str) -> Result<()> {
        self.data = Some(data.to_string());
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Stores the blob at `<root>/.todostore/<key>.json`
///
/// Writes go to `<key>.json.tmp` and are renamed over the blob, so a failed
/// write never leaves a truncated file. Readers and writers coordinate through
/// an fs2 lock on `<key>.json.lock`.
#[derive(Debug)]
pub struct FilePersistence {
    path: PathBuf,
    tmp_path: PathBuf,
    lock_path: PathBuf,
}

impl FilePersistence {
    /// Open (or create) a file-backed store under `root`
    pub fn open<P: AsRef<Path>>(root: P, key: &str) -> Result<Self> {
        validate_key(key)?;
        let base_path = prepare_store_dir(root.as_ref())?;
        let path = base_path.join(format!("{}.json", key));
        let tmp_path = base_path.join(format!("{}.json.tmp", key));
        let lock_path = base_path.join(format!("{}.json.lock", key));
        debug!(path = ?path, "Opened file persistence");
        Ok(Self {
            path,
            tmp_path,
            lock_path,
        })
    }

    /// Path of the JSON file holding the blob
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .context("Failed to open lock file")
    }
}

impl Persistence for FilePersistence {
    fn load(&self) -> Result<Option<String>> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock).context("Failed to acquire file lock")?;

        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path).context("Failed to open task file")?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read task file")?;

        // Lock is automatically released when the lock file is dropped
        Ok(Some(content))
    }

    fn save(&mut self, data: &str) -> Result<()> {
        let lock = self.lock_file()?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut tmp = File::create(&self.tmp_path).context("Failed to create temporary task file")?;
        tmp.write_all(data.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&self.tmp_path, &self.path).context("Failed to replace task file")?;
        Ok(())
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// Stores the blob in a `kv` table of `<root>/.todostore/todostore.db`
pub struct SqlitePersistence {
    db: Connection,
    key: String,
}

impl SqlitePersistence {
    /// Open (or create) a SQLite-backed store under `root`
    pub fn open<P: AsRef<Path>>(root: P, key: &str) -> Result<Self> {
        validate_key(key)?;
        let base_path = prepare_store_dir(root.as_ref())?;
        let db_path = base_path.join("todostore.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        Self::with_connection(db, key)
    }

    /// SQLite store that lives only as long as this value
    pub fn in_memory(key: &str) -> Result<Self> {
        validate_key(key)?;
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db, key)
    }

    fn with_connection(db: Connection, key: &str) -> Result<Self> {
        debug!("Creating database schema");
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            db,
            key: key.to_string(),
        })
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }
}

impl Persistence for SqlitePersistence {
    fn load(&self) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [&self.key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, data: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![&self.key, data],
        )?;
        Ok(())
    }
}
