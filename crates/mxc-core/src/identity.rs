//! Durable session identity.
//!
//! The session identifier is read from a `SessionStore` and, when absent,
//! synthesized as `session-<epoch-millis>` and persisted. Once stored it is
//! reused by every later run until the entry is cleared.
//!
//! ## State file
//!
//! ```toml
//! matrix_session_id = "session-1734400000000"
//! ```

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml_edit::{DocumentMut, value};
use tracing::info;

use crate::config::paths;

/// Fixed key under which the identifier is stored.
pub const SESSION_KEY: &str = "matrix_session_id";

const SESSION_PREFIX: &str = "session-";
const BADGE_LEN: usize = 8;

/// Durable storage for the session identifier.
pub trait SessionStore {
    /// Returns the stored identifier, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Persists the identifier.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, id: &str) -> Result<()>;

    /// Removes the stored identifier.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<()>;
}

/// Stores the identifier in `state.toml`, keeping any other keys and comments.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `${MXC_HOME}/state.toml`.
    pub fn default_location() -> Self {
        Self::new(paths::state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<DocumentMut> {
        if !self.path.exists() {
            return Ok(DocumentMut::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state from {}", self.path.display()))?;
        contents
            .parse()
            .with_context(|| format!("Failed to parse state from {}", self.path.display()))
    }

    fn write_document(&self, doc: &DocumentMut) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state dir {}", parent.display()))?;
        }
        fs::write(&self.path, doc.to_string())
            .with_context(|| format!("Failed to write state to {}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        let doc = self.read_document()?;
        Ok(doc
            .get(SESSION_KEY)
            .and_then(|item| item.as_str())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string))
    }

    fn save(&self, id: &str) -> Result<()> {
        let mut doc = self.read_document()?;
        doc[SESSION_KEY] = value(id);
        self.write_document(&doc)
    }

    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut doc = self.read_document()?;
        if doc.remove(SESSION_KEY).is_some() {
            self.write_document(&doc)?;
        }
        Ok(())
    }
}

/// In-memory store, scoped to the value's lifetime.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RefCell<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(id.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, id: &str) -> Result<()> {
        *self.slot.borrow_mut() = Some(id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

/// Read-only session identifier shared by every console action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    id: String,
}

impl SessionIdentity {
    /// Reads the identifier from `store`, creating and persisting one if absent.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn init(store: &dyn SessionStore) -> Result<Self> {
        Self::init_with_clock(store, || chrono::Utc::now().timestamp_millis())
    }

    /// Same as [`SessionIdentity::init`] with an explicit millisecond clock.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn init_with_clock(store: &dyn SessionStore, now_millis: impl FnOnce() -> i64) -> Result<Self> {
        if let Some(id) = store.load().context("load session identifier")? {
            return Ok(Self { id });
        }

        let id = format!("{SESSION_PREFIX}{}", now_millis());
        store.save(&id).context("persist session identifier")?;
        info!(session_id = %id, "created session identifier");
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short form shown in banners (first eight characters).
    pub fn badge(&self) -> &str {
        match self.id.char_indices().nth(BADGE_LEN) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_creates_identifier_when_store_is_empty() {
        let store = MemorySessionStore::new();
        let identity = SessionIdentity::init_with_clock(&store, || 1_734_400_000_000).unwrap();

        assert_eq!(identity.id(), "session-1734400000000");
        assert_eq!(store.load().unwrap().as_deref(), Some("session-1734400000000"));
    }

    #[test]
    fn test_existing_identifier_is_reused() {
        let store = MemorySessionStore::new();
        let first = SessionIdentity::init_with_clock(&store, || 1).unwrap();
        let second = SessionIdentity::init_with_clock(&store, || 2).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.id(), "session-1");
    }

    #[test]
    fn test_default_clock_matches_format() {
        let store = MemorySessionStore::new();
        let identity = SessionIdentity::init(&store).unwrap();

        let millis = identity.id().strip_prefix("session-").unwrap();
        assert!(!millis.is_empty());
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let created = SessionIdentity::init_with_clock(&FileSessionStore::new(&path), || 42).unwrap();
        let reloaded =
            SessionIdentity::init_with_clock(&FileSessionStore::new(&path), || 99).unwrap();

        assert_eq!(created.id(), "session-42");
        assert_eq!(reloaded.id(), "session-42");
    }

    #[test]
    fn test_file_store_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "# local state\nlast_tab = \"chat\"\n").unwrap();

        let store = FileSessionStore::new(&path);
        store.save("session-7").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# local state"));
        assert!(contents.contains("last_tab = \"chat\""));
        assert!(contents.contains("matrix_session_id = \"session-7\""));
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        FileSessionStore::new(&path).save("session-1").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_clear_allows_a_new_identifier() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("state.toml"));

        SessionIdentity::init_with_clock(&store, || 1).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        let fresh = SessionIdentity::init_with_clock(&store, || 2).unwrap();
        assert_eq!(fresh.id(), "session-2");
    }

    #[test]
    fn test_clear_on_missing_file_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");

        FileSessionStore::new(&path).clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_blank_stored_value_is_treated_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "matrix_session_id = \"  \"\n").unwrap();

        let identity = SessionIdentity::init_with_clock(&FileSessionStore::new(&path), || 5).unwrap();
        assert_eq!(identity.id(), "session-5");
    }

    #[test]
    fn test_badge_is_first_eight_chars() {
        let store = MemorySessionStore::with_id("session-1734400000000");
        let identity = SessionIdentity::init(&store).unwrap();
        assert_eq!(identity.badge(), "session-");

        let short = SessionIdentity::init(&MemorySessionStore::with_id("abc")).unwrap();
        assert_eq!(short.badge(), "abc");
    }
}
