/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The persisted hidden set and its durable stores.
//!
//! [`PersistedHiddenSet`] is the in-memory set of identities that were hidden
//! at the last shutdown or disconnect-while-hidden. A [`HiddenSetStore`] loads
//! it wholesale at startup and saves it wholesale (full overwrite) at shutdown
//! and after every offline-hide.
//!
//! # Record layout (JSON, `serde` feature)
//!
//! ```text
//! { "version": 1, "hidden": [76561198000000001, 76561198000000002] }
//! ```
//!
//! `hidden` is written sorted so that identical sets produce identical files;
//! order carries no meaning on load.
//!
//! # Failure policy
//!
//! [`load_or_empty`] fails open: a missing, unreadable, or corrupt record
//! yields an empty set and a `warn!` diagnostic. Nobody is hidden rather than
//! the component refusing to start.

use hashbrown::HashSet;
use tracing::warn;

use crate::identity::UserId;

// ─── PersistedHiddenSet ─────────────────────────────────────────────────────

/// Identities flagged hidden across sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedHiddenSet {
    ids: HashSet<UserId>,
}

impl PersistedHiddenSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `user`. Returns `true` if newly added.
    pub fn insert(&mut self, user: UserId) -> bool {
        self.ids.insert(user)
    }

    /// Unflag `user`. Returns `true` if it was present.
    pub fn remove(&mut self, user: UserId) -> bool {
        self.ids.remove(&user)
    }

    /// `true` if `user` is flagged.
    pub fn contains(&self, user: UserId) -> bool {
        self.ids.contains(&user)
    }

    /// Number of flagged identities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` if nobody is flagged.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate flagged identities (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.ids.iter().copied()
    }

    /// Flagged identities in ascending order.
    pub fn sorted(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<UserId> for PersistedHiddenSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

// ─── Store trait ────────────────────────────────────────────────────────────

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record could not be read or written.
    #[error("hidden-set store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The record exists but does not parse.
    #[error("hidden-set record is corrupt: {0}")]
    Corrupt(String),
    /// The record has a version this build does not understand.
    #[error("unsupported hidden-set record version {0}")]
    UnsupportedVersion(u16),
}

/// Durable backing for [`PersistedHiddenSet`]. Whole-set load and save only.
pub trait HiddenSetStore {
    /// Read the record. A store with no record yet returns an empty set.
    fn load(&mut self) -> Result<PersistedHiddenSet, StoreError>;

    /// Overwrite the record with `set`.
    fn save(&mut self, set: &PersistedHiddenSet) -> Result<(), StoreError>;
}

/// Load through `store`, treating any failure as "nobody hidden".
pub fn load_or_empty<S: HiddenSetStore + ?Sized>(store: &mut S) -> PersistedHiddenSet {
    match store.load() {
        Ok(set) => set,
        Err(err) => {
            warn!(error = %err, "hidden-set record unusable, starting with nobody hidden");
            PersistedHiddenSet::new()
        }
    }
}

// ─── MemoryStore ────────────────────────────────────────────────────────────

/// In-process store. Survives as long as the value does; used to simulate a
/// restart by moving it from one coordinator into the next.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    record: Option<Vec<UserId>>,
    corrupt: bool,
    saves: usize,
}

impl MemoryStore {
    /// Store with no record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose record already lists `ids`.
    pub fn with_record<I: IntoIterator<Item = UserId>>(ids: I) -> Self {
        Self {
            record: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Store whose record fails to parse on the next load.
    pub fn corrupted() -> Self {
        Self {
            corrupt: true,
            ..Self::default()
        }
    }

    /// Identities in the last saved record, sorted.
    pub fn record(&self) -> Option<&[UserId]> {
        self.record.as_deref()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl HiddenSetStore for MemoryStore {
    fn load(&mut self) -> Result<PersistedHiddenSet, StoreError> {
        if self.corrupt {
            return Err(StoreError::Corrupt("record truncated".to_owned()));
        }
        Ok(self
            .record
            .as_ref()
            .map(|ids| ids.iter().copied().collect::<PersistedHiddenSet>())
            .unwrap_or_default())
    }

    fn save(&mut self, set: &PersistedHiddenSet) -> Result<(), StoreError> {
        self.record = Some(set.sorted());
        self.corrupt = false;
        self.saves += 1;
        Ok(())
    }
}

// ─── JsonFileStore ──────────────────────────────────────────────────────────

/// Current on-disk record version.
#[cfg(feature = "serde")]
pub const RECORD_VERSION: u16 = 1;

/// Serialized form of [`PersistedHiddenSet`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct HiddenSetRecord {
    /// Always [`RECORD_VERSION`] for newly written records.
    pub version: u16,
    /// Flagged identities, ascending.
    pub hidden: Vec<UserId>,
}

#[cfg(feature = "serde")]
impl From<&PersistedHiddenSet> for HiddenSetRecord {
    fn from(set: &PersistedHiddenSet) -> Self {
        Self {
            version: RECORD_VERSION,
            hidden: set.sorted(),
        }
    }
}

/// JSON record in a single file. Saves go through a sibling temp file and a
/// rename so a crash mid-write leaves the previous record intact.
#[cfg(feature = "serde")]
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "serde")]
impl JsonFileStore {
    /// Store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "serde")]
impl HiddenSetStore for JsonFileStore {
    fn load(&mut self) -> Result<PersistedHiddenSet, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedHiddenSet::new())
            }
            Err(err) => return Err(err.into()),
        };
        let record: HiddenSetRecord =
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if record.version != RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion(record.version));
        }
        Ok(record.hidden.into_iter().collect())
    }

    fn save(&mut self, set: &PersistedHiddenSet) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(&HiddenSetRecord::from(set))
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_basics() {
        let mut set = PersistedHiddenSet::new();
        assert!(set.insert(UserId(3)));
        assert!(!set.insert(UserId(3)));
        set.insert(UserId(1));
        assert_eq!(set.sorted(), vec![UserId(1), UserId(3)]);
        assert!(set.remove(UserId(3)));
        assert!(!set.contains(UserId(3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        let set: PersistedHiddenSet = [UserId(5), UserId(2)].into_iter().collect();
        store.save(&set).unwrap();
        let smaller: PersistedHiddenSet = [UserId(9)].into_iter().collect();
        store.save(&smaller).unwrap();

        assert_eq!(store.record(), Some(&[UserId(9)][..]));
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load().unwrap(), smaller);
    }

    #[test]
    fn test_corrupt_store_fails_open() {
        let mut store = MemoryStore::corrupted();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        assert!(load_or_empty(&mut store).is_empty());
    }

    #[cfg(feature = "serde")]
    mod file {
        use super::super::*;

        #[test]
        fn test_missing_file_is_empty() {
            let dir = tempfile::tempdir().unwrap();
            let mut store = JsonFileStore::new(dir.path().join("hidden.json"));
            assert!(store.load().unwrap().is_empty());
        }

        #[test]
        fn test_save_then_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("data").join("hidden.json");
            let mut store = JsonFileStore::new(&path);

            let set: PersistedHiddenSet = [UserId(20), UserId(10)].into_iter().collect();
            store.save(&set).unwrap();

            let text = std::fs::read_to_string(&path).unwrap();
            let record: HiddenSetRecord = serde_json::from_str(&text).unwrap();
            assert_eq!(record.version, RECORD_VERSION);
            assert_eq!(record.hidden, vec![UserId(10), UserId(20)]);

            let mut reopened = JsonFileStore::new(&path);
            assert_eq!(reopened.load().unwrap(), set);
        }

        #[test]
        fn test_garbage_file_is_corrupt() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("hidden.json");
            std::fs::write(&path, "{ \"version\": 1, \"hidden\": [").unwrap();

            let mut store = JsonFileStore::new(&path);
            assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
            assert!(load_or_empty(&mut store).is_empty());
        }

        #[test]
        fn test_future_version_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("hidden.json");
            std::fs::write(&path, r#"{"version": 9, "hidden": [1]}"#).unwrap();

            let mut store = JsonFileStore::new(&path);
            assert!(matches!(
                store.load(),
                Err(StoreError::UnsupportedVersion(9))
            ));
        }
    }
}
