//! The persisted record of already-imported assignments

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The set of event UIDs that were already imported on this or previous runs.
///
/// The ledger lives in a single per-user file and is loaded wholesale at the start of a run and
/// persisted back after every successful import. Entries are never removed by normal operation.
///
/// Concurrent runs against the same file are not coordinated: this crate assumes at most one run
/// at a time per ledger file.
#[derive(Debug, PartialEq)]
pub struct Ledger {
    backing_file: PathBuf,
    uids: HashSet<String>,
}

impl Ledger {
    /// The default location of the ledger file (`~/.todology/imported.json`)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".todology")
            .join("imported.json")
    }

    /// Initialize an empty ledger that will persist to `path`
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
            uids: HashSet::new(),
        }
    }

    /// Load the ledger from its backing file.
    ///
    /// A missing file yields an empty ledger (this is the first run). A file that exists but
    /// cannot be parsed also yields an empty ledger with a logged warning, trading a possible
    /// one-time duplicate-import burst for availability. Any other I/O failure is returned as-is,
    /// since silently starting from scratch next to an unreadable ledger would guarantee
    /// duplicates.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let bytes = match std::fs::read(path) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No ledger file at {:?} yet, starting empty", path);
                return Ok(Self::new(path));
            }
            Err(err) => return Err(err),
            Ok(bytes) => bytes,
        };

        let uids = match serde_json::from_slice::<HashSet<String>>(&bytes) {
            Err(err) => {
                log::warn!(
                    "Ledger file {:?} is corrupt ({}). Starting from an empty ledger; \
                     previously imported events may be imported again.",
                    path,
                    err
                );
                HashSet::new()
            }
            Ok(uids) => uids,
        };

        Ok(Self {
            backing_file: PathBuf::from(path),
            uids,
        })
    }

    /// Whether this event identifier was already imported
    pub fn contains(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }

    /// Mark an event identifier as imported. Recording an already-present identifier is a no-op.
    pub fn record(&mut self, uid: &str) {
        self.uids.insert(uid.to_string());
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    /// Write the full ledger to its backing file.
    ///
    /// The write is atomic (write to a sibling temp file, then rename), so a crash mid-persist
    /// never loses previously recorded identifiers.
    pub fn persist(&self) -> Result<(), std::io::Error> {
        let path = &self.backing_file;
        if let Some(parent) = path.parent() {
            if parent.as_os_str().is_empty() == false {
                std::fs::create_dir_all(parent)?;
            }
        }

        // A stable on-disk order keeps diffs between runs readable
        let mut uids: Vec<&str> = self.uids.iter().map(|uid| uid.as_str()).collect();
        uids.sort_unstable();
        let contents = serde_json::to_vec_pretty(&uids)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_ledger_path(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "todology-ledger-{}-{}.json",
            test_name,
            std::process::id()
        ))
    }

    #[test]
    fn record_is_idempotent() {
        let mut ledger = Ledger::new(Path::new("unused.json"));
        assert!(ledger.contains("uid-1") == false);

        ledger.record("uid-1");
        ledger.record("uid-1");
        ledger.record("uid-2");

        assert!(ledger.contains("uid-1"));
        assert!(ledger.contains("uid-2"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn persists_and_reloads() {
        let path = temp_ledger_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let mut ledger = Ledger::new(&path);
        ledger.record("assignment-1");
        ledger.record("assignment-2");
        ledger.persist().unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(ledger, reloaded);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let path = temp_ledger_path("missing");
        let _ = std::fs::remove_file(&path);

        let ledger = Ledger::load(&path).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let path = temp_ledger_path("corrupt");
        std::fs::write(&path, b"{ not json at all").unwrap();

        let ledger = Ledger::load(&path).unwrap();
        assert!(ledger.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn persist_replaces_previous_contents_atomically() {
        let path = temp_ledger_path("atomic");
        let _ = std::fs::remove_file(&path);

        let mut ledger = Ledger::new(&path);
        ledger.record("a");
        ledger.persist().unwrap();
        ledger.record("b");
        ledger.persist().unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        // No temp file left behind
        assert!(path.with_extension("json.tmp").exists() == false);

        let _ = std::fs::remove_file(&path);
    }
}
