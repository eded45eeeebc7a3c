//! JSON-backed credential store.
//!
//! The whole record set lives in one file. Every operation loads it fully;
//! every mutation rewrites it through a temp file and an atomic rename, so the
//! file on disk is always a complete JSON object.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::models::credential::{Record, RecordSet};
use crate::util::fs as vault_fs;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store {} is not a valid record set: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize record set: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whether an upsert found an existing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No store file existed; this write created it.
    Created,
    /// The store existed and was rewritten.
    Updated,
}

impl UpsertOutcome {
    pub fn is_created(self) -> bool {
        matches!(self, UpsertOutcome::Created)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The store file does not exist.
    StoreMissing,
    /// The store exists but has no entry for the site.
    NoMatch(String),
    Match(Record),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    locking: bool,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            locking: true,
        }
    }

    /// Enable or disable the advisory writer lock.
    pub fn with_locking(mut self, enabled: bool) -> Self {
        self.locking = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used for the writer lock (`data.json` -> `data.json.lock`).
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(constants::LOCK_SUFFIX);
        self.path.with_file_name(name)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Insert or overwrite the record for `site`.
    pub fn upsert(
        &self,
        site: &str,
        username: &str,
        password: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        let dir = parent_dir(&self.path);
        vault_fs::ensure_dir(dir, constants::STORE_DIR_MODE)
            .map_err(|source| io_error(dir, source))?;

        let _lock = if self.locking {
            let lock_path = self.lock_path();
            Some(FileLock::exclusive(&lock_path).map_err(|source| io_error(&lock_path, source))?)
        } else {
            None
        };

        let (mut records, outcome) = match self.load()? {
            Some(records) => (records, UpsertOutcome::Updated),
            None => (RecordSet::new(), UpsertOutcome::Created),
        };
        records.insert(site.to_string(), Record::new(username, password));
        self.save(&records)?;
        Ok(outcome)
    }

    pub fn lookup(&self, site: &str) -> Result<LookupResult, StoreError> {
        let Some(mut records) = self.load()? else {
            return Ok(LookupResult::StoreMissing);
        };
        Ok(match records.remove(site) {
            Some(record) => LookupResult::Match(record),
            None => LookupResult::NoMatch(site.to_string()),
        })
    }

    /// Site and username pairs, sorted by site. `None` if the store is missing.
    pub fn sites(&self) -> Result<Option<Vec<(String, String)>>, StoreError> {
        Ok(self.load()?.map(|records| {
            records
                .into_iter()
                .map(|(site, record)| (site, record.username))
                .collect()
        }))
    }

    /// Sites whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Option<Vec<String>>, StoreError> {
        let q = query.to_lowercase();
        Ok(self.load()?.map(|records| {
            records
                .into_keys()
                .filter(|site| site.to_lowercase().contains(&q))
                .collect()
        }))
    }

    /// Read the full record set. `Ok(None)` means the file does not exist.
    pub fn load(&self) -> Result<Option<RecordSet>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, records: &RecordSet) -> Result<(), StoreError> {
        let mut content = serde_json::to_string_pretty(records)?;
        content.push('\n');

        // Rename over the real file, not over a symlink pointing at it.
        let target = self.write_target()?;
        let dir = parent_dir(&target);
        vault_fs::ensure_dir(dir, constants::STORE_DIR_MODE)
            .map_err(|source| io_error(dir, source))?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".passvault-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|source| io_error(dir, source))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| io_error(tmp.path(), source))?;
        vault_fs::set_permissions(tmp.path(), constants::STORE_FILE_MODE)
            .map_err(|source| io_error(tmp.path(), source))?;

        tmp.persist(&target)
            .map_err(|err| io_error(&target, err.error))?;
        Ok(())
    }

    /// File a write lands on. A symlinked store resolves to the file it
    /// points at, including a dangling link whose target does not exist yet.
    fn write_target(&self) -> Result<PathBuf, StoreError> {
        match fs::symlink_metadata(&self.path) {
            Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(&self.path) {
                Ok(target) => Ok(target),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let link = fs::read_link(&self.path)
                        .map_err(|source| io_error(&self.path, source))?;
                    Ok(parent_dir(&self.path).join(link))
                }
                Err(e) => Err(io_error(&self.path, e)),
            },
            _ => Ok(self.path.clone()),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, CredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("data.json"));
        (dir, store)
    }

    #[test]
    fn test_lookup_missing_store() {
        let (_dir, store) = test_store();
        assert_eq!(store.lookup("github.com").unwrap(), LookupResult::StoreMissing);
        assert!(!store.exists());
    }

    #[test]
    fn test_upsert_creates_store() {
        let (_dir, store) = test_store();
        let outcome = store.upsert("github.com", "octo", "s3cret").unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert!(outcome.is_created());
        assert!(store.exists());
        assert_eq!(
            store.lookup("github.com").unwrap(),
            LookupResult::Match(Record::new("octo", "s3cret"))
        );
    }

    #[test]
    fn test_second_upsert_reports_updated() {
        let (_dir, store) = test_store();
        store.upsert("a", "u", "p").unwrap();
        assert_eq!(store.upsert("b", "u", "p").unwrap(), UpsertOutcome::Updated);
    }

    #[test]
    fn test_upsert_overwrites_both_fields() {
        let (_dir, store) = test_store();
        store.upsert("site", "first", "one").unwrap();
        store.upsert("site", "second", "two").unwrap();
        assert_eq!(
            store.lookup("site").unwrap(),
            LookupResult::Match(Record::new("second", "two"))
        );
        assert_eq!(store.load().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_lookup_absent_site_is_no_match() {
        let (_dir, store) = test_store();
        store.upsert("present", "u", "p").unwrap();
        assert_eq!(
            store.lookup("absent").unwrap(),
            LookupResult::NoMatch("absent".to_string())
        );
    }

    #[test]
    fn test_roundtrip_preserves_special_strings() {
        let (_dir, store) = test_store();
        let cases = [
            ("", "", ""),
            ("quote\"site", "{\"user\": [1]}", "pa\\ss\"word}"),
            ("ünïcødé", "tab\tuser", "line\nbreak"),
        ];
        for (site, user, pass) in cases {
            store.upsert(site, user, pass).unwrap();
        }
        for (site, user, pass) in cases {
            assert_eq!(
                store.lookup(site).unwrap(),
                LookupResult::Match(Record::new(user, pass))
            );
        }
    }

    #[test]
    fn test_file_layout_uses_pass_key() {
        let (_dir, store) = test_store();
        store.upsert("github.com", "octo", "s3cret").unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["github.com"]["username"], "octo");
        assert_eq!(value["github.com"]["pass"], "s3cret");
        assert!(raw.contains("\n  \"github.com\""));
    }

    #[test]
    fn test_reads_file_written_elsewhere() {
        let (_dir, store) = test_store();
        fs::write(
            store.path(),
            r#"{"mail": {"username": "me", "pass": "pw"}, "bank": {"username": "x", "pass": "y"}}"#,
        )
        .unwrap();
        assert_eq!(
            store.lookup("mail").unwrap(),
            LookupResult::Match(Record::new("me", "pw"))
        );
        assert_eq!(store.upsert("new", "n", "n").unwrap(), UpsertOutcome::Updated);
        assert_eq!(store.load().unwrap().unwrap().len(), 3);
    }

    #[test]
    fn test_corrupt_store_rejected_and_untouched() {
        let (_dir, store) = test_store();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.lookup("x"), Err(StoreError::Corrupt { .. })));
        assert!(matches!(
            store.upsert("x", "u", "p"),
            Err(StoreError::Corrupt { .. })
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let (_dir, store) = test_store();
        fs::write(store.path(), "").unwrap();
        assert!(matches!(store.lookup("x"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let (_dir, store) = test_store();
        fs::write(store.path(), r#"["github.com"]"#).unwrap();
        assert!(matches!(store.lookup("x"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_store_path_is_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        assert!(matches!(store.lookup("x"), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_upsert_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("vault.json"));
        store.upsert("a", "b", "c").unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (dir, store) = test_store();
        store.upsert("a", "b", "c").unwrap();
        store.upsert("a", "d", "e").unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {:?}", leftovers);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_mode() {
        let (_dir, store) = test_store();
        store.upsert("a", "b", "c").unwrap();
        assert_eq!(vault_fs::mode(store.path()), Some(constants::STORE_FILE_MODE));
    }

    #[test]
    fn test_lock_path_is_sibling() {
        let store = CredentialStore::new("/tmp/vault/data.json");
        assert_eq!(store.lock_path(), PathBuf::from("/tmp/vault/data.json.lock"));
    }

    #[test]
    fn test_locking_creates_lock_file_and_releases_it() {
        let (_dir, store) = test_store();
        store.upsert("a", "b", "c").unwrap();
        assert!(store.lock_path().exists());
        assert!(FileLock::try_exclusive(&store.lock_path()).unwrap().is_some());
    }

    #[test]
    fn test_locking_disabled_skips_lock_file() {
        let (_dir, store) = test_store();
        let store = store.with_locking(false);
        store.upsert("a", "b", "c").unwrap();
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn test_concurrent_writers_keep_every_record() {
        let (_dir, store) = test_store();
        let path = store.path().to_path_buf();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    CredentialStore::new(path)
                        .upsert(&format!("s{}", i), "user", "pass")
                        .unwrap()
                })
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|outcome| outcome.is_created())
            .count();

        let records = store.load().unwrap().unwrap();
        assert_eq!(records.len(), 16);
        assert_eq!(created, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_store_written_through() {
        let (dir, store) = test_store();
        let real = dir.path().join("real.json");
        fs::write(&real, "{}").unwrap();
        std::os::unix::fs::symlink(&real, store.path()).unwrap();

        assert_eq!(store.upsert("a", "b", "c").unwrap(), UpsertOutcome::Updated);

        let link_meta = fs::symlink_metadata(store.path()).unwrap();
        assert!(link_meta.file_type().is_symlink());
        let on_disk: RecordSet = serde_json::from_str(&fs::read_to_string(&real).unwrap()).unwrap();
        assert_eq!(on_disk["a"], Record::new("b", "c"));
        assert_eq!(
            store.lookup("a").unwrap(),
            LookupResult::Match(Record::new("b", "c"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_creates_target() {
        let (dir, store) = test_store();
        std::os::unix::fs::symlink("real.json", store.path()).unwrap();

        assert_eq!(store.lookup("a").unwrap(), LookupResult::StoreMissing);
        assert_eq!(store.upsert("a", "b", "c").unwrap(), UpsertOutcome::Created);

        assert!(fs::symlink_metadata(store.path()).unwrap().file_type().is_symlink());
        assert!(dir.path().join("real.json").is_file());
    }

    #[test]
    fn test_sites_and_search() {
        let (_dir, store) = test_store();
        assert_eq!(store.sites().unwrap(), None);
        assert_eq!(store.search("git").unwrap(), None);

        store.upsert("GitHub", "octo", "p1").unwrap();
        store.upsert("gitlab.com", "fox", "p2").unwrap();
        store.upsert("bank", "me", "p3").unwrap();

        assert_eq!(
            store.sites().unwrap().unwrap(),
            vec![
                ("GitHub".to_string(), "octo".to_string()),
                ("bank".to_string(), "me".to_string()),
                ("gitlab.com".to_string(), "fox".to_string()),
            ]
        );
        assert_eq!(
            store.search("GIT").unwrap().unwrap(),
            vec!["GitHub".to_string(), "gitlab.com".to_string()]
        );
        assert!(store.search("nothing").unwrap().unwrap().is_empty());
    }
}
