//! File-per-key backend.
//!
//! [`FileBackend`] stores each key in its own file inside one directory:
//!
//! ```text
//! <directory>/<hex(key)>.<extension>
//!
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (codec-encoded value)]
//! ```
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so readers see either the old or the new contents and
//! never a partial write. A checksum mismatch on read is reported as
//! [`BackendError::Corrupt`]. The directory is created on open if it does not
//! exist yet.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use polykv_codec::Codec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BackendError, StoreError, StoreResult};
use crate::handle::StoreHandle;
use crate::traits::Backend;

const NAME: &str = "file";

/// Longest file name most filesystems accept, in bytes.
const FILE_NAME_MAX: usize = 255;

const MAX_EXTENSION_LEN: usize = 16;

/// Header size: 4 bytes CRC.
const HEADER_SIZE: usize = 4;

const TEMP_PREFIX: &str = ".polykv-";
const TEMP_SUFFIX: &str = ".tmp";

/// Temp files older than this are leftovers from an interrupted write.
const STALE_TEMP_AGE: Duration = Duration::from_secs(60);

/// Options for a file-backed store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Directory holding one file per key. Created if missing.
    pub directory: PathBuf,
    /// File extension for value files (ASCII alphanumeric, no dot).
    pub extension: String,
    /// Value encoding.
    pub codec: Codec,
    /// `fsync` each value file before it replaces the previous one.
    pub sync: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("polykv-data"),
            extension: "kv".into(),
            codec: Codec::default(),
            sync: false,
        }
    }
}

/// A store handle over a [`FileBackend`].
pub type FileStore = StoreHandle<FileBackend>;

/// Open (or create) a file-backed store.
pub fn open(options: FileOptions) -> StoreResult<FileStore> {
    let backend = FileBackend::open(&options)?;
    Ok(StoreHandle::new(backend, options.codec))
}

/// Directory-of-files backend.
pub struct FileBackend {
    dir: PathBuf,
    extension: String,
    sync: bool,
    max_key_len: usize,
    closed: AtomicBool,
}

impl FileBackend {
    /// Open the backend, creating its directory if necessary.
    pub fn open(options: &FileOptions) -> StoreResult<Self> {
        validate_extension(&options.extension)?;
        if options.directory.as_os_str().is_empty() {
            return Err(StoreError::Config("file store directory must not be empty".into()));
        }

        let dir = options.directory.clone();
        fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(StoreError::Config(format!(
                "file store path {} is not a directory",
                dir.display()
            )));
        }

        let removed = remove_stale_temp_files(&dir)?;
        if removed > 0 {
            warn!(dir = %dir.display(), removed, "removed leftover temp files");
        }

        // Hex doubles the key, plus the dot and the extension.
        let max_key_len = (FILE_NAME_MAX - 1 - options.extension.len()) / 2;
        debug!(dir = %dir.display(), max_key_len, "file backend opened");

        Ok(Self {
            dir,
            extension: options.extension.clone(),
            sync: options.sync,
            max_key_len,
            closed: AtomicBool::new(false),
        })
    }

    /// The directory values are stored in.
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Sorted list of stored keys.
    ///
    /// Files that do not carry this backend's extension or whose names are
    /// not hex-encoded keys are ignored.
    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        self.ensure_open()?;
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match hex::decode(stem).ok().and_then(|raw| String::from_utf8(raw).ok()) {
                Some(key) => keys.push(key),
                None => debug!(path = %path.display(), "skipping foreign file"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hex::encode(key.as_bytes()), self.extension))
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed { backend: NAME });
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_key_len(&self) -> Option<usize> {
        Some(self.max_key_len)
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        self.ensure_open()?;
        let crc = crc32fast::hash(&data);

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)?;
        tmp.write_all(&crc.to_le_bytes())?;
        tmp.write_all(&data)?;
        if self.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        unframe(key, bytes).map(Some)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.ensure_open()?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) -> Result<(), BackendError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(dir = %self.dir.display(), "file backend closed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("dir", &self.dir)
            .field("extension", &self.extension)
            .field("sync", &self.sync)
            .finish()
    }
}

/// Split a value file into its payload, verifying the checksum.
fn unframe(key: &str, mut bytes: Vec<u8>) -> Result<Vec<u8>, BackendError> {
    if bytes.len() < HEADER_SIZE {
        return Err(BackendError::Corrupt {
            key: key.to_string(),
            reason: format!("file is {} bytes, shorter than its header", bytes.len()),
        });
    }
    let expected = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let payload = bytes.split_off(HEADER_SIZE);
    let actual = crc32fast::hash(&payload);
    if actual != expected {
        return Err(BackendError::Corrupt {
            key: key.to_string(),
            reason: format!("checksum mismatch: expected {expected:#010x}, computed {actual:#010x}"),
        });
    }
    Ok(payload)
}

fn validate_extension(extension: &str) -> StoreResult<()> {
    if extension.is_empty()
        || extension.len() > MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(StoreError::Config(format!(
            "file extension {extension:?} must be 1-{MAX_EXTENSION_LEN} ASCII letters or digits"
        )));
    }
    Ok(())
}

/// Delete temp files left behind by writes that never completed.
fn remove_stale_temp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
            continue;
        }
        let age = entry
            .metadata()?
            .modified()?
            .elapsed()
            .unwrap_or_default();
        if age < STALE_TEMP_AGE {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::SystemTime;

    use super::*;

    fn options(dir: &Path) -> FileOptions {
        FileOptions {
            directory: dir.to_path_buf(),
            ..FileOptions::default()
        }
    }

    fn temp_backend() -> (tempfile::TempDir, FileBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(&options(dir.path())).unwrap();
        (dir, backend)
    }

    #[test]
    fn creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b").join("store");
        assert!(!nested.exists());

        let backend = FileBackend::open(&options(&nested)).unwrap();
        assert!(nested.is_dir());
        backend.put("foo", b"bar".to_vec()).unwrap();
        assert_eq!(backend.fetch("foo").unwrap(), Some(b"bar".to_vec()));
    }

    #[test]
    fn put_fetch_remove() {
        let (_dir, backend) = temp_backend();
        assert_eq!(backend.fetch("k").unwrap(), None);

        backend.put("k", b"v1".to_vec()).unwrap();
        backend.put("k", b"v2".to_vec()).unwrap();
        assert_eq!(backend.fetch("k").unwrap(), Some(b"v2".to_vec()));

        backend.remove("k").unwrap();
        assert_eq!(backend.fetch("k").unwrap(), None);
        backend.remove("k").unwrap();
    }

    #[test]
    fn empty_payload_round_trips() {
        let (_dir, backend) = temp_backend();
        backend.put("empty", Vec::new()).unwrap();
        assert_eq!(backend.fetch("empty").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn file_layout() {
        let (dir, backend) = temp_backend();
        backend.put("foo", b"bar".to_vec()).unwrap();

        let path = dir.path().join("666f6f.kv");
        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..4], &crc32fast::hash(b"bar").to_le_bytes());
        assert_eq!(&raw[4..], b"bar");
    }

    #[test]
    fn path_like_keys_stay_inside_directory() {
        let (dir, backend) = temp_backend();
        backend.put("../escape", b"x".to_vec()).unwrap();
        backend.put("a/b", b"y".to_vec()).unwrap();

        assert!(!dir.path().parent().unwrap().join("escape").exists());
        assert_eq!(backend.keys().unwrap(), vec!["../escape", "a/b"]);
    }

    #[test]
    fn detects_corruption() {
        let (dir, backend) = temp_backend();
        backend.put("foo", b"bar".to_vec()).unwrap();

        let path = dir.path().join("666f6f.kv");
        let mut raw = fs::read(&path).unwrap();
        raw[5] ^= 0xff;
        fs::write(&path, raw).unwrap();

        let err = backend.fetch("foo").unwrap_err();
        assert!(matches!(err, BackendError::Corrupt { ref key, .. } if key == "foo"));
    }

    #[test]
    fn detects_truncation() {
        let (dir, backend) = temp_backend();
        fs::write(dir.path().join("666f6f.kv"), [1, 2]).unwrap();
        assert!(matches!(backend.fetch("foo"), Err(BackendError::Corrupt { .. })));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = FileBackend::open(&options(dir.path())).unwrap();
            backend.put("persist", b"me".to_vec()).unwrap();
            backend.close().unwrap();
        }
        let backend = FileBackend::open(&options(dir.path())).unwrap();
        assert_eq!(backend.fetch("persist").unwrap(), Some(b"me".to_vec()));
    }

    #[test]
    fn extension_separates_stores() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileBackend::open(&options(dir.path())).unwrap();
        let b = FileBackend::open(&FileOptions {
            extension: "other".into(),
            ..options(dir.path())
        })
        .unwrap();

        a.put("k", b"a".to_vec()).unwrap();
        assert_eq!(b.fetch("k").unwrap(), None);
        assert_eq!(b.keys().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn key_limit_follows_extension() {
        let (_dir, backend) = temp_backend();
        assert_eq!(backend.max_key_len(), Some(126));

        let longest = "k".repeat(126);
        backend.put(&longest, b"fits".to_vec()).unwrap();
        assert_eq!(backend.fetch(&longest).unwrap(), Some(b"fits".to_vec()));
    }

    #[test]
    fn rejects_bad_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["", ".kv", "a/b", "waytoolongextension"] {
            let opts = FileOptions {
                extension: ext.into(),
                ..options(dir.path())
            };
            assert!(
                matches!(FileBackend::open(&opts), Err(StoreError::Config(_))),
                "extension {ext:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_file_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"").unwrap();
        assert!(FileBackend::open(&options(&file)).is_err());
    }

    #[test]
    fn removes_only_stale_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join(".polykv-stale.tmp");
        let fresh = dir.path().join(".polykv-fresh.tmp");
        File::create(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        File::create(&fresh).unwrap();

        FileBackend::open(&options(dir.path())).unwrap();
        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn closed_backend_rejects_operations() {
        let (_dir, backend) = temp_backend();
        backend.close().unwrap();
        assert!(matches!(backend.put("k", vec![]), Err(BackendError::Closed { .. })));
        assert!(matches!(backend.fetch("k"), Err(BackendError::Closed { .. })));
        assert!(matches!(backend.remove("k"), Err(BackendError::Closed { .. })));
        backend.close().unwrap();
    }

    #[test]
    fn open_binds_codec() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(FileOptions {
            codec: Codec::Bincode,
            ..options(dir.path())
        })
        .unwrap();
        assert_eq!(store.codec(), Codec::Bincode);
        assert_eq!(store.backend().directory(), dir.path());
    }
}
