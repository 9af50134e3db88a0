//! File-backed key-value store.
//!
//! Each key is stored as `<dir>/<escaped key>.json`. Writes go to a
//! sibling temp file that is renamed into place while an exclusive `fs2`
//! lock is held on `<escaped key>.lock`, so readers never see a torn
//! value.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;

use super::{KeyValueStore, PersistenceError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn lock_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", file_stem(key)))
    }
}

/// Map an arbitrary key onto a portable file name.
///
/// ASCII alphanumerics and `-` pass through; every other byte becomes
/// `_XX` (upper-case hex). `_` is always escaped, so distinct keys never
/// share a file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    stem
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn open_lock(path: &Path) -> Result<File, PersistenceError> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(io_error(path))
}

fn read_value(path: &Path, lock_path: &Path) -> Result<Option<String>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let lock = open_lock(lock_path)?;
    FileExt::lock_shared(&lock).map_err(io_error(lock_path))?;
    let result = match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path)(e)),
    };
    let _ = FileExt::unlock(&lock);
    result
}

fn write_value(
    dir: &Path,
    path: &Path,
    lock_path: &Path,
    value: &str,
) -> Result<(), PersistenceError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let lock = open_lock(lock_path)?;
    FileExt::lock_exclusive(&lock).map_err(io_error(lock_path))?;

    let result = replace_file(path, value);
    let _ = FileExt::unlock(&lock);
    result
}

fn replace_file(path: &Path, value: &str) -> Result<(), PersistenceError> {
    let tmp_path = path.with_extension("json.tmp");
    let mut tmp = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
    tmp.write_all(value.as_bytes())
        .map_err(io_error(&tmp_path))?;
    tmp.sync_all().map_err(io_error(&tmp_path))?;
    fs::rename(&tmp_path, path).map_err(io_error(path))
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        let lock_path = self.lock_path_for(key);
        tokio::task::spawn_blocking(move || read_value(&path, &lock_path))
            .await
            .map_err(|e| PersistenceError::Unavailable {
                reason: format!("file read task failed: {e}"),
            })?
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let lock_path = self.lock_path_for(key);
        tokio::task::spawn_blocking(move || write_value(&dir, &path, &lock_path, &value))
            .await
            .map_err(|e| PersistenceError::Unavailable {
                reason: format!("file write task failed: {e}"),
            })?
    }
}
