use super::jar::CookieJar;
use crate::Result;
use crate::error::CurlwrapError;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

const COOKIE_EXTENSION: &str = "cookie";
/// Cached cookies older than this are treated as missing.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Storage for per-site cookie jars.
pub trait CookieStore {
    /// Cached jar for `key`, or `None` when missing or stale.
    fn load(&self, key: &str) -> Result<Option<CookieJar>>;

    /// Overwrite the cached jar for `key`.
    fn save(&self, key: &str, jar: &CookieJar) -> Result<()>;

    /// Drop the cached jar for `key`. Missing entries are not an error.
    fn clear(&self, key: &str) -> Result<()>;
}

impl<S: CookieStore + ?Sized> CookieStore for &S {
    fn load(&self, key: &str) -> Result<Option<CookieJar>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, jar: &CookieJar) -> Result<()> {
        (**self).save(key, jar)
    }

    fn clear(&self, key: &str) -> Result<()> {
        (**self).clear(key)
    }
}

/// On-disk record, one file per key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredJar {
    key: String,
    saved_at: DateTime<Utc>,
    cookies: CookieJar,
}

/// True while a file modified at `modified` is younger than `max_age`.
/// Modification times in the future count as fresh.
pub fn is_fresh(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age < max_age,
        Err(_) => true,
    }
}

pub struct FileCookieStore {
    dir: PathBuf,
    max_age: Duration,
}

impl FileCookieStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, COOKIE_EXTENSION))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(CurlwrapError::IoError)?;
        }
        Ok(())
    }

    fn read_record(path: &Path) -> Result<StoredJar> {
        let file = fs::File::open(path).map_err(CurlwrapError::IoError)?;
        file.lock_shared().map_err(CurlwrapError::IoError)?;
        let record = serde_json::from_reader(&file)?;
        // Unlock on drop
        Ok(record)
    }
}

impl CookieStore for FileCookieStore {
    fn load(&self, key: &str) -> Result<Option<CookieJar>> {
        let path = self.path_for(key);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cookie file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(CurlwrapError::IoError(e)),
        };

        let modified = metadata.modified().map_err(CurlwrapError::IoError)?;
        if !is_fresh(modified, SystemTime::now(), self.max_age) {
            info!("Cookie for {} is more than a day old. Will get new one", key);
            return Ok(None);
        }

        match Self::read_record(&path) {
            Ok(record) if record.cookies.is_empty() => Ok(None),
            Ok(record) => {
                info!("Cookie for {} loaded from disk", key);
                Ok(Some(record.cookies))
            }
            Err(CurlwrapError::JsonError(e)) => {
                warn!("Ignoring unreadable cookie file {}: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, jar: &CookieJar) -> Result<()> {
        self.ensure_dir()?;
        let record = StoredJar {
            key: key.to_string(),
            saved_at: Utc::now(),
            cookies: jar.clone(),
        };
        let json = serde_json::to_string(&record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path_for(key))
            .map_err(CurlwrapError::IoError)?;

        // Truncate under the lock so a reader never sees half a record
        file.lock_exclusive().map_err(CurlwrapError::IoError)?;
        file.set_len(0).map_err(CurlwrapError::IoError)?;
        file.write_all(json.as_bytes())
            .map_err(CurlwrapError::IoError)?;
        file.flush().map_err(CurlwrapError::IoError)?;
        drop(file);

        info!("Cookie for {} saved", key);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CurlwrapError::IoError(e)),
        }
    }
}

/// In-process store, nothing touches the filesystem.
#[derive(Default)]
pub struct MemoryCookieStore {
    jars: Mutex<HashMap<String, CookieJar>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn load(&self, key: &str) -> Result<Option<CookieJar>> {
        let jars = self
            .jars
            .lock()
            .map_err(|e| CurlwrapError::Other(e.to_string()))?;
        Ok(jars.get(key).filter(|jar| !jar.is_empty()).cloned())
    }

    fn save(&self, key: &str, jar: &CookieJar) -> Result<()> {
        self.jars
            .lock()
            .map_err(|e| CurlwrapError::Other(e.to_string()))?
            .insert(key.to_string(), jar.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.jars
            .lock()
            .map_err(|e| CurlwrapError::Other(e.to_string()))?
            .remove(key);
        Ok(())
    }
}
