use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::token::Session;

/// Storage abstraction for the persisted session.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Result<Option<Session>, StoreError>;
    fn write(&self, session: &Session) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
    pub profile: String,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            profile: "default".to_string(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn default_dir() -> PathBuf {
        default_authflight_dir()
    }
}

/// File-backed token store using one TOML file per profile.
///
/// # Example
/// ```no_run
/// use authflight::auth::{FileTokenStore, Session, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// store.write(&Session::new("access", "refresh"))?;
/// # Ok::<(), authflight::auth::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    profile: String,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        let profile = normalize_label(&config.profile);
        Self {
            path: config.base_dir.join(format!("{profile}.toml")),
            profile,
        }
    }

    pub fn new_default() -> Self {
        Self::new(TokenStoreConfig::new(default_authflight_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Result<Option<Session>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        if file.version != SESSION_FILE_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported session file version {}",
                file.version
            )));
        }
        Ok(Some(file.session))
    }

    fn write(&self, session: &Session) -> Result<(), StoreError> {
        Self::ensure_parent(&self.path)?;
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            profile: self.profile.clone(),
            session: session.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Session>>, StoreError> {
        self.session
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot()?.clone())
    }

    fn write(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot()? = None;
        Ok(())
    }
}

const SESSION_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    profile: String,
    session: Session,
    saved_at: DateTime<Utc>,
}

fn default_authflight_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".authflight"))
        .unwrap_or_else(|| PathBuf::from(".authflight"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
