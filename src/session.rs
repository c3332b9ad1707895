//! Session identity read from the device's key-value storage.
//!
//! The identity is read once when a screen mounts and passed into the
//! listing core explicitly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const USER_ID_KEY: &str = "userId";
pub const ROLE_KEY: &str = "rol";

/// Persistent string key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value storage kept as one JSON object on disk
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed key-value file {}", self.path.display()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&items)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Process-local key-value storage
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Role of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Member(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        if raw == "Admin" {
            Role::Admin
        } else {
            Role::Member(raw.to_string())
        }
    }
}

/// Current user's identity. An empty user id means "no user".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Option<Role>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Read the identity from storage. Missing keys and storage failures are
    /// logged and yield an empty identity.
    pub async fn load(store: &dyn KeyValueStore) -> Self {
        let user_id = match store.get_item(USER_ID_KEY).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!("No stored {} found, continuing without a user", USER_ID_KEY);
                String::new()
            }
            Err(err) => {
                warn!("Failed to read {} from storage: {:#}", USER_ID_KEY, err);
                String::new()
            }
        };

        let role = match store.get_item(ROLE_KEY).await {
            Ok(value) => value.map(|raw| Role::parse(&raw)),
            Err(err) => {
                warn!("Failed to read {} from storage: {:#}", ROLE_KEY, err);
                None
            }
        };

        debug!("Session loaded: user={:?} role={:?}", user_id, role);
        Self { user_id, role }
    }

    pub fn is_known(&self) -> bool {
        !self.user_id.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Some(Role::Admin))
    }

    /// Whether this session belongs to the given owner id
    pub fn owns(&self, owner_id: &str) -> bool {
        self.is_known() && self.user_id == owner_id
    }
}
