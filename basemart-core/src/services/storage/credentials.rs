//! Optional API keys kept in a small JSON file.
//!
//! Missing keys are not an error: the explore API then runs anonymously and
//! the social feed falls back to sample casts.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

pub const ZORA_API_KEY: &str = "VITE_ZORA_API_KEY";
pub const FARCASTER_API_KEY: &str = "VITE_FARCASTER_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Could not write {path}: {error}")]
    Write { path: String, error: std::io::Error },
    #[error("Could not encode credentials: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    pub zora_api_key: Option<String>,
    pub farcaster_api_key: Option<String>,
}

impl ApiCredentials {
    pub fn new(zora_api_key: Option<String>, farcaster_api_key: Option<String>) -> Self {
        Self {
            zora_api_key: non_empty(zora_api_key),
            farcaster_api_key: non_empty(farcaster_api_key),
        }
    }

    fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        Self::new(
            entries.get(ZORA_API_KEY).cloned(),
            entries.get(FARCASTER_API_KEY).cloned(),
        )
    }

    fn to_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        if let Some(key) = &self.zora_api_key {
            entries.insert(ZORA_API_KEY.to_string(), key.clone());
        }
        if let Some(key) = &self.farcaster_api_key {
            entries.insert(FARCASTER_API_KEY.to_string(), key.clone());
        }
        entries
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored keys. A missing or unreadable file yields empty
    /// credentials.
    pub async fn load(&self) -> ApiCredentials {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credentials file at {}", self.path.display());
                return ApiCredentials::default();
            }
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return ApiCredentials::default();
            }
        };

        match serde_json::from_slice::<BTreeMap<String, String>>(&raw) {
            Ok(entries) => ApiCredentials::from_entries(&entries),
            Err(e) => {
                warn!("Ignoring malformed credentials file {}: {}", self.path.display(), e);
                ApiCredentials::default()
            }
        }
    }

    pub async fn save(&self, credentials: &ApiCredentials) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(&credentials.to_entries())?;
        fs::write(&self.path, body)
            .await
            .map_err(|error| StorageError::Write {
                path: self.path.display().to_string(),
                error,
            })
    }

    /// Removes the file; clearing an empty store is a no-op.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::Write {
                path: self.path.display().to_string(),
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> CredentialStore {
        CredentialStore::new(std::env::temp_dir().join(format!(
            "basemart-{}-{}.json",
            name,
            std::process::id()
        )))
    }

    #[tokio::test]
    async fn test_round_trip_and_clear() {
        let store = temp_store("credentials");
        let credentials = ApiCredentials::new(Some("zora-key".to_string()), None);

        store.save(&credentials).await.unwrap();
        assert_eq!(store.load().await, credentials);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(ZORA_API_KEY));
        assert!(!raw.contains(FARCASTER_API_KEY));

        store.clear().await.unwrap();
        assert_eq!(store.load().await, ApiCredentials::default());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_treat_malformed_file_as_empty() {
        let store = temp_store("malformed");
        std::fs::write(store.path(), "not json").unwrap();

        assert_eq!(store.load().await, ApiCredentials::default());
        store.clear().await.unwrap();
    }

    #[test]
    fn test_drop_blank_keys() {
        let credentials = ApiCredentials::new(Some("  ".to_string()), Some(" key ".to_string()));
        assert_eq!(credentials.zora_api_key, None);
        assert_eq!(credentials.farcaster_api_key.as_deref(), Some("key"));
    }
}
