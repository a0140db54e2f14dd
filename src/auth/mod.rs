use std::{fmt, path::PathBuf, sync::Arc};

use crate::errors::{Result, SlopError};
use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

/// An API key. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// User-managed secret storage.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>>;

    async fn set(&self, secret: &str) -> Result<()>;

    async fn delete(&self) -> Result<()>;

    async fn has(&self) -> Result<bool> {
        Ok(self
            .get()
            .await?
            .is_some_and(|secret| !secret.trim().is_empty()))
    }
}

/// Keeps the secret in a single file readable only by the owner.
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(SlopError::InvalidInput("API key must not be empty".to_string()));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        file.write_all(secret.as_bytes()).await?;
        file.flush().await?;

        debug!(target: "credentials", path = %self.path.display(), "api key stored");
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Picks the credential for outbound calls: the stored secret first, then
/// the environment default. Queried on every remote operation.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    fallback: Option<String>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn SecretStore>, fallback: Option<String>) -> Self {
        Self { store, fallback }
    }

    pub async fn resolve(&self) -> Result<Credential> {
        if let Some(secret) = self.store.get().await? {
            let secret = secret.trim();
            if !secret.is_empty() {
                debug!(target: "credentials", source = "secret_store", "credential resolved");
                return Ok(Credential::new(secret));
            }
        }

        if let Some(secret) = self.fallback.as_deref().map(str::trim) {
            if !secret.is_empty() {
                debug!(target: "credentials", source = "environment", "credential resolved");
                return Ok(Credential::new(secret));
            }
        }

        Err(SlopError::NoCredential)
    }
}
