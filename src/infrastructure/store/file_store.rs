use super::{StoreError, TokenStore};
use crate::domain::session::Session;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const SESSION_FILE_NAME: &str = "session.json";

/// Session record kept as a JSON file in the application-data directory.
///
/// Writes go to a sibling temp file that is then renamed over the record, so
/// a reader sees either the old session or the new one. A record that no
/// longer parses is deleted and reported as absent. On Unix the record is
/// readable by its owner only.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    async fn remove_file(&self, path: &Path) -> Result<(), StoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_record(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the record only if it still fails to parse once writers are
    /// locked out; a session saved in the meantime is returned instead.
    async fn discard_if_corrupt(&self) -> Result<Option<Session>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let Some(bytes) = self.read_record().await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable session record"
                );
                self.remove_file(&self.path).await?;
                Ok(None)
            }
        }
    }

    async fn write_private(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        // A leftover temp file would keep its old permissions
        self.remove_file(path).await?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(bytes) = self.read_record().await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(_) => self.discard_if_corrupt().await,
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(session)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        self.write_private(&temp_path, &encoded).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Session record written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.remove_file(&self.path).await
    }
}
