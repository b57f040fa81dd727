pub mod file_store;
pub mod memory_store;

pub use file_store::FileTokenStore;
pub use memory_store::InMemoryTokenStore;

use crate::domain::session::Session;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for the single local session record.
///
/// Only [`AuthSessionManager`](crate::domain::session::AuthSessionManager)
/// talks to a store. Implementations must make `save` and `clear` replace or
/// remove the whole record in one step so no partial session is observable.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Replace the stored session
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove token, expiry and user together
    async fn clear(&self) -> Result<(), StoreError>;
}
