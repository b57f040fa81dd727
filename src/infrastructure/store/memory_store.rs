use super::{StoreError, TokenStore};
use crate::domain::session::Session;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store, lost on exit
#[derive(Default)]
pub struct InMemoryTokenStore {
    session: RwLock<Option<Session>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.session.write().await = None;
        Ok(())
    }
}
