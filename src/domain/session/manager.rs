use super::jwt::decode_expiry;
use super::model::{Session, UserProfile};
use crate::error::AppResult;
use crate::infrastructure::store::TokenStore;
use chrono::Utc;
use std::sync::Arc;

/// Sole in-process gateway to the persisted session.
///
/// Expiry is enforced lazily: every read checks `expires_at` against the
/// clock and clears a stale session before reporting it as absent.
pub struct AuthSessionManager {
    store: Arc<dyn TokenStore>,
}

impl AuthSessionManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Persist a freshly issued token together with its user
    pub async fn save(&self, token: &str, user: UserProfile) -> AppResult<()> {
        let expires_at = decode_expiry(token)?;
        let session = Session {
            token: token.to_string(),
            expires_at,
            user,
        };

        self.store.save(&session).await?;

        tracing::info!(
            email = %session.user.email,
            expires_at = %session.expires_at,
            "Session saved"
        );
        Ok(())
    }

    /// Current session, or `None` after clearing an expired one
    pub async fn get_session(&self) -> AppResult<Option<Session>> {
        match self.store.load().await? {
            Some(session) if session.is_live_at(Utc::now()) => Ok(Some(session)),
            Some(session) => {
                tracing::info!(
                    expired_at = %session.expires_at,
                    "Stored session expired, clearing"
                );
                self.clear().await?;
                Ok(None)
            }
            None => {
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn get_token(&self) -> AppResult<Option<String>> {
        Ok(self.get_session().await?.map(|session| session.token))
    }

    pub async fn is_authenticated(&self) -> AppResult<bool> {
        Ok(self.get_token().await?.is_some())
    }

    pub async fn get_user(&self) -> AppResult<Option<UserProfile>> {
        Ok(self.store.load().await?.map(|session| session.user))
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.store.clear().await?;
        Ok(())
    }
}
