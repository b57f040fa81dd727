use crate::domain::session::UserProfile;
use serde::{Deserialize, Serialize};

/// Body of POST /auth/login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

/// Successful POST /auth/login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Result of exchanging an authorization code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    pub user: UserProfile,
}

impl From<LoginResponse> for LoginResult {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}
