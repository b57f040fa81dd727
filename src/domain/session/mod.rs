pub mod jwt;
pub mod manager;
pub mod model;

pub use jwt::{decode_expiry, ExpiryClaims};
pub use manager::AuthSessionManager;
pub use model::{Session, UserProfile};
