pub mod bridge;
pub mod oauth_callback;
