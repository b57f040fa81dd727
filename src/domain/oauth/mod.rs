pub mod broker;
pub mod state;

pub use broker::{
    CallbackRoutes, LoopbackListener, OAuthBroker, OAuthConfig, DEFAULT_AUTH_URL,
    DEFAULT_CALLBACK_PATH, DEFAULT_FLOW_TIMEOUT, DEFAULT_REDIRECT_PORT,
};
pub use state::{CallbackOutcome, OAuthFlowState};
