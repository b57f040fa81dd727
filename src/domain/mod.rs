pub mod capture;
pub mod oauth;
pub mod session;
