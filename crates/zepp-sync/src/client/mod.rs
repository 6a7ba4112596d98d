pub mod api;
pub mod auth;

pub use api::{EventWindow, ZeppClient};
pub use auth::{AuthClient, Session};
