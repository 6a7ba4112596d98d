pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod sink;
pub mod sync;

pub use error::{Result, ZeppError};
