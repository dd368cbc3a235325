//! HTTP surface.

mod actions;
mod error;
mod info;
mod logs;
pub mod server;

pub use error::ApiError;
