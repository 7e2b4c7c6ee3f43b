//! Users collection persisted as one JSON document.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;
mod time_format;

pub use config::UsersInfoConfig;
pub use module::UsersInfo;
