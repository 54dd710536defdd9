pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod progress;
pub mod render;
pub mod session;
pub mod terminal;
