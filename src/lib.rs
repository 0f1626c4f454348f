pub mod commands;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod store;
pub mod telegram;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::WatchError;

pub type Result<T> = std::result::Result<T, WatchError>;
