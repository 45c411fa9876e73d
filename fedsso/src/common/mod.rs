pub mod config;
pub mod types;

// Re-export everything for easy access
pub use config::*;
pub use types::*;
