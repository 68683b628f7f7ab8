pub mod types;

// Re-export common types
pub use types::*;
