// Handler modules
pub mod lint;

// Re-export all handler functions
pub use lint::{handle_lint, handle_rules};
