// Handler modules
pub mod deploy;
pub mod generate;
pub mod import;

// Re-export all handler functions
pub use deploy::{handle_cleanup, handle_destroy, handle_plan, handle_status};
pub use generate::handle_generate;
pub use import::{ImportCommand, handle_import};
