pub mod enums;
pub mod error;
pub mod request;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{DataSource, Study, TailInterval};
pub use error::CoreError;
pub use request::{RrgRequest, MAX_SYMBOLS};
pub use structs::DailyBar;
