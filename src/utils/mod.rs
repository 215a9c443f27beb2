pub mod logging;

pub use logging::{log_batch_summary, log_startup, truncate_text};
