//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    format_duration, format_file_size, format_number, format_subscriber_count, format_time_ago,
    format_view_count, truncate_string,
};
