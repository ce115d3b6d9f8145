//! Output module for item records, console output and progress.
//!
//! Provides:
//! - JSON-lines item sink
//! - Colored stderr console output
//! - Progress spinner
//! - Summary reporting

pub mod console;
pub mod progress;
pub mod sink;
pub mod stats;

pub use console::{
    print_api_error_message, print_config_summary, print_error, print_info, print_success,
    print_warning,
};
pub use progress::{create_spinner, ProgressSink};
pub use sink::{ItemSink, JsonLinesSink};
pub use stats::print_crawl_summary;
