//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;
pub mod scan;
pub mod utils;

// Re-export main command functions
pub use inspect::{execute_inspect, render_inspection};
pub use models::{InspectArgs, ScanArgs};
pub use scan::{execute_scan, validate_args};
pub use utils::display_version;
