//! The scan driver: block range in, snapshots out.

mod driver;

pub use driver::{FetchOutcome, RetryPolicy, ScanConfig, ScanDriver, ScanReport};
