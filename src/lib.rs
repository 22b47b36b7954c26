//! ESP-IDF partition table generator for layouts with two equally sized OTA
//! app slots.
//!
//! A [`FlashLayout`] fixes the sizes of the NVS, OTA data and filesystem
//! regions. [`FlashLayout::compute_plan`] splits the remaining flash evenly
//! between `app0` and `app1`, and [`PartitionPlan::to_csv`] renders the table
//! consumed by the ESP-IDF build and flashing tools.
//!
//! ```
//! use esp_partition_gen::FlashLayout;
//!
//! let plan = FlashLayout::default().compute_plan().unwrap();
//! assert_eq!(plan.app_slot_size, 0x1e8000);
//! print!("{}", plan.to_csv().unwrap());
//! ```

pub mod error;
pub mod layout;
pub mod partition;
pub mod plan;

mod csv;

use std::fs;
use std::path::Path;

pub use error::Error;
pub use layout::{
    FlashLayout,
    NVS_REQUIRED_SIZE,
};
pub use partition::{
    format_hex,
    parse_size,
    PartitionEntry,
    PartitionType,
    SubType,
};
pub use plan::PartitionPlan;

/// The rows of an existing partition table, read back from CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    /// Rows in file order.
    pub entries: Vec<PartitionEntry>,
}

impl PartitionTable {
    /// Parse partition table CSV content from a string.
    pub fn from_csv(content: &str) -> Result<Self, Error> {
        csv::parser::parse_csv(content)
    }

    /// Parse the partition table CSV file at the given `path`.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        csv::parser::parse_csv(&content)
    }

    /// Whether this table has exactly the rows `plan` would generate.
    pub fn matches(&self, plan: &PartitionPlan) -> bool {
        self.entries == plan.entries()
    }
}
