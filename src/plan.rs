use std::io::Write;
use std::path::Path;

use crate::error::Error;
use crate::partition::{
    PartitionEntry,
    SubType,
};

/// A computed partition layout, produced by
/// [`FlashLayout::compute_plan`](crate::FlashLayout::compute_plan).
///
/// Only `start` is placed explicitly. The flashing tool assigns the other
/// offsets back to back in row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Offset of the NVS partition.
    pub start: u32,
    /// Size of the NVS partition (system plus user part).
    pub nvs_size: u32,
    /// User part of the NVS partition, reported in the header.
    pub nvs_user_size: u32,
    pub ota_data_size: u32,
    /// Size shared by both app slots.
    pub app_slot_size: u32,
    pub filesystem_size: u32,
    pub total_flash_size: u32,
}

impl PartitionPlan {
    /// The table rows in flash order: `nvs`, `otadata`, `app0`, `app1`,
    /// `spiffs`.
    pub fn entries(&self) -> Vec<PartitionEntry> {
        vec![
            PartitionEntry::new("nvs", SubType::Nvs, Some(self.start), self.nvs_size),
            PartitionEntry::new("otadata", SubType::Ota, None, self.ota_data_size),
            PartitionEntry::new("app0", SubType::Ota0, None, self.app_slot_size),
            PartitionEntry::new("app1", SubType::Ota1, None, self.app_slot_size),
            PartitionEntry::new("spiffs", SubType::Spiffs, None, self.filesystem_size),
        ]
    }

    /// End of the last partition. Never exceeds `total_flash_size`.
    pub fn total_used(&self) -> u64 {
        u64::from(self.start)
            + u64::from(self.nvs_size)
            + u64::from(self.ota_data_size)
            + 2 * u64::from(self.app_slot_size)
            + u64::from(self.filesystem_size)
    }

    /// Flash bytes past the last partition, at most one.
    pub fn unallocated(&self) -> u64 {
        u64::from(self.total_flash_size).saturating_sub(self.total_used())
    }

    // Header sizes are truncated to whole KiB.

    pub fn app_slot_kib(&self) -> u32 {
        self.app_slot_size / 1024
    }

    pub fn filesystem_kib(&self) -> u32 {
        self.filesystem_size / 1024
    }

    pub fn nvs_user_kib(&self) -> u32 {
        self.nvs_user_size / 1024
    }

    /// Render the partition table and return it as a `String`.
    pub fn to_csv(&self) -> Result<String, Error> {
        crate::csv::writer::write_csv_content(self)
    }

    /// Render the partition table into `writer`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        crate::csv::writer::write_csv(self, writer)
    }

    /// Render the partition table to a file at the given `path`.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}
