use std::fs;
use std::path::Path;

use log::{
    debug,
    warn,
};
use serde::{
    Deserialize,
    Deserializer,
};

use crate::error::Error;
use crate::partition::parse_size;
use crate::plan::PartitionPlan;

/// Combined NVS size the ESP32 bootloader expects. Other sizes make the
/// device bootloop.
pub const NVS_REQUIRED_SIZE: u32 = 0x5000;

/// Fixed region sizes for a target flash chip. The two OTA app slots split
/// whatever is left.
///
/// All values are in bytes. [`FlashLayout::default`] is the 4 MiB reference
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlashLayout {
    /// Offset of the NVS partition, the first managed region.
    #[serde(deserialize_with = "deserialize_size")]
    pub start: u32,
    /// System part of the NVS partition.
    #[serde(deserialize_with = "deserialize_size")]
    pub nvs_system_size: u32,
    /// User part of the NVS partition.
    #[serde(deserialize_with = "deserialize_size")]
    pub nvs_user_size: u32,
    #[serde(deserialize_with = "deserialize_size")]
    pub ota_data_size: u32,
    #[serde(deserialize_with = "deserialize_size")]
    pub filesystem_size: u32,
    #[serde(deserialize_with = "deserialize_size")]
    pub total_flash_size: u32,
}

impl FlashLayout {
    /// 4 MiB flash, 20 KiB NVS at `0x9000`, 8 KiB OTA data, 128 KiB SPIFFS.
    pub const REFERENCE: Self = Self {
        start: 0x9000,
        nvs_system_size: 0x3000,
        nvs_user_size: 0x2000,
        ota_data_size: 0x2000,
        filesystem_size: 128 * 1024,
        total_flash_size: 0x400000,
    };

    /// Parse a layout from TOML. Missing keys keep their reference value.
    ///
    /// Sizes can be TOML integers or strings in [`parse_size`] syntax:
    ///
    /// ```toml
    /// total_flash_size = "8M"
    /// filesystem_size = 0x80000
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    /// Load a layout from a TOML file at the given `path`.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Size of the single NVS partition holding both NVS parts.
    pub fn nvs_size(&self) -> u64 {
        u64::from(self.nvs_system_size) + u64::from(self.nvs_user_size)
    }

    /// Bytes taken by everything except the app slots, including the
    /// unmanaged space below `start`.
    pub fn reserved(&self) -> u64 {
        u64::from(self.start)
            + self.nvs_size()
            + u64::from(self.ota_data_size)
            + u64::from(self.filesystem_size)
    }

    /// Compute the partition plan, sizing both app slots equally from the
    /// space left after the reserved regions.
    ///
    /// Fails with [`Error::Configuration`] unless each slot gets at least one
    /// byte. Slot sizing rounds down, so an odd remainder leaves one byte
    /// unallocated.
    pub fn compute_plan(&self) -> Result<PartitionPlan, Error> {
        let nvs_size = self.nvs_size();
        if nvs_size != u64::from(NVS_REQUIRED_SIZE) {
            warn!(
                "NVS size {:#x} differs from the {:#x} the bootloader expects",
                nvs_size, NVS_REQUIRED_SIZE
            );
        }

        let reserved = self.reserved();
        let total = u64::from(self.total_flash_size);
        if reserved + 2 > total {
            return Err(Error::Configuration {
                reserved,
                total: self.total_flash_size,
                shortfall: reserved + 2 - total,
            });
        }

        let remaining = total - reserved;
        if remaining % 2 != 0 {
            warn!(
                "{:#x} bytes left for the app slots is odd, one byte stays unallocated",
                remaining
            );
        }

        // remaining <= total_flash_size, so half of it fits in u32
        let app_slot_size = (remaining / 2) as u32;
        debug!(
            "reserved {:#x} of {:#x} bytes, app slots {:#x} bytes each",
            reserved, total, app_slot_size
        );

        Ok(PartitionPlan {
            start: self.start,
            // nvs_size <= reserved < total_flash_size
            nvs_size: nvs_size as u32,
            nvs_user_size: self.nvs_user_size,
            ota_data_size: self.ota_data_size,
            app_slot_size,
            filesystem_size: self.filesystem_size,
            total_flash_size: self.total_flash_size,
        })
    }
}

impl Default for FlashLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

fn deserialize_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Int(u32),
        Text(String),
    }

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Int(v) => Ok(v),
        SizeValue::Text(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}
