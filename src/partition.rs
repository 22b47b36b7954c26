use std::fmt;

use crate::error::Error;

/// Top-level partition type, the `Type` column of the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum PartitionType {
    App,
    Data,
}

/// Partition subtype, the `SubType` column of the table.
///
/// Only the subtypes this generator lays out are known. Each one belongs to
/// exactly one [`PartitionType`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
pub enum SubType {
    /// Key-value storage.
    #[strum(serialize = "nvs")]
    Nvs,
    /// OTA selection metadata.
    #[strum(serialize = "ota")]
    Ota,
    /// First OTA application slot.
    #[strum(serialize = "ota_0")]
    Ota0,
    /// Second OTA application slot.
    #[strum(serialize = "ota_1")]
    Ota1,
    /// Flat filesystem for static assets.
    #[strum(serialize = "spiffs")]
    Spiffs,
}

impl SubType {
    /// The partition type this subtype is valid under.
    pub fn partition_type(&self) -> PartitionType {
        match self {
            Self::Ota0 | Self::Ota1 => PartitionType::App,
            Self::Nvs | Self::Ota | Self::Spiffs => PartitionType::Data,
        }
    }
}

/// One row of a partition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    pub name: String,
    pub partition_type: PartitionType,
    pub subtype: SubType,
    /// `None` leaves the offset for the flashing tool to assign, directly
    /// after the previous partition.
    pub offset: Option<u32>,
    pub size: u32,
    /// Always empty in generated tables.
    pub flags: String,
}

impl PartitionEntry {
    pub fn new(name: &str, subtype: SubType, offset: Option<u32>, size: u32) -> Self {
        Self {
            name: name.to_string(),
            partition_type: subtype.partition_type(),
            subtype,
            offset,
            size,
            flags: String::new(),
        }
    }

    pub(crate) fn offset_str(&self) -> String {
        self.offset.map(format_hex).unwrap_or_default()
    }

    pub(crate) fn size_str(&self) -> String {
        format_hex(self.size)
    }
}

impl fmt::Display for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}) size {}",
            self.name,
            self.partition_type,
            self.subtype,
            self.size_str()
        )?;
        if let Some(offset) = self.offset {
            write!(f, " at {}", format_hex(offset))?;
        }
        Ok(())
    }
}

/// Format an offset or size the way partition tables expect: `0x` prefix,
/// lowercase digits, no padding.
pub fn format_hex(value: u32) -> String {
    format!("{value:#x}")
}

/// Parse a partition offset or size.
///
/// Accepts decimal, `0x`/`0X` prefixed hex, and an optional `K` or `M`
/// suffix for kibibytes and mebibytes.
pub fn parse_size(s: &str) -> Result<u32, Error> {
    let s = s.trim();
    let (digits, multiplier) = match s.as_bytes().last() {
        Some(b'K' | b'k') => (&s[..s.len() - 1], 1024),
        Some(b'M' | b'm') => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1),
    };

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        digits.parse::<u32>()
    }
    .map_err(|e| Error::InvalidValue(format!("invalid size '{}': {}", s, e)))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidValue(format!("size '{}' does not fit in 32 bits", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_formats() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("0x9000").unwrap(), 0x9000);
        assert_eq!(parse_size("0X1C0000").unwrap(), 0x1c0000);
        assert_eq!(parse_size("128K").unwrap(), 128 * 1024);
        assert_eq!(parse_size("4M").unwrap(), 0x400000);
        assert_eq!(parse_size(" 0x2000 ").unwrap(), 0x2000);
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("0x").is_err());
        assert!(parse_size("12Q").is_err());
        assert!(parse_size("-1").is_err());
        assert!(parse_size("8192M").is_err());
    }

    #[test]
    fn hex_is_lowercase_and_unpadded() {
        assert_eq!(format_hex(0x1c0000), "0x1c0000");
        assert_eq!(format_hex(0x9000), "0x9000");
        assert_eq!(format_hex(0), "0x0");
    }

    #[test]
    fn subtype_names() {
        assert_eq!(SubType::Ota0.to_string(), "ota_0");
        assert_eq!("ota_1".parse::<SubType>().unwrap(), SubType::Ota1);
        assert_eq!("data".parse::<PartitionType>().unwrap(), PartitionType::Data);
        assert_eq!(SubType::Spiffs.partition_type(), PartitionType::Data);
        assert!("fat".parse::<SubType>().is_err());
    }

    #[test]
    fn auto_offset_renders_empty() {
        let entry = PartitionEntry::new("app0", SubType::Ota0, None, 0x1c0000);
        assert_eq!(entry.partition_type, PartitionType::App);
        assert_eq!(entry.offset_str(), "");
        assert_eq!(entry.size_str(), "0x1c0000");
        assert_eq!(entry.to_string(), "app0 (app/ota_0) size 0x1c0000");
    }
}
