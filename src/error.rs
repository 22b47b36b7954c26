use thiserror::Error;

/// Errors that can occur while computing, rendering or parsing a partition
/// table.
#[derive(Error, Debug)]
pub enum Error {
    /// The fixed regions leave no room for the two application slots.
    /// `shortfall` is how many more bytes of flash it would take to give each
    /// slot at least one byte.
    #[error(
        "reserved regions need {reserved:#x} of {total:#x} flash bytes, \
         app slots are short by {shortfall:#x} bytes"
    )]
    Configuration {
        reserved: u64,
        total: u32,
        shortfall: u64,
    },

    #[error("failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse layout: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid partition type: {0}")]
    InvalidType(String),

    #[error("invalid partition subtype: {0}")]
    InvalidSubType(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
