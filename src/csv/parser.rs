use csv::{
    ReaderBuilder,
    StringRecord,
    Trim,
};

use crate::error::Error;
use crate::partition::{
    parse_size,
    PartitionEntry,
    PartitionType,
    SubType,
};
use crate::PartitionTable;

/// Parse partition table CSV content into a [`PartitionTable`].
///
/// `#` lines and blank lines are skipped and fields are trimmed, so both
/// generated tables and hand-aligned ones are accepted. The `Flags` column
/// may be omitted.
pub(crate) fn parse_csv(content: &str) -> Result<PartitionTable, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table = PartitionTable { entries: vec![] };
    for result in reader.records() {
        let record = result?;
        table.entries.push(parse_record(&record)?);
    }

    Ok(table)
}

fn parse_record(record: &StringRecord) -> Result<PartitionEntry, Error> {
    if !(5..=6).contains(&record.len()) {
        return Err(Error::InvalidValue(format!(
            "expected 5 or 6 columns, found {}",
            record.len()
        )));
    }

    let name = &record[0];
    if name.is_empty() {
        return Err(Error::InvalidValue("partition name must not be empty".to_string()));
    }

    let partition_type: PartitionType = record[1]
        .parse()
        .map_err(|_| Error::InvalidType(record[1].to_string()))?;
    let subtype: SubType = record[2]
        .parse()
        .map_err(|_| Error::InvalidSubType(record[2].to_string()))?;
    if subtype.partition_type() != partition_type {
        return Err(Error::InvalidSubType(format!(
            "{} is not a {} subtype",
            subtype, partition_type
        )));
    }

    let offset = match &record[3] {
        "" => None,
        s => Some(parse_size(s)?),
    };
    let size = parse_size(&record[4])?;

    Ok(PartitionEntry {
        name: name.to_string(),
        partition_type,
        subtype,
        offset,
        size,
        flags: record.get(5).unwrap_or_default().to_string(),
    })
}
