use std::io::Write;

use csv::Writer;

use crate::error::Error;
use crate::plan::PartitionPlan;

const GENERATED_NOTICE: &str =
    "# This is autogenerated by esp-partition-gen - change the layout instead!";
const COLUMNS_COMMENT: &str = "# Name, Type, SubType, Offset, Size, Flags";

/// Render `plan` into `out`: a comment header followed by one row per
/// partition.
///
/// The header reports the app slot, filesystem and user NVS sizes in whole
/// KiB. Rows carry six columns with an empty trailing `Flags` column, and
/// only the first partition has an explicit offset.
pub(crate) fn write_csv<W: Write>(plan: &PartitionPlan, mut out: W) -> Result<(), Error> {
    writeln!(out, "{}", GENERATED_NOTICE)?;
    writeln!(
        out,
        "# appsize={} KB, spiffs={} KB, usernvs={} KB",
        plan.app_slot_kib(),
        plan.filesystem_kib(),
        plan.nvs_user_kib()
    )?;
    writeln!(out, "{}", COLUMNS_COMMENT)?;

    let mut wtr = Writer::from_writer(out);
    write_records(&mut wtr, plan)
}

/// Render `plan` and return the table as a `String`.
pub(crate) fn write_csv_content(plan: &PartitionPlan) -> Result<String, Error> {
    let mut buf = Vec::new();
    write_csv(plan, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| Error::InvalidValue(format!("CSV output is not valid UTF-8: {}", e)))
}

fn write_records<W: Write>(wtr: &mut Writer<W>, plan: &PartitionPlan) -> Result<(), Error> {
    for entry in plan.entries() {
        let partition_type: &'static str = entry.partition_type.into();
        let subtype: &'static str = entry.subtype.into();
        let offset = entry.offset_str();
        let size = entry.size_str();
        wtr.write_record([
            entry.name.as_str(),
            partition_type,
            subtype,
            offset.as_str(),
            size.as_str(),
            entry.flags.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
