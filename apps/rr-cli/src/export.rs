//! CSV export of stored paths.

use rr_results::PathRecord;
use std::io::{self, Write};

pub fn write_csv<W: Write>(records: &[PathRecord], out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", PathRecord::CSV_HEADER)?;
    for record in records {
        writeln!(out, "{}", record.to_csv_row())?;
    }
    Ok(())
}
