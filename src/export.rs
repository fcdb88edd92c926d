//! Delimited-text serialization of trail rows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::debug;

use crate::error::TrailError;
use crate::options::ExportOptions;
use crate::trail_types::TrailRow;

type Result<T> = std::result::Result<T, TrailError>;

/// Column order of the exported table.
pub const HEADER: [&str; 9] = [
    "index",
    "latitude",
    "longitude",
    "elevation",
    "timestamp",
    "segment_distance_m",
    "cumulative_distance_m",
    "segment_gain_m",
    "cumulative_gain_m",
];

/// Write rows to any writer.
///
/// Absent elevation/timestamp become empty fields. Quoting of fields that
/// contain the delimiter, quotes or line breaks is left to the CSV writer.
pub fn write_rows<W: Write>(rows: &[TrailRow], sink: W, opts: &ExportOptions) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(opts.delimiter_byte()?)
        .has_headers(false)
        .from_writer(sink);

    // Written by hand so an empty table still gets its header line.
    if opts.include_header {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Serialize rows into an in-memory string.
pub fn to_csv_string(rows: &[TrailRow], opts: &ExportOptions) -> Result<String> {
    let mut buf = Vec::new();
    write_rows(rows, &mut buf, opts)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write rows to `path`, creating or truncating it.
pub fn export(rows: &[TrailRow], path: &Path, opts: &ExportOptions) -> Result<()> {
    let file = File::create(path).map_err(|source| TrailError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(rows, file, opts)?;
    debug!(rows = rows.len(), path = %path.display(), "wrote trail table");
    Ok(())
}
