use serde::Deserialize;

use crate::error::TrailError;

/// Options for writing the trail table as delimited text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Field delimiter (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Write the column header line first (default: true)
    #[serde(default = "default_true")]
    pub include_header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            include_header: true,
        }
    }
}

impl ExportOptions {
    /// The delimiter as the single byte the CSV writer expects.
    pub fn delimiter_byte(&self) -> Result<u8, TrailError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(TrailError::InvalidDelimiter(self.delimiter))
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}
