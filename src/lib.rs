pub mod error;
pub mod export;
pub mod geo;
pub mod options;
pub mod parser;
pub mod table;
pub mod trail_types;

use std::path::Path;

use tracing::info;
use wasm_bindgen::prelude::*;

pub use crate::error::TrailError;
pub use crate::options::ExportOptions;
pub use crate::trail_types::{GeoSample, TrailRow, TrailSummary, TrailTable};

/// Parse GPX text, annotate its trackpoints and serialize them as CSV.
pub fn convert_str(xml: &str, opts: &ExportOptions) -> Result<(TrailTable, String), TrailError> {
    let samples = parser::parse_gpx(xml)?;
    let table = table::build_table(&samples);
    let csv = export::to_csv_string(&table.rows, opts)?;
    Ok((table, csv))
}

/// Read a GPX file, write the annotated table to `output` and return it.
pub fn convert_file(
    input: &Path,
    output: &Path,
    opts: &ExportOptions,
) -> Result<TrailTable, TrailError> {
    let xml = std::fs::read_to_string(input).map_err(|source| TrailError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let samples = parser::parse_gpx(&xml)?;
    let table = table::build_table(&samples);
    export::export(&table.rows, output, opts)?;

    let summary = table.summary;
    info!(
        points = table.rows.len(),
        distance_m = summary.total_distance_m,
        gain_m = summary.total_gain_m,
        grade_pct = summary.average_grade_percent(),
        output = %output.display(),
        "converted track"
    );
    Ok(table)
}

/// Convert GPX string to trail CSV text.
#[wasm_bindgen(js_name = gpxToTrailCsv)]
pub fn gpx_to_trail_csv(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let (_, csv) = convert_str(gpx_string, &opts)?;
    Ok(csv)
}

/// Convert GPX string to `{ rows, summary }`, returned as a JS object.
#[wasm_bindgen(js_name = gpxToTrailTable)]
pub fn gpx_to_trail_table(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let samples = parser::parse_gpx(gpx_string)?;
    let table = table::build_table(&samples);
    serde_wasm_bindgen::to_value(&table).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options(options: JsValue) -> Result<ExportOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ExportOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
