use serde::Serialize;

/// A single recorded trackpoint (<trkpt>).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSample {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<String>,
}

impl GeoSample {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ele: None,
            time: None,
        }
    }
}

/// One output line, annotated with segment and running totals.
///
/// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailRow {
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timestamp: Option<String>,
    pub segment_distance_m: f64,
    pub cumulative_distance_m: f64,
    pub segment_gain_m: f64,
    pub cumulative_gain_m: f64,
}

/// Track-wide totals. `average_grade` is a ratio, not a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrailSummary {
    pub total_distance_m: f64,
    pub total_gain_m: f64,
    pub average_grade: f64,
}

impl TrailSummary {
    pub fn new(total_distance_m: f64, total_gain_m: f64) -> Self {
        Self {
            total_distance_m,
            total_gain_m,
            average_grade: crate::geo::average_grade(total_gain_m, total_distance_m),
        }
    }

    /// Recover the totals from the cumulative fields of the last row.
    pub(crate) fn from_rows(rows: &[TrailRow]) -> Self {
        match rows.last() {
            Some(last) => Self::new(last.cumulative_distance_m, last.cumulative_gain_m),
            None => Self::default(),
        }
    }

    pub fn average_grade_percent(&self) -> f64 {
        self.average_grade * 100.0
    }
}

/// Rows plus totals, as produced by [`crate::table::build_table`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrailTable {
    pub rows: Vec<TrailRow>,
    pub summary: TrailSummary,
}
