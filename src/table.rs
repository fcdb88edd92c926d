use crate::geo::{elevation_gain, great_circle_distance};
use crate::trail_types::*;

/// Annotate every sample with segment and running totals in one forward pass.
///
/// Row 0 carries zeros in all four metric columns; every later row is
/// measured against the sample immediately before it.
pub fn build_table(samples: &[GeoSample]) -> TrailTable {
    let Some(first) = samples.first() else {
        return TrailTable::default();
    };

    let mut rows = Vec::with_capacity(samples.len());
    rows.push(sample_to_row(0, first, 0.0, 0.0, 0.0, 0.0));

    let mut total_distance = 0.0;
    let mut total_gain = 0.0;

    for (i, pair) in samples.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        let seg_dist = great_circle_distance(prev, curr);
        let seg_gain = elevation_gain(prev, curr);
        total_distance += seg_dist;
        total_gain += seg_gain;

        rows.push(sample_to_row(
            i + 1,
            curr,
            seg_dist,
            total_distance,
            seg_gain,
            total_gain,
        ));
    }

    let summary = TrailSummary::from_rows(&rows);
    TrailTable { rows, summary }
}

fn sample_to_row(
    index: usize,
    sample: &GeoSample,
    segment_distance_m: f64,
    cumulative_distance_m: f64,
    segment_gain_m: f64,
    cumulative_gain_m: f64,
) -> TrailRow {
    TrailRow {
        index,
        latitude: sample.lat,
        longitude: sample.lon,
        elevation: sample.ele,
        timestamp: sample.time.clone(),
        segment_distance_m,
        cumulative_distance_m,
        segment_gain_m,
        cumulative_gain_m,
    }
}
