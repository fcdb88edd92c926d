use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, info, warn};

use crate::error::TrailError;
use crate::trail_types::GeoSample;

type Result<T> = std::result::Result<T, TrailError>;

/// Namespace qualifier of the document, resolved once from the root element.
///
/// Every `trkpt`, `ele` and `time` lookup in the document is matched against
/// this single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackNamespace {
    Unqualified,
    Qualified(String),
}

impl TrackNamespace {
    fn from_root(resolved: &ResolveResult<'_>) -> Result<Self> {
        match resolved {
            ResolveResult::Bound(Namespace(uri)) => {
                Ok(Self::Qualified(String::from_utf8_lossy(uri).into_owned()))
            }
            ResolveResult::Unbound => Ok(Self::Unqualified),
            ResolveResult::Unknown(prefix) => Err(TrailError::UnboundPrefix {
                prefix: String::from_utf8_lossy(prefix).into_owned(),
            }),
        }
    }

    /// Whether an element resolved to `resolved` belongs to this namespace.
    pub fn matches(&self, resolved: &ResolveResult<'_>) -> bool {
        match (self, resolved) {
            (Self::Unqualified, ResolveResult::Unbound) => true,
            (Self::Qualified(uri), ResolveResult::Bound(Namespace(ns))) => uri.as_bytes() == *ns,
            _ => false,
        }
    }

    /// Clark notation for a local name, e.g. `{http://...}trkpt`.
    pub(crate) fn qualify(&self, local: &str) -> String {
        match self {
            Self::Unqualified => local.to_string(),
            Self::Qualified(uri) => format!("{{{uri}}}{local}"),
        }
    }
}

/// Parse a GPX XML string into the ordered trackpoints it contains.
///
/// Trackpoints are collected from anywhere below the root, across all tracks
/// and segments, in document order.
pub fn parse_gpx(xml: &str) -> Result<Vec<GeoSample>> {
    let mut reader = NsReader::from_str(xml);

    let (namespace, root_open) = loop {
        let (resolved, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(e) => break (root_namespace(&resolved, &e)?, true),
            Event::Empty(e) => break (root_namespace(&resolved, &e)?, false),
            Event::Eof => return Err(TrailError::NoRootElement),
            _ => {}
        }
    };

    let mut samples = Vec::new();
    if root_open {
        extract_points(&mut reader, &namespace, &mut samples)?;
    }
    ensure_document_end(&mut reader)?;

    if samples.is_empty() {
        warn!("document contains no usable trackpoints");
    } else {
        info!(points = samples.len(), "extracted trackpoints");
    }
    Ok(samples)
}

fn root_namespace(resolved: &ResolveResult<'_>, root: &BytesStart<'_>) -> Result<TrackNamespace> {
    let namespace = TrackNamespace::from_root(resolved)?;
    let local = String::from_utf8_lossy(root.local_name().as_ref()).into_owned();
    debug!(root = %namespace.qualify(&local), "resolved root element");
    Ok(namespace)
}

/// After the root closes only whitespace, comments and processing
/// instructions may follow.
fn ensure_document_end<'a>(reader: &mut NsReader<&'a [u8]>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Text(e) if e.iter().all(u8::is_ascii_whitespace) => {}
            Event::Comment(_) | Event::PI(_) => {}
            Event::Start(e) | Event::Empty(e) => {
                return Err(TrailError::TrailingContent(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            other => return Err(TrailError::TrailingContent(format!("{other:?}"))),
        }
    }
}

/// Scan the subtree of an element whose start tag was just read, collecting
/// matching `trkpt` elements. Returns after consuming that element's end tag.
fn extract_points<'a>(
    reader: &mut NsReader<&'a [u8]>,
    namespace: &TrackNamespace,
    samples: &mut Vec<GeoSample>,
) -> Result<()> {
    let mut depth = 1usize;

    while depth > 0 {
        let (in_scope, event) = read_scoped_event(reader, namespace)?;
        let is_trkpt = in_scope
            && matches!(&event, Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"trkpt");

        match event {
            Event::Start(e) if is_trkpt => open_trkpt(&e, reader, namespace, samples)?,
            Event::Empty(e) if is_trkpt => empty_trkpt(&e, samples)?,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(TrailError::UnclosedElement),
            _ => {}
        }
    }

    Ok(())
}

/// Handle `<trkpt ...>` through its matching end tag.
///
/// The point is pushed before its subtree is read, so trackpoints nested
/// inside it follow it in document order.
fn open_trkpt<'a>(
    start: &BytesStart<'_>,
    reader: &mut NsReader<&'a [u8]>,
    namespace: &TrackNamespace,
    samples: &mut Vec<GeoSample>,
) -> Result<()> {
    match parse_lat_lon(start)? {
        Some((lat, lon)) => {
            let slot = samples.len();
            samples.push(GeoSample::new(lat, lon));
            parse_point(slot, reader, namespace, samples)
        }
        None => {
            debug!(index = samples.len(), "skipping trkpt without lat/lon");
            extract_points(reader, namespace, samples)
        }
    }
}

fn empty_trkpt(e: &BytesStart<'_>, samples: &mut Vec<GeoSample>) -> Result<()> {
    match parse_lat_lon(e)? {
        Some((lat, lon)) => samples.push(GeoSample::new(lat, lon)),
        None => debug!(index = samples.len(), "skipping trkpt without lat/lon"),
    }
    Ok(())
}

/// Next event, flagged with whether its element belongs to the document namespace.
fn read_scoped_event<'a>(
    reader: &mut NsReader<&'a [u8]>,
    namespace: &TrackNamespace,
) -> Result<(bool, Event<'a>)> {
    let (resolved, event) = reader.read_resolved_event()?;
    Ok((namespace.matches(&resolved), event))
}

/// Read `lat`/`lon` from a trackpoint's start tag.
///
/// `Ok(None)` when either attribute is missing. Present but non-numeric
/// values are an error.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<Option<(f64, f64)>> {
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        match attr.key.as_ref() {
            b"lat" => lat = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            b"lon" => lon = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some((
            parse_coordinate("lat", &lat)?,
            parse_coordinate("lon", &lon)?,
        ))),
        _ => Ok(None),
    }
}

fn parse_coordinate(attribute: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| TrailError::InvalidAttribute {
            attribute,
            value: value.to_string(),
        })
}

enum PointField {
    Elevation,
    Time,
    Trackpoint,
}

/// Fill `ele` and `time` of `samples[slot]` from the direct children of an
/// open `trkpt`. Called after receiving Event::Start for the point element.
///
/// Only the first `ele` and first `time` child count; empty text leaves the
/// field absent. Other children are scanned for nested trackpoints.
fn parse_point<'a>(
    slot: usize,
    reader: &mut NsReader<&'a [u8]>,
    namespace: &TrackNamespace,
    samples: &mut Vec<GeoSample>,
) -> Result<()> {
    let mut seen_ele = false;
    let mut seen_time = false;

    loop {
        let (in_scope, event) = read_scoped_event(reader, namespace)?;
        let field = match &event {
            Event::Start(e) | Event::Empty(e) if in_scope => {
                match e.local_name().as_ref() {
                    b"ele" => Some(PointField::Elevation),
                    b"time" => Some(PointField::Time),
                    b"trkpt" => Some(PointField::Trackpoint),
                    _ => None,
                }
            }
            _ => None,
        };

        match event {
            Event::Start(e) => match field {
                Some(PointField::Elevation) => {
                    let text = read_text_owned(reader, &e)?;
                    if !seen_ele {
                        samples[slot].ele = parse_elevation(&text)?;
                        seen_ele = true;
                    }
                }
                Some(PointField::Time) => {
                    let text = read_text_owned(reader, &e)?;
                    if !seen_time {
                        samples[slot].time = non_empty(&text).map(str::to_string);
                        seen_time = true;
                    }
                }
                Some(PointField::Trackpoint) => open_trkpt(&e, reader, namespace, samples)?,
                // Extensions and other metadata
                None => extract_points(reader, namespace, samples)?,
            },
            Event::Empty(e) => match field {
                Some(PointField::Elevation) => seen_ele = true,
                Some(PointField::Time) => seen_time = true,
                Some(PointField::Trackpoint) => empty_trkpt(&e, samples)?,
                None => {}
            },
            // Children are consumed whole above, so this is the trkpt's own end tag.
            Event::End(_) => break,
            Event::Eof => return Err(TrailError::UnclosedElement),
            _ => {}
        }
    }

    Ok(())
}

fn parse_elevation(text: &str) -> Result<Option<f64>> {
    match non_empty(text) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| TrailError::InvalidElevation {
                value: value.to_string(),
            }),
    }
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Read the text of an element up to its first child element, as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut NsReader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().as_ref().to_vec();
    let mut text = String::new();
    let mut past_child = false;

    loop {
        match reader.read_event()? {
            // Content after a child element is that child's tail, not our text.
            Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) if past_child => {}
            Event::Text(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        name => {
                            return Err(TrailError::UnknownEntity {
                                name: name.to_string(),
                            });
                        }
                    }
                }
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
                past_child = true;
            }
            Event::Empty(_) => past_child = true,
            Event::End(e) if e.name().as_ref() == end_name.as_slice() => break,
            Event::Eof => return Err(TrailError::UnclosedElement),
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_trackpoint() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg>
    <trkpt lat="35.6762" lon="139.6503"/>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
        assert!((samples[0].lat - 35.6762).abs() < 1e-10);
        assert!((samples[0].lon - 139.6503).abs() < 1e-10);
        assert_eq!(samples[0].ele, None);
        assert_eq!(samples[0].time, None);
    }

    #[test]
    fn test_trackpoint_with_children() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg>
    <trkpt lat="40.0" lon="-105.0">
      <ele>1800.5</ele>
      <time>2025-01-01T00:00:00Z</time>
      <name>Trailhead</name>
    </trkpt>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].ele, Some(1800.5));
        assert_eq!(samples[0].time.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_default_namespace() {
        let xml = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
  <trk><trkseg>
    <trkpt lat="35.0" lon="139.0"><ele>12</ele></trkpt>
    <trkpt lat="35.1" lon="139.1"><ele>13</ele></trkpt>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].ele, Some(13.0));
    }

    #[test]
    fn test_prefixed_root_namespace() {
        let xml = r#"<?xml version="1.0"?>
<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1" version="1.1">
  <g:trk><g:trkseg>
    <g:trkpt lat="35.0" lon="139.0"><g:ele>7</g:ele></g:trkpt>
  </g:trkseg></g:trk>
</g:gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].ele, Some(7.0));
    }

    #[test]
    fn test_unqualified_points_ignored_in_namespaced_document() {
        let xml = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
  <trk><trkseg>
    <trkpt lat="35.0" lon="139.0"/>
    <trkpt xmlns="" lat="36.0" lon="140.0"/>
    <other:trkpt xmlns:other="urn:other" lat="37.0" lon="141.0"/>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].lat, 35.0);
    }

    #[test]
    fn test_elevation_in_foreign_namespace_ignored() {
        let xml = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="35.0" lon="139.0"><x:ele xmlns:x="urn:x">99</x:ele></trkpt>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].ele, None);
    }

    #[test]
    fn test_segments_concatenated() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"/>
      <trkpt lat="35.001" lon="139.001"/>
    </trkseg>
    <trkseg>
      <trkpt lat="36.0" lon="140.0"/>
    </trkseg>
  </trk>
  <trk><trkseg><trkpt lat="37.0" lon="141.0"/></trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        let lats: Vec<f64> = samples.iter().map(|s| s.lat).collect();
        assert_eq!(lats, vec![35.0, 35.001, 36.0, 37.0]);
    }

    #[test]
    fn test_waypoints_and_route_points_ignored() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="1.0" lon="1.0"/>
  <rte><rtept lat="2.0" lon="2.0"/></rte>
  <trk><trkseg><trkpt lat="3.0" lon="3.0"/></trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].lat, 3.0);
    }

    #[test]
    fn test_missing_lon_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg>
    <trkpt lat="35.0" lon="139.0"><ele>1</ele></trkpt>
    <trkpt lat="35.5"><ele>2</ele></trkpt>
    <trkpt lon="139.5"/>
    <trkpt lat="36.0" lon="140.0"><ele>3</ele></trkpt>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].ele, Some(1.0));
        assert_eq!(samples[1].ele, Some(3.0));
    }

    #[test]
    fn test_missing_lat_with_bad_lon_still_skipped() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lon="east"/>
    <trkpt lat="1.0" lon="2.0"/>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_non_numeric_lat_is_fatal() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="north" lon="139.0"/>
    <trkpt lat="1.0" lon="2.0"/>
</trkseg></trk></gpx>"#;
        let err = parse_gpx(xml).unwrap_err();
        match err {
            TrailError::InvalidAttribute { attribute, value } => {
                assert_eq!(attribute, "lat");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_elevation_and_time_absent() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><ele></ele><time>   </time></trkpt>
    <trkpt lat="1.0" lon="2.0"><ele/><time/></trkpt>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 2);
        for s in &samples {
            assert_eq!(s.ele, None);
            assert_eq!(s.time, None);
        }
    }

    #[test]
    fn test_zero_elevation_is_present() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><ele>0</ele></trkpt>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].ele, Some(0.0));
    }

    #[test]
    fn test_first_elevation_wins() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><ele>10</ele><ele>20</ele></trkpt>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].ele, Some(10.0));
    }

    #[test]
    fn test_non_numeric_elevation_is_fatal() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><ele>high</ele></trkpt>
</trkseg></trk></gpx>"#;
        let err = parse_gpx(xml).unwrap_err();
        assert!(matches!(err, TrailError::InvalidElevation { ref value } if value == "high"));
    }

    #[test]
    fn test_timestamp_passed_through() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><time> 2025-06-01 07:15:00, local </time></trkpt>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].time.as_deref(), Some("2025-06-01 07:15:00, local"));
    }

    #[test]
    fn test_cdata_time() {
        let xml = r#"<gpx><trk><trkseg>
    <trkpt lat="1.0" lon="2.0"><time><![CDATA[2025-01-01T00:00:00Z]]></time></trkpt>
</trkseg></trk></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].time.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_extensions_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0">
        <extensions>
          <gpxtpx:TrackPointExtension xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <gpxtpx:hr>150</gpxtpx:hr>
          </gpxtpx:TrackPointExtension>
        </extensions>
        <ele>5</ele>
      </trkpt>
      <trkpt lat="35.001" lon="139.001"/>
    </trkseg>
  </trk>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].ele, Some(5.0));
    }

    #[test]
    fn test_empty_gpx() {
        let xml = r#"<?xml version="1.0"?><gpx version="1.1"></gpx>"#;
        assert!(parse_gpx(xml).unwrap().is_empty());
    }

    #[test]
    fn test_self_closing_root() {
        let xml = r#"<?xml version="1.0"?><gpx version="1.1"/>"#;
        assert!(parse_gpx(xml).unwrap().is_empty());
    }

    #[test]
    fn test_no_root_element() {
        let err = parse_gpx("").unwrap_err();
        assert!(matches!(err, TrailError::NoRootElement));
    }

    #[test]
    fn test_mismatched_tags_are_fatal() {
        let err = parse_gpx("<gpx><trk></gpx>").unwrap_err();
        assert!(matches!(err, TrailError::XmlParse(_)));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let err = parse_gpx(r#"<gpx><trk><trkseg><trkpt lat="1" lon="2">"#).unwrap_err();
        assert!(matches!(
            err,
            TrailError::UnclosedElement | TrailError::XmlParse(_)
        ));
    }

    #[test]
    fn test_undeclared_root_prefix() {
        let err = parse_gpx(r#"<g:gpx><g:trkpt lat="1" lon="2"/></g:gpx>"#).unwrap_err();
        assert!(matches!(err, TrailError::UnboundPrefix { ref prefix } if prefix == "g"));
    }

    #[test]
    fn test_namespace_qualify() {
        let ns = TrackNamespace::Qualified("http://www.topografix.com/GPX/1/1".into());
        assert_eq!(ns.qualify("trkpt"), "{http://www.topografix.com/GPX/1/1}trkpt");
        assert_eq!(TrackNamespace::Unqualified.qualify("trkpt"), "trkpt");
    }

    #[test]
    fn test_second_root_rejected() {
        let err = parse_gpx(r#"<gpx></gpx><gpx><trkpt lat="3" lon="4"/></gpx>"#).unwrap_err();
        assert!(matches!(err, TrailError::TrailingContent(ref name) if name == "gpx"));
    }

    #[test]
    fn test_trailing_text_rejected() {
        let xml = r#"<gpx><trk><trkseg><trkpt lat="1" lon="2"/></trkseg></trk></gpx>garbage"#;
        let err = parse_gpx(xml).unwrap_err();
        assert!(matches!(err, TrailError::TrailingContent(_)));
    }

    #[test]
    fn test_trailing_comment_and_whitespace_allowed() {
        let xml = "<gpx><trkpt lat=\"1\" lon=\"2\"/></gpx>\n<!-- exported -->\n<?done?>\n";
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_trailing_content_after_self_closing_root() {
        let err = parse_gpx(r#"<gpx/><trkpt lat="1" lon="2"/>"#).unwrap_err();
        assert!(matches!(err, TrailError::TrailingContent(_)));
    }

    #[test]
    fn test_undefined_entity_rejected() {
        let xml = r#"<gpx><trkpt lat="1" lon="2"><time>a&foo;b</time></trkpt></gpx>"#;
        let err = parse_gpx(xml).unwrap_err();
        assert!(matches!(err, TrailError::UnknownEntity { ref name } if name == "foo"));
    }

    #[test]
    fn test_predefined_entities_resolved() {
        let xml = r#"<gpx><trkpt lat="1" lon="2"><time>a&amp;b&#33;</time></trkpt></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].time.as_deref(), Some("a&b!"));
    }

    #[test]
    fn test_nested_trackpoint_follows_parent() {
        let xml = r#"<gpx>
    <trkpt lat="1" lon="2"><trkpt lat="3" lon="4"/><ele>5</ele></trkpt>
    <trkpt lat="6" lon="7"/>
</gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        let lats: Vec<f64> = samples.iter().map(|s| s.lat).collect();
        assert_eq!(lats, vec![1.0, 3.0, 6.0]);
        assert_eq!(samples[0].ele, Some(5.0));
        assert_eq!(samples[1].ele, None);
    }

    #[test]
    fn test_trackpoint_inside_extensions_found() {
        let xml = r#"<gpx><trkpt lat="1" lon="2">
    <extensions><trkpt lat="3" lon="4"><ele>9</ele></trkpt></extensions>
    <ele>1</ele>
</trkpt></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].ele, Some(1.0));
        assert_eq!(samples[1].ele, Some(9.0));
    }

    #[test]
    fn test_time_text_stops_at_child_element() {
        let xml = r#"<gpx><trkpt lat="1" lon="2"><time>a<b>x</b>c</time></trkpt></gpx>"#;
        let samples = parse_gpx(xml).unwrap();
        assert_eq!(samples[0].time.as_deref(), Some("a"));
    }
}
