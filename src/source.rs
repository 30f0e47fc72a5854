//! GPX point source.
//!
//! Streams a GPX document and collects every `<trkpt>` in document order,
//! regardless of namespace prefix. Each point needs `lat`/`lon` attributes
//! and `<ele>`/`<time>` children; anything missing or unparseable fails the
//! whole parse with the index of the offending point.

use chrono::{DateTime, FixedOffset};
use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OptionExt, Result, SpeedlineError};
use crate::{Track, TrackPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Elevation,
    Time,
}

/// A `<trkpt>` whose children have not all been read yet.
#[derive(Debug)]
struct PendingPoint {
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    time: Option<DateTime<FixedOffset>>,
}

impl PendingPoint {
    fn from_element(element: &BytesStart<'_>, index: usize) -> Result<Self> {
        let mut latitude = None;
        let mut longitude = None;

        for attr in element.attributes() {
            let attr = attr.map_err(|e| malformed(index, format!("bad attribute: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| malformed(index, format!("bad attribute value: {}", e)))?;
            match attr.key.local_name().as_ref() {
                b"lat" => latitude = Some(parse_number(&value, "lat", index)?),
                b"lon" => longitude = Some(parse_number(&value, "lon", index)?),
                _ => {}
            }
        }

        Ok(Self {
            latitude: latitude.ok_or_malformed(index, "missing lat attribute")?,
            longitude: longitude.ok_or_malformed(index, "missing lon attribute")?,
            elevation: None,
            time: None,
        })
    }

    fn set(&mut self, field: Field, text: &str, index: usize) -> Result<()> {
        match field {
            Field::Elevation => self.elevation = Some(parse_number(text, "ele", index)?),
            Field::Time => {
                let time = DateTime::parse_from_rfc3339(text)
                    .map_err(|e| malformed(index, format!("bad time '{}': {}", text, e)))?;
                self.time = Some(time);
            }
        }
        Ok(())
    }

    fn finish(self, index: usize) -> Result<TrackPoint> {
        Ok(TrackPoint::new(
            self.latitude,
            self.longitude,
            self.elevation.ok_or_malformed(index, "missing <ele>")?,
            self.time.ok_or_malformed(index, "missing <time>")?,
        ))
    }
}

fn malformed(index: usize, message: String) -> SpeedlineError {
    SpeedlineError::MalformedPoint { index, message }
}

fn parse_number(text: &str, name: &str, index: usize) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| malformed(index, format!("bad {} '{}': {}", name, text, e)))
}

/// Parse the track points of a GPX document into a validated [`Track`].
///
/// # Example
/// ```
/// use speedline::parse_gpx;
///
/// let xml = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg>
///   <trkpt lat="40.0" lon="-105.0"><ele>1600</ele><time>2024-05-01T15:00:00Z</time></trkpt>
///   <trkpt lat="40.001" lon="-105.0"><ele>1601</ele><time>2024-05-01T15:00:30Z</time></trkpt>
/// </trkseg></trk></gpx>"#;
///
/// let track = parse_gpx(xml).unwrap();
/// assert_eq!(track.len(), 2);
/// ```
pub fn parse_gpx(xml: &str) -> Result<Track> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut points = Vec::new();
    let mut pending: Option<PendingPoint> = None;
    let mut field: Option<Field> = None;

    loop {
        let index = points.len();
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => pending = Some(PendingPoint::from_element(&e, index)?),
                b"ele" if pending.is_some() => field = Some(Field::Elevation),
                b"time" if pending.is_some() => field = Some(Field::Time),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"trkpt" => {
                let point = PendingPoint::from_element(&e, index)?.finish(index)?;
                points.push(point);
            }
            Ok(Event::Text(text)) => {
                if let (Some(f), Some(point)) = (field, pending.as_mut()) {
                    let text = text
                        .unescape()
                        .map_err(|e| malformed(index, format!("bad text: {}", e)))?;
                    point.set(f, text.trim(), index)?;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(point) = pending.take() {
                        points.push(point.finish(index)?);
                    }
                }
                b"ele" | b"time" => field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(
                    index,
                    format!("XML error at byte {}: {}", reader.buffer_position(), e),
                ))
            }
            Ok(_) => {}
        }
    }

    if pending.is_some() {
        return Err(malformed(points.len(), "unterminated <trkpt>".to_string()));
    }

    info!("[Source] Read {} track points", points.len());
    debug!(
        "[Source] First point: {:?}, last point: {:?}",
        points.first().map(|p| p.time),
        points.last().map(|p| p.time)
    );

    Track::new(points)
}
