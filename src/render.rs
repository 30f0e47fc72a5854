//! Overlay renderers.
//!
//! Renderers turn a [`TrackReport`] into an output document. Namespaces and
//! other document settings live on the renderer value itself.

use std::fmt::Display;

use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, SpeedlineError};
use crate::pipeline::{ColoredSegment, TrackReport};

/// KML 2.2 namespace.
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Something that can write a report as a document.
pub trait OverlayRenderer {
    fn render(&self, report: &TrackReport) -> Result<String>;
}

fn render_error(err: impl Display) -> SpeedlineError {
    SpeedlineError::RenderError {
        message: err.to_string(),
    }
}

// ============================================================================
// KML
// ============================================================================

/// Writes one colored `Placemark` per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlRenderer {
    /// Default namespace of the `<kml>` root element
    pub namespace: String,
    /// `<Document><name>`
    pub document_name: String,
    /// Line width in pixels
    pub line_width: f64,
}

impl Default for KmlRenderer {
    fn default() -> Self {
        Self {
            namespace: KML_NAMESPACE.to_string(),
            document_name: "Speedline".to_string(),
            line_width: 4.0,
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;

fn write_event(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(render_error)
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

impl KmlRenderer {
    fn write_placemark(
        &self,
        writer: &mut XmlWriter,
        number: usize,
        colored: &ColoredSegment,
    ) -> Result<()> {
        write_event(writer, Event::Start(BytesStart::new("Placemark")))?;
        write_text_element(writer, "name", &format!("Segment {}", number))?;
        write_text_element(writer, "description", &colored.label())?;

        write_event(writer, Event::Start(BytesStart::new("Style")))?;
        write_event(writer, Event::Start(BytesStart::new("LineStyle")))?;
        write_text_element(writer, "color", &colored.color.to_kml_hex())?;
        write_text_element(writer, "width", &self.line_width.to_string())?;
        write_event(writer, Event::End(BytesEnd::new("LineStyle")))?;
        write_event(writer, Event::End(BytesEnd::new("Style")))?;

        let coordinates = colored
            .segment
            .points()
            .iter()
            .map(|p| format!("{},{},{}", p.longitude, p.latitude, p.elevation))
            .collect::<Vec<_>>()
            .join("\n");

        write_event(writer, Event::Start(BytesStart::new("LineString")))?;
        write_text_element(writer, "tessellate", "1")?;
        write_text_element(writer, "altitudeMode", "clampToGround")?;
        write_text_element(writer, "coordinates", &coordinates)?;
        write_event(writer, Event::End(BytesEnd::new("LineString")))?;

        write_event(writer, Event::End(BytesEnd::new("Placemark")))
    }
}

impl OverlayRenderer for KmlRenderer {
    fn render(&self, report: &TrackReport) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(
            &mut writer,
            Event::Start(
                BytesStart::new("kml").with_attributes([("xmlns", self.namespace.as_str())]),
            ),
        )?;
        write_event(&mut writer, Event::Start(BytesStart::new("Document")))?;
        write_text_element(&mut writer, "name", &self.document_name)?;
        write_event(&mut writer, Event::Start(BytesStart::new("Folder")))?;

        for (i, colored) in report.segments.iter().enumerate() {
            self.write_placemark(&mut writer, i + 1, colored)?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new("Folder")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("Document")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("kml")))?;

        let kml = String::from_utf8(writer.into_inner()).map_err(render_error)?;
        info!(
            "[Render] Wrote KML with {} placemarks ({} bytes)",
            report.segments.len(),
            kml.len()
        );
        Ok(kml)
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Serializes the whole report with serde_json.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl OverlayRenderer for JsonRenderer {
    fn render(&self, report: &TrackReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        json.map_err(render_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::build_report;
    use crate::test_support::*;
    use crate::SpeedlineConfig;

    fn sample_report() -> TrackReport {
        let offsets: Vec<f64> = (0..12).map(|i| i as f64 * 150.0).collect();
        build_report(&track_along_line(&offsets), &SpeedlineConfig::default()).unwrap()
    }

    #[test]
    fn test_kml_has_placemark_per_segment() {
        let report = sample_report();
        let kml = KmlRenderer::default().render(&report).unwrap();

        assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(kml.contains(r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#));
        assert_eq!(kml.matches("<Placemark>").count(), report.segments.len());
        assert!(kml.contains(&format!(
            "<color>{}</color>",
            report.segments[0].color.to_kml_hex()
        )));
        assert!(kml.contains("Average speed"));
    }

    #[test]
    fn test_kml_coordinates_are_lon_lat_ele() {
        let report = sample_report();
        let kml = KmlRenderer::default().render(&report).unwrap();
        let first = report.segments[0].segment.first();
        let expected = format!("{},{},{}", first.longitude, first.latitude, first.elevation);
        assert!(kml.contains(&format!("<coordinates>{}", expected)), "{}", kml);
    }

    #[test]
    fn test_kml_custom_namespace() {
        let renderer = KmlRenderer {
            namespace: "urn:test".to_string(),
            document_name: "Evening <Run>".to_string(),
            ..Default::default()
        };
        let kml = renderer.render(&sample_report()).unwrap();
        assert!(kml.contains(r#"<kml xmlns="urn:test">"#));
        assert!(kml.contains("Evening &lt;Run&gt;"));
    }

    #[test]
    fn test_json_round_trips_through_value() {
        let report = sample_report();
        let json = JsonRenderer::default().render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let segments = value["segments"].as_array().unwrap();
        assert_eq!(segments.len(), report.segments.len());
        assert!(value["bounds"]["low"].as_f64().unwrap() <= value["bounds"]["high"].as_f64().unwrap());
        assert_eq!(segments[0]["color"]["blue"], 0);
        assert!(segments[0]["segment"]["points"].as_array().unwrap().len() >= 1);
    }
}
