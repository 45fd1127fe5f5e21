//! SVG document building blocks

use super::RenderResult;
use geo::{Coord, LineString, MultiPolygon};
use std::fmt::{self, Write};

/// In-memory SVG document
///
/// Implements `fmt::Write` so `write!` / `writeln!` work directly on it.
pub struct SvgDocument {
    out: String,
}

impl Write for SvgDocument {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

impl SvgDocument {
    /// Start a document with the opening `<svg>` tag and a white background
    pub fn new(width: f64, height: f64, class: &str) -> RenderResult<Self> {
        let mut doc = Self { out: String::new() };
        writeln!(
            doc,
            r##"<svg xmlns="http://www.w3.org/2000/svg" class="{class}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##,
        )?;
        writeln!(doc, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(doc)
    }

    /// Embed a stylesheet
    pub fn style(&mut self, css: &str) -> RenderResult<()> {
        writeln!(self, "<defs><style>{}</style></defs>", css)?;
        Ok(())
    }

    /// Centered text, used for titles and empty-state messages
    pub fn centered_text(&mut self, x: f64, y: f64, class: &str, text: &str) -> RenderResult<()> {
        writeln!(
            self,
            r#"<text class="{}" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            class,
            x,
            y,
            escape_xml(text)
        )?;
        Ok(())
    }

    /// Close the `<svg>` tag and return the markup
    pub fn finish(mut self) -> RenderResult<String> {
        writeln!(self, "</svg>")?;
        Ok(self.out)
    }
}

/// Escape text for use in SVG/HTML content and attributes
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
pub fn ring_to_path(ring: &LineString<f64>, project: &impl Fn(&Coord<f64>) -> (f64, f64), out: &mut String) {
    let mut coords = ring.0.iter().map(project);
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!("M{x:.2},{y:.2}"));
        for (x, y) in coords {
            out.push_str(&format!("L{x:.2},{y:.2}"));
        }
        out.push('Z');
    }
}

/// Path data for a multipolygon (exteriors and holes)
pub fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &impl Fn(&Coord<f64>) -> (f64, f64)) -> String {
    let mut out = String::new();
    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    #[test]
    fn test_document_shell() {
        let doc = SvgDocument::new(100.0, 50.0, "chart").unwrap();
        let svg = doc.finish().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml("Bosnia & <Herz.>"), "Bosnia &amp; &lt;Herz.&gt;");
        assert_eq!(escape_xml(r#"Côte d'Ivoire "CI""#), "Côte d&#39;Ivoire &quot;CI&quot;");
    }

    #[test]
    fn test_path_with_hole() {
        let outer: Polygon<f64> = polygon![
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]],
        ];
        let shape = MultiPolygon::new(vec![outer]);
        let path = multipolygon_to_path(&shape, &|c: &Coord<f64>| (c.x * 10.0, c.y * 10.0));

        assert!(path.starts_with("M0.00,0.00L40.00,0.00"));
        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(path.matches('Z').count(), 2);
    }

    #[test]
    fn test_empty_shape() {
        let path = multipolygon_to_path(&MultiPolygon::new(vec![]), &|c: &Coord<f64>| (c.x, c.y));
        assert!(path.is_empty());
    }
}
