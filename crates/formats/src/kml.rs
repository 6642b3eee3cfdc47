//! Placemark extraction from KML documents.
//!
//! Only the subset the survey datasets use is understood: `<Placemark>`
//! records with a `<name>` and a `<coordinates>` tuple list. The scanner is
//! tag-based rather than a full XML parser; nested `<Placemark>` elements are
//! not valid KML and are not supported.

use foundation::geo::LatLng;
use tracing::warn;

use crate::error::FormatError;
use crate::point::{
    ParsedPoints, SkippedRecord, SurveyPoint, fallback_cell_id, non_empty_trimmed, synthetic_id,
};

pub fn parse_kml_points(payload: &str) -> Result<ParsedPoints, FormatError> {
    let doc = payload.trim_start_matches('\u{feff}');
    if root_element_name(doc).map(local_name) != Some("kml") {
        return Err(FormatError::NotKml);
    }

    let mut out = ParsedPoints::default();
    let mut rest = doc;
    let mut index = 0usize;
    while let Some(open) = find_open_tag(rest, "Placemark") {
        let after_open = &rest[open.at..];
        let close_tag = format!("</{}>", open.name);
        let Some(close) = after_open.find(&close_tag) else {
            let reason = "unterminated <Placemark>".to_string();
            warn!("skipping KML placemark {index}: {reason}");
            out.skipped.push(SkippedRecord { index, reason });
            break;
        };
        let block = &after_open[..close];
        match parse_placemark(index, block) {
            Ok(point) => out.points.push(point),
            Err(reason) => {
                warn!("skipping KML placemark {index}: {reason}");
                out.skipped.push(SkippedRecord { index, reason });
            }
        }
        index += 1;
        rest = &after_open[close + close_tag.len()..];
    }
    Ok(out)
}

fn parse_placemark(index: usize, block: &str) -> Result<SurveyPoint, String> {
    // Skip the placemark's own open tag so `<name>` lookups start inside it.
    let body = block.find('>').map(|i| &block[i + 1..]).unwrap_or("");

    let coords = element_text(body, "coordinates")
        .ok_or("placemark missing <coordinates>".to_string())?;
    let position = parse_coordinate_tuple(&coords)?;

    let display_name = element_text(body, "name").and_then(|s| non_empty_trimmed(&s));
    let cell_id = display_name
        .clone()
        .unwrap_or_else(|| fallback_cell_id(index));

    Ok(SurveyPoint {
        id: synthetic_id(index),
        cell_id,
        display_name,
        lat: position.lat,
        lng: position.lng,
    })
}

/// Parses the first `lng,lat[,alt]` tuple of a KML coordinate list.
fn parse_coordinate_tuple(raw: &str) -> Result<LatLng, String> {
    let tuple = raw
        .split_whitespace()
        .next()
        .ok_or("empty <coordinates>".to_string())?;
    let mut parts = tuple.split(',');
    let lng = parse_number(parts.next(), "lng")?;
    let lat = parse_number(parts.next(), "lat")?;
    LatLng::checked(lat, lng).ok_or(format!("coordinates out of range: {tuple}"))
}

fn parse_number(part: Option<&str>, what: &str) -> Result<f64, String> {
    let part = part
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(format!("coordinate tuple missing {what}"))?;
    part.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(format!("{what} is not a number: {part}"))
}

/// Name of the first element, skipping the XML declaration, comments,
/// processing instructions and doctype.
fn root_element_name(doc: &str) -> Option<&str> {
    let mut rest = doc;
    loop {
        let start = rest.find('<')?;
        rest = &rest[start..];
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
            continue;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            rest = &rest[rest.find('>')? + 1..];
            continue;
        }
        let name_end = rest[1..]
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .map(|i| i + 1)?;
        return Some(&rest[1..name_end]);
    }
}

fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// An open tag found by [`find_open_tag`].
struct OpenTag<'a> {
    /// Byte offset of the `<`.
    at: usize,
    /// Qualified name as written, prefix included.
    name: &'a str,
}

/// Next `<tag>` / `<tag ...>` open tag whose local name is `local`, with or
/// without a namespace prefix.
fn find_open_tag<'a>(haystack: &'a str, local: &str) -> Option<OpenTag<'a>> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find('<') {
        let at = from + rel;
        let rest = &haystack[at + 1..];
        if let Some(name_len) = rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            let name = &rest[..name_len];
            if !name.is_empty() && local_name(name) == local {
                return Some(OpenTag { at, name });
            }
        }
        from = at + 1;
    }
    None
}

/// Decoded text content of the first element named `local` in `block`.
fn element_text(block: &str, local: &str) -> Option<String> {
    let tag = find_open_tag(block, local)?;
    let open = &block[tag.at..];
    let open_end = open.find('>')?;
    if open[..open_end].ends_with('/') {
        return Some(String::new());
    }
    let inner = &open[open_end + 1..];
    let close = inner.find(&format!("</{}>", tag.name))?;
    Some(decode_text(&inner[..close]))
}

fn decode_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(cdata) = trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
    {
        return cdata.to_string();
    }
    decode_entities(trimmed)
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, parse_kml_points};
    use crate::error::FormatError;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported survey grid -->
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Survey grid</name>
    <Placemark id="p1">
      <name>A23</name>
      <Point><coordinates>-74.006,40.7128,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name><![CDATA[B&2]]></name>
      <Point><coordinates> 2.35,48.85 </coordinates></Point>
    </Placemark>
    <Placemark>
      <Point><coordinates>10.0,20.0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>broken</name>
      <Point><coordinates>abc,20.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

    #[test]
    fn extracts_placemarks_in_source_order() {
        let parsed = parse_kml_points(DOC).expect("parse");
        let ids: Vec<_> = parsed.points.iter().map(|p| p.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["A23", "B&2", "Point_2"]);
        assert!((parsed.points[0].lat - 40.7128).abs() < 1e-12);
        assert!((parsed.points[0].lng + 74.006).abs() < 1e-12);
        assert_eq!(parsed.points[2].display_name, None);
        assert_eq!(parsed.points[1].id, "pt-1");
    }

    #[test]
    fn bad_coordinates_skip_only_that_placemark() {
        let parsed = parse_kml_points(DOC).expect("parse");
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].index, 3);
    }

    #[test]
    fn document_name_is_not_taken_as_placemark_name() {
        let parsed = parse_kml_points(DOC).expect("parse");
        assert!(parsed.points.iter().all(|p| p.cell_id != "Survey grid"));
    }

    #[test]
    fn rejects_non_kml_roots() {
        assert_eq!(
            parse_kml_points("<html><body/></html>"),
            Err(FormatError::NotKml)
        );
        assert_eq!(parse_kml_points("not xml at all"), Err(FormatError::NotKml));
    }

    #[test]
    fn prefixed_root_is_accepted() {
        let doc = r#"<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2"></kml:kml>"#;
        let parsed = parse_kml_points(doc).expect("parse");
        assert!(parsed.points.is_empty());
    }

    #[test]
    fn prefixed_placemarks_are_read_by_local_name() {
        let doc = r#"<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2">
  <kml:Document>
    <kml:Placemark>
      <kml:name>C7</kml:name>
      <kml:Point><kml:coordinates>13.4,52.5</kml:coordinates></kml:Point>
    </kml:Placemark>
  </kml:Document>
</kml:kml>"#;
        let parsed = parse_kml_points(doc).expect("parse");
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.points.len(), 1);
        assert_eq!(parsed.points[0].cell_id, "C7");
        assert!((parsed.points[0].lat - 52.5).abs() < 1e-12);
        assert!((parsed.points[0].lng - 13.4).abs() < 1e-12);
    }

    #[test]
    fn similarly_named_tags_are_not_placemarks() {
        let doc = r#"<kml><PlacemarkStyle/><Placemark><name>D1</name>
<Point><coordinates>1,2</coordinates></Point></Placemark></kml>"#;
        let parsed = parse_kml_points(doc).expect("parse");
        let ids: Vec<_> = parsed.points.iter().map(|p| p.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["D1"]);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("A&amp;B &lt;1&gt; &#65;&#x42;"), "A&B <1> AB");
        assert_eq!(decode_entities("dangling & text"), "dangling & text");
    }
}
