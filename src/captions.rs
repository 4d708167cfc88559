use std::borrow::Cow;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use crate::error::ExtractError;

const SEGMENT_TAG: &[u8] = b"text";

/// Flatten a caption XML payload into one line of plain text.
///
/// Every `<text>` element is a segment, taken in document order. Segments are
/// joined with exactly one space and the result is trimmed, so a track with no
/// segments yields an empty string.
pub fn parse_caption_xml(xml: &str) -> Result<String, ExtractError> {
    let segments = read_segments(xml)?;
    debug!("Parsed {} caption segments", segments.len());

    let markup = Regex::new(r"</?[A-Za-z][^>]*>").map_err(|e| ExtractError::ParseError(e.to_string()))?;
    let text = segments
        .iter()
        .map(|raw| decode_segment(raw, &markup))
        .collect::<Vec<_>>()
        .join(" ");

    Ok(text.trim().to_string())
}

/// Raw text content of each segment, XML entities already resolved
fn read_segments(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<String> = None;
    // Elements nested inside the open segment
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if current.is_some() {
                    depth += 1;
                } else if e.name().as_ref() == SEGMENT_TAG {
                    current = Some(String::new());
                    depth = 0;
                }
            }
            Ok(Event::End(_)) if current.is_some() => {
                if depth == 0 {
                    segments.extend(current.take());
                } else {
                    depth -= 1;
                }
            }
            Ok(Event::Empty(ref e)) if current.is_none() && e.name().as_ref() == SEGMENT_TAG => {
                segments.push(String::new());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(buf) = current.as_mut() {
                    // Fall back to the raw bytes for entities XML does not know (e.g. &nbsp;)
                    let text = e
                        .unescape()
                        .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(e).into_owned()));
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::ParseError(e.to_string())),
            _ => {}
        }
    }

    if current.is_some() {
        return Err(ExtractError::ParseError("unterminated <text> element".to_string()));
    }

    Ok(segments)
}

/// YouTube escapes segment text twice, so HTML entities survive the XML pass.
/// Tags the second decode exposes (e.g. `<font>`) are dropped. A `<` that
/// cannot open a tag, as in `5 < 6` or `<3`, stays as text.
fn decode_segment(raw: &str, markup: &Regex) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    markup.replace_all(&decoded, "").into_owned()
}
