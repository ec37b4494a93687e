//! Tag-event source for the result parser.
//!
//! Drives a tolerant `quick-xml` reader over an HTML fragment and reports
//! start tags, end tags and text to a [`TagSink`] in document order. No tree
//! is built. Tag and attribute names are lowercased; self-closing elements
//! are reported as a start followed by an end.

use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace, warn};

/// One attribute of a start tag. Valueless attributes such as
/// `<input disabled>` carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Entity-decoded value.
    pub value: String,
}

impl TagAttribute {
    /// Creates an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receiver of tag events.
pub trait TagSink {
    /// `<tag attrs..>`
    fn start_tag(&mut self, tag: &str, attrs: &[TagAttribute]);
    /// `</tag>`
    fn end_tag(&mut self, tag: &str);
    /// Character data between tags.
    fn text(&mut self, data: &str);
}

/// Why the event stream stopped before the end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeStop {
    /// Byte offset in the input where the unterminated markup starts.
    pub position: u64,
    /// Reader error message.
    pub reason: String,
}

/// Feeds every event of `html` into `sink`.
///
/// Markup the reader rejects, such as `<![if !IE]>` or `<!x>`, is skipped
/// up to the next `>` and reading resumes after it. Returns `Err` only when
/// rejected markup has no closing `>` before the end of input; the events
/// delivered up to that point have already been applied to the sink.
pub fn tokenize<S: TagSink + ?Sized>(html: &str, sink: &mut S) -> Result<(), TokenizeStop> {
    let mut offset = 0;
    while offset < html.len() {
        let rest = &html[offset..];
        match tokenize_until_error(rest, sink) {
            Ok(()) => return Ok(()),
            Err((markup_start, reason)) => {
                let position = offset + markup_start;
                // `markup_start` points at the `<` of the rejected markup.
                let Some(close) = html.get(position + 1..).and_then(|tail| tail.find('>')) else {
                    warn!(position, reason = %reason, "unterminated markup at end of input");
                    return Err(TokenizeStop {
                        position: position as u64,
                        reason,
                    });
                };
                let resume = position + 1 + close + 1;
                let skipped = &html[position..resume];
                debug!(
                    position,
                    skipped,
                    reason = %reason,
                    "skipping unreadable markup"
                );
                offset = resume;
            }
        }
    }
    Ok(())
}

/// Runs one reader over `html`. On a reader error returns the byte offset
/// where the failing event started, with the error message.
fn tokenize_until_error<S: TagSink + ?Sized>(
    html: &str,
    sink: &mut S,
) -> Result<(), (usize, String)> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    loop {
        let event_start = usize::try_from(reader.buffer_position()).unwrap_or(html.len());
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e.name().as_ref());
                sink.start_tag(&tag, &attributes(e));
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(e.name().as_ref());
                sink.start_tag(&tag, &attributes(e));
                sink.end_tag(&tag);
            }
            Ok(Event::End(ref e)) => {
                sink.end_tag(&tag_name(e.name().as_ref()));
            }
            Ok(Event::Text(ref e)) => {
                sink.text(&decode_entities(&String::from_utf8_lossy(e)));
            }
            Ok(Event::CData(ref e)) => {
                sink.text(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => return Ok(()),
            Ok(other) => trace!(event = ?other, "skipping markup event"),
            Err(error) => {
                // Text is its own event, so the failing event starts at `<`.
                let markup_start = html[event_start.min(html.len())..]
                    .find('<')
                    .map_or(html.len(), |i| event_start + i);
                return Err((markup_start, error.to_string()));
            }
        }
    }
}

/// Decodes character references one at a time.
///
/// Named HTML5 entities and `&#NN;` / `&#xHH;` references are replaced; an
/// `&` that does not start a known reference is kept as is.
#[must_use]
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .and_then(|end| decode_reference(&tail[..end]).map(|c| (end, c)));
        match decoded {
            Some((end, replacement)) => {
                out.push_str(&replacement);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<Cow<'static, str>> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(|c| Cow::Owned(c.to_string()));
    }
    resolve_html5_entity(name).map(Cow::Borrowed)
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn attributes(start: &BytesStart<'_>) -> Vec<TagAttribute> {
    start
        .html_attributes()
        .filter_map(|attr| match attr {
            Ok(attr) => {
                let name = tag_name(attr.key.as_ref());
                let value = decode_entities(&String::from_utf8_lossy(&attr.value)).into_owned();
                Some(TagAttribute::new(name, value))
            }
            Err(error) => {
                trace!(error = %error, "skipping malformed attribute");
                None
            }
        })
        .collect()
}
