//! XML stream plumbing shared by the build and render pipelines.
//!
//! Provides configured reader/writer construction, the reserved marker
//! vocabulary, and attribute access helpers.

use quick_xml::events::BytesStart;
use quick_xml::{NsReader, Reader, Writer};
use std::io::Cursor;

/// Namespace of the reserved marker vocabulary (`include`, action markers).
pub const NS_STDLIB: &str = "urn:weft:stdlib";

/// Prefix used when this crate synthesizes marker elements itself.
pub const STDLIB_PREFIX: &str = "weft";

/// Local name of the inclusion-point marker element.
pub const TAG_INCLUDE: &str = "include";

/// Local name of the deferred-action start marker.
pub const TAG_ACTION_START: &str = "action-start";

/// Local name of the deferred-action end marker.
pub const TAG_ACTION_END: &str = "action-end";

/// Attribute naming the inclusion slot on an `include` marker.
pub const ATTR_NAME: &str = "name";

/// Attribute carrying the action id on action markers.
pub const ATTR_ID: &str = "id";

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Create a configured XML reader over borrowed content bytes.
#[inline]
pub fn create_xml_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Create a namespace-resolving reader over borrowed content bytes.
#[inline]
pub fn create_ns_reader(content: &[u8]) -> NsReader<&[u8]> {
    let mut reader = NsReader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Create a configured reader that owns its content.
#[inline]
pub fn create_owned_reader(content: Vec<u8>) -> Reader<Cursor<Vec<u8>>> {
    let mut reader = Reader::from_reader(Cursor::new(content));
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Create a writer backed by an in-memory buffer.
#[inline]
pub fn create_writer() -> XmlWriter {
    Writer::new(Cursor::new(Vec::new()))
}

/// Returns the value of the named attribute, or `None` if absent.
pub fn attr(elem: &BytesStart<'_>, name: &str) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(a.value.as_ref()).into_owned())
}

/// Returns the value of the named attribute, or `default` if absent.
pub fn attr_or(elem: &BytesStart<'_>, name: &str, default: &str) -> String {
    attr(elem, name).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    fn first_start(content: &[u8]) -> BytesStart<'static> {
        let mut reader = create_xml_reader(content);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no start element in {content:?}"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_attr_present() {
        let e = first_start(br#"<w:include name="header"/>"#);
        assert_eq!(attr(&e, ATTR_NAME).as_deref(), Some("header"));
    }

    #[test]
    fn test_attr_absent() {
        let e = first_start(b"<w:include/>");
        assert_eq!(attr(&e, ATTR_NAME), None);
    }

    #[test]
    fn test_attr_or_default() {
        let e = first_start(b"<item/>");
        assert_eq!(attr_or(&e, "kind", "plain"), "plain");
    }

    #[test]
    fn test_reader_preserves_text() {
        // trim_text is off: surrounding whitespace must survive
        let mut reader = create_xml_reader(b"<a> x </a>");
        assert!(matches!(reader.read_event().unwrap(), Event::Start(_)));
        match reader.read_event().unwrap() {
            Event::Text(t) => assert_eq!(&*t, b" x "),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
