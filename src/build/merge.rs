//! Single-pass splicing of inclusion content into a template source.
//!
//! The merger copies a document event stream to a sink. Wherever the
//! stream carries an inclusion-point marker (`include` in the stdlib
//! namespace), the referenced template's compiled content is spliced in
//! and the marker's original nested content is discarded. Nothing else is
//! buffered: state is one depth counter plus the currently-open inclusion
//! reader.

use std::collections::HashMap;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::cache::ContentHandle;
use crate::error::{Error, Result};
use crate::xml::{ATTR_NAME, NS_STDLIB, TAG_INCLUDE, XmlWriter, attr, create_ns_reader, create_xml_reader};

/// Splices resolved inclusion content into one template's source stream.
pub struct Merger<'a> {
    template: &'a str,
    /// Slot name -> compiled content; `None` means "splice nothing".
    inclusions: &'a HashMap<String, Option<ContentHandle>>,
}

impl<'a> Merger<'a> {
    pub fn new(
        template: &'a str,
        inclusions: &'a HashMap<String, Option<ContentHandle>>,
    ) -> Self {
        Self {
            template,
            inclusions,
        }
    }

    /// Copy `source` into `writer`, replacing every inclusion marker with
    /// its mapped content.
    pub fn merge(&self, source: &[u8], writer: &mut XmlWriter) -> Result<()> {
        let mut reader = create_ns_reader(source);

        loop {
            let (resolve, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(ref e) if is_include(&resolve, e) => {
                    self.splice(e, writer)?;
                    self.skip_marker_body(&mut reader)?;
                }
                Event::Empty(ref e) if is_include(&resolve, e) => {
                    self.splice(e, writer)?;
                }
                Event::Eof => break,
                ev => writer.write_event(ev)?,
            }
        }

        Ok(())
    }

    /// Write the mapped content of one inclusion point.
    fn splice(&self, marker: &BytesStart<'_>, writer: &mut XmlWriter) -> Result<()> {
        let slot = attr(marker, ATTR_NAME).ok_or_else(|| Error::MissingInclusionName {
            template: self.template.to_string(),
        })?;

        match self.inclusions.get(&slot) {
            None => Err(Error::UnknownInclusion {
                template: self.template.to_string(),
                slot,
            }),
            Some(None) => Ok(()),
            Some(Some(content)) => copy_body(content, writer),
        }
    }

    /// Discard the original events nested under a non-empty marker,
    /// including the marker's own end tag.
    fn skip_marker_body(&self, reader: &mut NsReader<&[u8]>) -> Result<()> {
        let mut depth = 1u32;
        while depth > 0 {
            match reader.read_resolved_event()?.1 {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(Error::UnclosedInclusion {
                        template: self.template.to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn is_include(resolve: &ResolveResult<'_>, elem: &BytesStart<'_>) -> bool {
    matches!(resolve, ResolveResult::Bound(Namespace(ns)) if *ns == NS_STDLIB.as_bytes())
        && elem.local_name().as_ref() == TAG_INCLUDE.as_bytes()
}

/// Copy every event of `content` except its document framing.
fn copy_body(content: &[u8], writer: &mut XmlWriter) -> Result<()> {
    let mut reader = create_xml_reader(content);
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Decl(_) | Event::DocType(_) => {}
            ev => writer.write_event(ev)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::create_writer;
    use std::sync::Arc;

    fn merge(
        template: &str,
        inclusions: &HashMap<String, Option<ContentHandle>>,
        source: &[u8],
    ) -> Result<Vec<u8>> {
        let mut writer = create_writer();
        Merger::new(template, inclusions).merge(source, &mut writer)?;
        Ok(writer.into_inner().into_inner())
    }

    fn slot(name: &str, content: &[u8]) -> HashMap<String, Option<ContentHandle>> {
        let mut map = HashMap::new();
        map.insert(name.to_string(), Some(Arc::new(content.to_vec())));
        map
    }

    #[test]
    fn test_passthrough_without_markers() {
        let source = br#"<html><body><p class="x">hi</p></body></html>"#;
        let out = merge("page", &HashMap::new(), source).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_empty_marker_is_replaced() {
        let source =
            br#"<html xmlns:w="urn:weft:stdlib"><w:include name="header"/></html>"#;
        let out = merge("page", &slot("header", b"<h1>Title</h1>"), source).unwrap();
        assert_eq!(
            out,
            br#"<html xmlns:w="urn:weft:stdlib"><h1>Title</h1></html>"#
        );
    }

    #[test]
    fn test_marker_with_nested_content_is_skipped() {
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="header"><fallback><b>old</b></fallback></w:include><footer/></html>"#;
        let out = merge("page", &slot("header", b"<h1/>"), source).unwrap();
        assert_eq!(
            out,
            br#"<html xmlns:w="urn:weft:stdlib"><h1/><footer/></html>"#
        );
    }

    #[test]
    fn test_default_namespace_marker() {
        let source = br#"<doc><include xmlns="urn:weft:stdlib" name="body"/></doc>"#;
        let out = merge("page", &slot("body", b"<p/>"), source).unwrap();
        assert_eq!(out, br#"<doc><p/></doc>"#);
    }

    #[test]
    fn test_unprefixed_include_outside_namespace_is_copied() {
        let source = br#"<doc><include name="body"/></doc>"#;
        let out = merge("page", &HashMap::new(), source).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_null_slot_removes_region_silently() {
        let mut inclusions: HashMap<String, Option<ContentHandle>> = HashMap::new();
        inclusions.insert("header".to_string(), None);

        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="header"><old/></w:include><p/></html>"#;
        let out = merge("page", &inclusions, source).unwrap();
        assert_eq!(out, br#"<html xmlns:w="urn:weft:stdlib"><p/></html>"#);
    }

    #[test]
    fn test_missing_name_attribute_is_fatal() {
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include/></html>"#;
        let err = merge("page", &HashMap::new(), source).unwrap_err();
        assert!(matches!(err, Error::MissingInclusionName { template } if template == "page"));
    }

    #[test]
    fn test_unknown_slot_is_fatal() {
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="side"/></html>"#;
        let err = merge("page", &slot("header", b"<h1/>"), source).unwrap_err();
        match err {
            Error::UnknownInclusion { template, slot } => {
                assert_eq!(template, "page");
                assert_eq!(slot, "side");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spliced_content_framing_is_dropped() {
        let content = br#"<?xml version="1.0"?><h1>t</h1>"#;
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="h"/></html>"#;
        let out = merge("page", &slot("h", content), source).unwrap();
        assert_eq!(out, br#"<html xmlns:w="urn:weft:stdlib"><h1>t</h1></html>"#);
    }

    #[test]
    fn test_unclosed_marker_is_fatal() {
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="h"><dangling>"#;
        let err = merge("page", &slot("h", b"<x/>"), source).unwrap_err();
        assert!(matches!(err, Error::UnclosedInclusion { .. }));
    }

    #[test]
    fn test_text_and_depth_preserved_in_splice() {
        let content = b"intro<div><span>deep</span></div>outro";
        let source = br#"<html xmlns:w="urn:weft:stdlib"><w:include name="b"/></html>"#;
        let out = merge("page", &slot("b", content), source).unwrap();
        assert_eq!(
            out,
            br#"<html xmlns:w="urn:weft:stdlib">intro<div><span>deep</span></div>outro</html>"#
        );
    }
}
