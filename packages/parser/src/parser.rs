//! XML reader over `quick-xml`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ast::{XmlDocument, XmlElement};
use crate::error::{ParseError, ParseResult};

/// Parse raw bytes (UTF-8, or UTF-16 with a byte order mark).
pub fn parse(bytes: &[u8]) -> ParseResult<XmlDocument> {
    let source = decode(bytes)?;
    Parser::new(&source).parse()
}

/// Parse an already decoded string.
pub fn parse_str(source: &str) -> ParseResult<XmlDocument> {
    Parser::new(source).parse()
}

fn decode(bytes: &[u8]) -> ParseResult<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return utf16(rest, u16::from_be_bytes);
    }
    utf8(bytes)
}

fn utf8(bytes: &[u8]) -> ParseResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::encoding(e.to_string()))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> ParseResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(ParseError::encoding("odd number of bytes in UTF-16 input"));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|e| ParseError::encoding(e.to_string()))
}

/// Streaming tree builder.
pub struct Parser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    newlines: Vec<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);
        let newlines = source
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self {
            source,
            reader,
            newlines,
        }
    }

    pub fn parse(mut self) -> ParseResult<XmlDocument> {
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut pending_comment: Option<String> = None;
        let mut comments = 0;

        loop {
            let before = self.reader.buffer_position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| ParseError::syntax(self.line_at(before), e.to_string()))?;
            let after = self.reader.buffer_position();

            match event {
                Event::Start(start) => {
                    let element = self.element(&start, after, pending_comment.take())?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.element(&start, after, pending_comment.take())?;
                    attach(&mut stack, &mut root, element, self.line_at(after))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::syntax(self.line_at(after), "unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element, self.line_at(after))?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ParseError::syntax(self.line_at(after), e.to_string()))?;
                    self.push_text(&mut stack, &text, after)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    self.push_text(&mut stack, &text, after)?;
                }
                Event::Comment(comment) => {
                    comments += 1;
                    pending_comment = Some(String::from_utf8_lossy(&comment).trim().to_string());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::unclosed(open.tag.clone(), open.line));
        }
        let root = root.ok_or(ParseError::NoRoot)?;
        Ok(XmlDocument { root, comments })
    }

    fn element(
        &self,
        start: &BytesStart<'_>,
        end: usize,
        comment: Option<String>,
    ) -> ParseResult<XmlElement> {
        let offset = self.source[..end].rfind('<').unwrap_or(0);
        let line = self.line_at(offset);

        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        element.line = line;
        element.comment = comment;
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| ParseError::syntax(line, e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| ParseError::syntax(line, e.to_string()))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn push_text(&self, stack: &mut [XmlElement], text: &str, at: usize) -> ParseResult<()> {
        match stack.last_mut() {
            Some(current) => {
                current.text.get_or_insert_with(String::new).push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(ParseError::syntax(self.line_at(at), "text outside of the root element")),
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    line: usize,
) -> ParseResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::syntax(line, "more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_with_lines() {
        let source = "<?xml version=\"1.0\"?>\n<config>\n  <moduleName>Test</moduleName>\n  <installSteps order=\"Explicit\"/>\n</config>\n";
        let doc = parse(source.as_bytes()).unwrap();

        assert_eq!(doc.root.tag, "config");
        assert_eq!(doc.root.line, 2);
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[0].text.as_deref(), Some("Test"));
        assert_eq!(doc.root.children[0].line, 3);
        assert_eq!(doc.root.children[1].attribute("order"), Some("Explicit"));
        assert_eq!(doc.root.children[1].line, 4);
    }

    #[test]
    fn test_comments_attach_to_next_element() {
        let source = "<fomod><!-- the name --><Name>A</Name><!-- dangling --></fomod>";
        let doc = parse(source.as_bytes()).unwrap();

        assert_eq!(doc.comments, 2);
        assert_eq!(doc.root.children[0].comment.as_deref(), Some("the name"));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let source = r#"<flag name="a &amp; b">&lt;on&gt;</flag>"#;
        let doc = parse(source.as_bytes()).unwrap();
        assert_eq!(doc.root.attribute("name"), Some("a & b"));
        assert_eq!(doc.root.text.as_deref(), Some("<on>"));
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let err = parse(b"<config>\n<moduleName></config>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_root_fails() {
        let err = parse(b"<config>\n  <moduleName/>\n").unwrap_err();
        assert_eq!(err, ParseError::unclosed("config", 1));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert_eq!(parse(b"   ").unwrap_err(), ParseError::NoRoot);
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<fomod><Name>Ü</Name></fomod>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = parse(&bytes).unwrap();
        assert_eq!(doc.root.children[0].text.as_deref(), Some("Ü"));
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        assert!(matches!(parse(&[0x3C, 0xFF, 0x3E]), Err(ParseError::Encoding(_))));
    }
}
