use super::Element;
use crate::error::DocumentError;
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

/// Reads workflow markup into an [`Element`] tree.
///
/// Whitespace-only text is dropped, entities are unescaped, and CDATA
/// sections are kept apart from plain text. Declarations, comments and
/// processing instructions are skipped. Only the first top-level element is
/// kept as the root.
pub fn parse_document(source: &str) -> Result<Element, DocumentError> {
    let mut reader = XmlReader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| DocumentError::Xml {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        match event {
            XmlEvent::Start(start) => {
                stack.push(open_element(&start, reader.buffer_position())?);
            }
            XmlEvent::Empty(start) => {
                let element = open_element(&start, reader.buffer_position())?;
                attach(&mut stack, &mut root, element);
            }
            XmlEvent::End(end) => {
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| DocumentError::MismatchedTag {
                    expected: String::new(),
                    found: found.clone(),
                })?;
                if element.name != found {
                    return Err(DocumentError::MismatchedTag {
                        expected: element.name,
                        found,
                    });
                }
                attach(&mut stack, &mut root, element);
            }
            XmlEvent::Text(text) => {
                let value = text.unescape().map_err(|e| DocumentError::Xml {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })?;
                if let Some(current) = stack.last_mut() {
                    current.text.get_or_insert_with(String::new).push_str(&value);
                }
            }
            XmlEvent::CData(cdata) => {
                let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                if let Some(current) = stack.last_mut() {
                    current.cdata.get_or_insert_with(String::new).push_str(&value);
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DocumentError::UnexpectedEof(open.name));
    }
    root.ok_or(DocumentError::Empty)
}

fn open_element(start: &BytesStart<'_>, position: u64) -> Result<Element, DocumentError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml {
            position,
            message: e.to_string(),
        })?;
        let value = attr.unescape_value().map_err(|e| DocumentError::Xml {
            position,
            message: e.to_string(),
        })?;
        element.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
