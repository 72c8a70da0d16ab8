//! The attribute tree that workflow markup is read into.
//!
//! The converter never looks at raw markup. It only walks an [`Element`]
//! tree, so any front end that can produce one (the bundled quick-xml reader,
//! a test fixture, a JSON import) can feed it.

mod element;
mod xml;

pub use element::Element;
pub use xml::parse_document;
