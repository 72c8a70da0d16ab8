use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One node of the attribute tree: a named element with ordered attributes,
/// optional character data, and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub cdata: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_cdata(mut self, cdata: impl Into<String>) -> Self {
        self.cdata = Some(cdata.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the first attribute called `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, treating an empty string the same as no text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// CDATA content, treating an empty section the same as none.
    pub fn cdata(&self) -> Option<&str> {
        self.cdata.as_deref().filter(|t| !t.is_empty())
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children called `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a chain of first-child lookups, e.g. `["Properties", "Configuration"]`.
    pub fn path(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Text of the element at `path`, if it exists and is non-empty.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.path(path).and_then(Element::text)
    }

    /// Attribute `name` of the element at `path`.
    pub fn attr_at(&self, path: &[&str], name: &str) -> Option<&str> {
        self.path(path).and_then(|e| e.attr(name))
    }
}

// Attributes serialize as a map so the raw view reads like the source markup.
impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Attributes<'a>(&'a [(String, String)]);

        impl Serialize for Attributes<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
            }
        }

        let mut state = serializer.serialize_struct("Element", 5)?;
        state.serialize_field("name", &self.name)?;
        if self.attributes.is_empty() {
            state.skip_field("attributes")?;
        } else {
            state.serialize_field("attributes", &Attributes(&self.attributes))?;
        }
        match &self.text {
            Some(text) => state.serialize_field("text", text)?,
            None => state.skip_field("text")?,
        }
        match &self.cdata {
            Some(cdata) => state.serialize_field("cdata", cdata)?,
            None => state.skip_field("cdata")?,
        }
        if self.children.is_empty() {
            state.skip_field("children")?;
        } else {
            state.serialize_field("children", &self.children)?;
        }
        state.end()
    }
}
