use ahash::AHashMap;
use std::fmt;

/// Every node kind the converter knows how to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    Sink,
    Select,
    Filter,
    Formula,
    Sort,
    Unique,
    Summarize,
    PatternExtract,
    RemoteFetch,
    Union,
    Join,
    TextInput,
    AutoField,
    Unknown,
}

impl NodeKind {
    /// All kinds that have a catalog tag, i.e. everything except `Unknown`.
    pub const CATALOG: [NodeKind; 14] = [
        NodeKind::Source,
        NodeKind::Sink,
        NodeKind::Select,
        NodeKind::Filter,
        NodeKind::Formula,
        NodeKind::Sort,
        NodeKind::Unique,
        NodeKind::Summarize,
        NodeKind::PatternExtract,
        NodeKind::RemoteFetch,
        NodeKind::Union,
        NodeKind::Join,
        NodeKind::TextInput,
        NodeKind::AutoField,
    ];

    /// The plugin identifier segment this kind is known by.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Source => "DbFileInput",
            NodeKind::Sink => "DbFileOutput",
            NodeKind::Select => "AlteryxSelect",
            NodeKind::Filter => "Filter",
            NodeKind::Formula => "Formula",
            NodeKind::Sort => "Sort",
            NodeKind::Unique => "Unique",
            NodeKind::Summarize => "Summarize",
            NodeKind::PatternExtract => "RegEx",
            NodeKind::RemoteFetch => "Download",
            NodeKind::Union => "Union",
            NodeKind::Join => "Join",
            NodeKind::TextInput => "TextInput",
            NodeKind::AutoField => "AutoField",
            NodeKind::Unknown => "Unknown",
        }
    }

    /// Exact, case-sensitive lookup of a catalog tag.
    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        NodeKind::CATALOG.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Resolves plugin identifiers such as `AlteryxBasePluginsGui.Join.Join` to a
/// [`NodeKind`].
///
/// Matching is exact, never by substring: `JoinMultiple` is not a `Join`.
/// The whole identifier is tried first, then its dot-separated segments from
/// last to first, so the class name at the end of a qualified identifier
/// decides. At each step a registered alias beats the built-in catalog.
#[derive(Debug, Clone, Default)]
pub struct KindClassifier {
    aliases: AHashMap<String, NodeKind>,
}

impl KindClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treats `plugin` (a full identifier or a single segment) as `kind`.
    pub fn alias(&mut self, plugin: impl Into<String>, kind: NodeKind) {
        self.aliases.insert(plugin.into(), kind);
    }

    pub fn classify(&self, plugin: &str) -> NodeKind {
        std::iter::once(plugin)
            .chain(plugin.rsplit('.'))
            .find_map(|candidate| {
                self.aliases
                    .get(candidate)
                    .copied()
                    .or_else(|| NodeKind::from_tag(candidate))
            })
            .unwrap_or(NodeKind::Unknown)
    }
}
