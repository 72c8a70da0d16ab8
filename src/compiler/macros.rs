use super::translators::{Translation, TranslationContext};
use crate::diag::{DiagCategory, Diagnostic, codes};
use crate::document::Element;
use ahash::AHashMap;

/// Macro templates the converter knows how to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroTemplate {
    /// Great-circle distance in miles between two coordinate pairs.
    GreatArcs,
}

impl MacroTemplate {
    pub const CATALOG: [MacroTemplate; 1] = [MacroTemplate::GreatArcs];

    pub fn file_name(self) -> &'static str {
        match self {
            MacroTemplate::GreatArcs => "GreatArcs.yxmc",
        }
    }

    /// Looks a macro up by file name. Any directory part of `macro_name` is ignored.
    pub fn lookup(macro_name: &str) -> Option<MacroTemplate> {
        let file = macro_name.rsplit(['/', '\\']).next().unwrap_or(macro_name);
        MacroTemplate::CATALOG
            .into_iter()
            .find(|template| template.file_name() == file)
    }
}

const POINTS_VALUE: &str = "Input.Points";
const POINT_FIELDS: [&str; 4] = ["LatitudeA", "LongitudeA", "LatitudeB", "LongitudeB"];

/// Translates a node carrying a macro marker, whatever its plugin says.
pub fn translate_macro(ctx: &TranslationContext<'_>, macro_name: &str) -> Translation {
    match MacroTemplate::lookup(macro_name) {
        Some(MacroTemplate::GreatArcs) => translate_great_arcs(ctx),
        None => {
            tracing::warn!(id = ctx.node.id.as_str(), macro_name, "unsupported macro");
            Translation::bound(ctx.output)
                .statement(format!("{} = {}.copy()", ctx.output, ctx.input))
                .diagnostic(
                    Diagnostic::new(
                        codes::UNSUPPORTED_MACRO,
                        DiagCategory::UnsupportedKind,
                        format!("Unsupported macro: {}", macro_name),
                    )
                    .for_node(ctx.node.id.as_str()),
                )
        }
    }
}

/// Reads the `key=value` lines of the `Input.Points` blob.
fn point_mappings(config: &Element) -> AHashMap<&str, &str> {
    config
        .children_named("Value")
        .find(|value| value.attr("name") == Some(POINTS_VALUE))
        .and_then(|value| value.cdata().or_else(|| value.text()))
        .into_iter()
        .flat_map(str::lines)
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

fn translate_great_arcs(ctx: &TranslationContext<'_>) -> Translation {
    let out = ctx.output;
    let copy = format!("{} = {}.copy()", out, ctx.input);
    let mappings = point_mappings(ctx.config());

    let columns: Option<Vec<&str>> = POINT_FIELDS
        .iter()
        .map(|field| mappings.get(field).copied())
        .collect();
    let Some(columns) = columns else {
        let missing: Vec<&str> = POINT_FIELDS
            .into_iter()
            .filter(|field| !mappings.contains_key(field))
            .collect();
        tracing::warn!(id = ctx.node.id.as_str(), ?missing, "great-circle macro is missing point fields");
        return Translation::bound(out).statement(copy).diagnostic(
            Diagnostic::structural(
                codes::MISSING_CONFIGURATION,
                &ctx.node.id,
                format!(
                    "Great-circle macro {} has no mapping for {}",
                    ctx.node.id,
                    missing.join(", ")
                ),
            )
            .with_hint("map LatitudeA, LongitudeA, LatitudeB and LongitudeB in Input.Points"),
        );
    };

    let arguments = columns
        .iter()
        .map(|column| format!("    {out}['{column}']"))
        .collect::<Vec<_>>()
        .join(",\n");
    Translation::bound(out)
        .statement("# Great Circle Distance calculation")
        .statement(copy)
        .statement(format!(
            "{out}['distance'] = np.vectorize(lambda lat1, lon1, lat2, lon2: great_circle((lat1, lon1), (lat2, lon2)).miles)(\n{arguments}\n)"
        ))
}
