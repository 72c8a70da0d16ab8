//! Common test utilities for building workflows and running conversions.
#![allow(dead_code)]
use honyaku::prelude::*;

pub const INPUT_PLUGIN: &str = "AlteryxBasePluginsGui.DbFileInput.DbFileInput";
pub const OUTPUT_PLUGIN: &str = "AlteryxBasePluginsGui.DbFileOutput.DbFileOutput";
pub const SELECT_PLUGIN: &str = "AlteryxBasePluginsGui.AlteryxSelect.AlteryxSelect";
pub const FILTER_PLUGIN: &str = "AlteryxBasePluginsGui.Filter.Filter";
pub const FORMULA_PLUGIN: &str = "AlteryxBasePluginsGui.Formula.Formula";
pub const SORT_PLUGIN: &str = "AlteryxBasePluginsGui.Sort.Sort";
pub const UNIQUE_PLUGIN: &str = "AlteryxBasePluginsGui.Unique.Unique";
pub const SUMMARIZE_PLUGIN: &str = "AlteryxSpatialPluginsGui.Summarize.Summarize";
pub const REGEX_PLUGIN: &str = "AlteryxBasePluginsGui.RegEx.RegEx";
pub const DOWNLOAD_PLUGIN: &str = "AlteryxConnectorGui.Download.Download";
pub const UNION_PLUGIN: &str = "AlteryxBasePluginsGui.Union.Union";
pub const JOIN_PLUGIN: &str = "AlteryxBasePluginsGui.Join.Join";
pub const TEXT_INPUT_PLUGIN: &str = "AlteryxBasePluginsGui.TextInput.TextInput";
pub const AUTO_FIELD_PLUGIN: &str = "AlteryxBasePluginsGui.AutoField.AutoField";

/// `<Configuration>` with the given children.
pub fn configuration(children: Vec<Element>) -> Element {
    children
        .into_iter()
        .fold(Element::new("Configuration"), Element::with_child)
}

/// `<{name}>{text}</{name}>`
pub fn text_element(name: &str, text: &str) -> Element {
    Element::new(name).with_text(text)
}

pub fn source(id: &str, path: &str) -> WorkflowNode {
    WorkflowNode::new(id, INPUT_PLUGIN)
        .with_configuration(configuration(vec![text_element("File", path)]))
}

pub fn sink(id: &str, path: &str) -> WorkflowNode {
    WorkflowNode::new(id, OUTPUT_PLUGIN)
        .with_configuration(configuration(vec![text_element("File", path)]))
}

pub fn node(id: &str, plugin: &str, children: Vec<Element>) -> WorkflowNode {
    WorkflowNode::new(id, plugin).with_configuration(configuration(children))
}

pub fn edge(origin: &str, dest: &str) -> WorkflowEdge {
    WorkflowEdge::new(origin, dest)
}

pub fn workflow(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> WorkflowDefinition {
    WorkflowDefinition { nodes, edges }
}

/// Converts with no budget so results never depend on timing.
pub fn convert(workflow: WorkflowDefinition) -> Conversion {
    Converter::builder(workflow)
        .with_budget(Unlimited)
        .build()
        .convert()
}

/// Lines of the script between the import header and the trailing summary.
pub fn body_lines(script: &str) -> Vec<&str> {
    script
        .lines()
        .skip_while(|line| line.starts_with("import ") || line.starts_with("from "))
        .filter(|line| !line.is_empty())
        .take_while(|line| !line.starts_with("# Available DataFrames:"))
        .collect()
}

/// A small but complete workflow document: input, filter, two outputs, a
/// formula annotated with a long note, and a connection to a missing tool.
pub const SAMPLE_WORKFLOW: &str = r#"<?xml version="1.0"?>
<AlteryxDocument yxmdVer="2020.1">
  <Nodes>
    <Node ToolID="1">
      <GuiSettings Plugin="AlteryxBasePluginsGui.DbFileInput.DbFileInput">
        <Position x="54" y="54" />
      </GuiSettings>
      <Properties>
        <Configuration>
          <File>C:\data\customers.csv</File>
        </Configuration>
        <Annotation DisplayMode="0">
          <DefaultAnnotationText>customers.csv</DefaultAnnotationText>
        </Annotation>
      </Properties>
    </Node>
    <Node ToolID="2">
      <GuiSettings Plugin="AlteryxBasePluginsGui.Filter.Filter" />
      <Properties>
        <Configuration>
          <FilterExpression>Age &gt; 30</FilterExpression>
        </Configuration>
      </Properties>
    </Node>
    <Node ToolID="3">
      <GuiSettings Plugin="AlteryxBasePluginsGui.Formula.Formula" />
      <Properties>
        <Configuration>
          <FormulaFields>
            <FormulaField field="AgeNextYear" expression="Age + 1" />
          </FormulaFields>
        </Configuration>
        <Annotation DisplayMode="0">
          <DefaultAnnotationText>Adds one to every age so the report can show next year's values</DefaultAnnotationText>
        </Annotation>
      </Properties>
    </Node>
    <Node ToolID="4">
      <GuiSettings Plugin="AlteryxBasePluginsGui.DbFileOutput.DbFileOutput" />
      <Properties>
        <Configuration>
          <File>C:\data\older.csv</File>
        </Configuration>
      </Properties>
    </Node>
  </Nodes>
  <Connections>
    <Connection>
      <Origin ToolID="1" Connection="Output" />
      <Destination ToolID="2" Connection="Input" />
    </Connection>
    <Connection>
      <Origin ToolID="2" Connection="True" />
      <Destination ToolID="3" Connection="Input" />
    </Connection>
    <Connection>
      <Origin ToolID="3" Connection="Output" />
      <Destination ToolID="4" Connection="Input" />
    </Connection>
    <Connection>
      <Origin ToolID="4" Connection="Output" />
      <Destination ToolID="99" Connection="Input" />
    </Connection>
  </Connections>
</AlteryxDocument>
"#;

/// A join of two inputs whose connections arrive right-first but carry anchors.
pub const JOIN_WORKFLOW: &str = r#"<AlteryxDocument>
  <Nodes>
    <Node ToolID="10">
      <GuiSettings Plugin="AlteryxBasePluginsGui.DbFileInput.DbFileInput" />
      <Properties><Configuration><File>orders.csv</File></Configuration></Properties>
    </Node>
    <Node ToolID="11">
      <GuiSettings Plugin="AlteryxBasePluginsGui.DbFileInput.DbFileInput" />
      <Properties><Configuration><File>customers.csv</File></Configuration></Properties>
    </Node>
    <Node ToolID="12">
      <GuiSettings Plugin="AlteryxBasePluginsGui.Join.Join" />
      <Properties>
        <Configuration joinByRecordPos="False">
          <JoinInfo connection="Left"><Field field="CustomerId" /></JoinInfo>
          <JoinInfo connection="Right"><Field field="Id" /></JoinInfo>
        </Configuration>
      </Properties>
    </Node>
  </Nodes>
  <Connections>
    <Connection>
      <Origin ToolID="11" Connection="Output" />
      <Destination ToolID="12" Connection="Right" />
    </Connection>
    <Connection>
      <Origin ToolID="10" Connection="Output" />
      <Destination ToolID="12" Connection="Left" />
    </Connection>
  </Connections>
</AlteryxDocument>
"#;

/// A macro node running the great-circle template.
pub const MACRO_WORKFLOW: &str = r#"<AlteryxDocument>
  <Nodes>
    <Node ToolID="1">
      <GuiSettings Plugin="AlteryxBasePluginsGui.DbFileInput.DbFileInput" />
      <Properties><Configuration><File>routes.csv</File></Configuration></Properties>
    </Node>
    <Node ToolID="2">
      <GuiSettings />
      <Properties>
        <Configuration>
          <Value name="Input.Points"><![CDATA[LatitudeA=FromLat
LongitudeA=FromLon
LatitudeB=ToLat
LongitudeB=ToLon]]></Value>
        </Configuration>
      </Properties>
      <EngineSettings Macro="Spatial\GreatArcs.yxmc" />
    </Node>
  </Nodes>
  <Connections>
    <Connection>
      <Origin ToolID="1" Connection="Output" />
      <Destination ToolID="2" Connection="Input" />
    </Connection>
  </Connections>
</AlteryxDocument>
"#;
