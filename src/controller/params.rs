use std::collections::HashMap;

use crate::error::{Error, Result};

/// Closed set of parameter kinds a command schema may declare.
///
/// The backend serializes these as strings (`"artifact"`, `"integer"`,
/// `"choice:[...]"` with a JSON array of allowed values, ...). Anything
/// outside this set means the backend is newer than the client and must be
/// reported, not ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Artifact,
    Choice(Vec<String>),
    MultiChoice(Vec<String>),
    Integer,
    Float,
    Text,
    Boolean,
}

impl ParameterKind {
    pub fn parse(declared: &str) -> Result<ParameterKind> {
        if let Some(values) = declared.strip_prefix("choice:") {
            return Ok(ParameterKind::Choice(serde_json::from_str(values)?));
        }
        if let Some(values) = declared.strip_prefix("mchoice:") {
            return Ok(ParameterKind::MultiChoice(serde_json::from_str(values)?));
        }

        match declared {
            "artifact" => Ok(ParameterKind::Artifact),
            "integer" => Ok(ParameterKind::Integer),
            "float" => Ok(ParameterKind::Float),
            "string" => Ok(ParameterKind::Text),
            "boolean" => Ok(ParameterKind::Boolean),
            other => Err(Error::UnknownParameterKind(other.to_string())),
        }
    }

    /// Deterministic widget mapping; exhaustive over the closed set, so a
    /// new kind cannot slip through without a compile error here.
    pub fn widget(&self) -> WidgetKind {
        match self {
            ParameterKind::Artifact => WidgetKind::ArtifactDropdown,
            ParameterKind::Choice(values) => WidgetKind::Dropdown(values.clone()),
            ParameterKind::MultiChoice(values) => WidgetKind::MultiSelect(values.clone()),
            ParameterKind::Integer => WidgetKind::NumericInput,
            ParameterKind::Float => WidgetKind::NumericStepInput,
            ParameterKind::Text => WidgetKind::TextInput,
            ParameterKind::Boolean => WidgetKind::Checkbox,
        }
    }
}

/// Input widget a parameter maps onto.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Dropdown restricted to artifacts of a compatible type.
    ArtifactDropdown,
    Dropdown(Vec<String>),
    MultiSelect(Vec<String>),
    NumericInput,
    /// Numeric input with a fixed step, for float parameters.
    NumericStepInput,
    TextInput,
    Checkbox,
}

/// One parameter of a command form: its name, widget, and whether the
/// schema listed it as required.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterWidget {
    pub name: String,
    pub widget: WidgetKind,
    pub required: bool,
}

/// A required-parameter value is either a literal or a reference to a
/// prior step's named output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Literal(String),
    Connection { source: String, output: String },
}

impl ParamValue {
    /// Exactly one `:` makes a `source:output` connection; zero (or more
    /// than one) means the value is a literal.
    pub fn classify(raw: &str) -> ParamValue {
        match raw.split_once(':') {
            Some((source, output)) if !output.contains(':') => {
                ParamValue::Connection { source: source.to_string(), output: output.to_string() }
            }
            _ => ParamValue::Literal(raw.to_string()),
        }
    }
}

/// Splits a required-parameter map into literal values and connections
/// grouped by source id: `{source_id: {output_name: parameter_name}}`.
pub fn split_required(
    required: &HashMap<String, String>,
) -> (HashMap<String, String>, HashMap<String, HashMap<String, String>>) {
    let mut literals = HashMap::new();
    let mut connections: HashMap<String, HashMap<String, String>> = HashMap::new();

    for (name, value) in required {
        match ParamValue::classify(value) {
            ParamValue::Literal(literal) => {
                literals.insert(name.clone(), literal);
            }
            ParamValue::Connection { source, output } => {
                connections.entry(source).or_default().insert(output, name.clone());
            }
        }
    }

    (literals, connections)
}
