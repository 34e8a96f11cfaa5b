//! In-memory report model.
//!
//! A JSON object becomes a `ReportDocument`: the reserved `title` key plus
//! an ordered list of sections. Each section's payload shape is classified
//! exactly once, here, into a `SectionPayload` variant; rendering never
//! re-inspects the raw JSON.

use super::format::{flatten_found_lines, plain_text};
use crate::error::ToolError;
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Reserved top-level key holding the report title.
pub const TITLE_KEY: &str = "title";
pub const DEFAULT_TITLE: &str = "Report";

/// Section that always renders as a merged table when it carries `found_lines`.
const QUALITY_CHECK_SECTION: &str = "quality_check";
const FOUND_LINES_KEY: &str = "found_lines";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub payload: SectionPayload,
}

/// One key of a merged table and the value rows it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGroup {
    pub key: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    /// Two columns, one row per key.
    KeyValue(Vec<(String, Value)>),
    /// Two columns, the label cell spanning every value row of its key.
    MergedList(Vec<MergedGroup>),
    /// Grid with the shared record keys as header row.
    UniformRecords { columns: Vec<String>, rows: Vec<Vec<Value>> },
    /// Two columns labelled `"{Section} {n}"`.
    EnumeratedList(Vec<Value>),
    /// A single value: value box when short, paragraph when long.
    Scalar(Value),
}

impl ReportDocument {
    /// Build a document from a parsed JSON payload, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(ToolError::Validation(format!(
                "report data must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut title = DEFAULT_TITLE.to_string();
        let mut sections = Vec::new();

        for (name, data) in map {
            if name == TITLE_KEY {
                title = plain_text(&data);
                continue;
            }
            match classify(&name, data) {
                Some(payload) => sections.push(Section { name, payload }),
                None => debug!("Skipping empty section '{}'", name),
            }
        }

        ReportDocument { title, sections }
    }
}

/// Pick the layout strategy for one section. Empty objects and lists yield `None`.
pub fn classify(section_name: &str, data: Value) -> Option<SectionPayload> {
    match data {
        Value::Object(map) => {
            if map.is_empty() {
                return None;
            }
            if wants_merged_cells(section_name, &map) {
                Some(SectionPayload::MergedList(merged_groups(map)))
            } else {
                Some(SectionPayload::KeyValue(map.into_iter().collect()))
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                return None;
            }
            match shared_columns(&items) {
                Some(columns) => {
                    let rows = items
                        .into_iter()
                        .map(|item| match item {
                            Value::Object(mut record) => {
                                columns.iter().map(|c| record.remove(c).unwrap_or(Value::Null)).collect()
                            }
                            _ => Vec::new(),
                        })
                        .collect();
                    Some(SectionPayload::UniformRecords { columns, rows })
                }
                None => Some(SectionPayload::EnumeratedList(items)),
            }
        }
        scalar => Some(SectionPayload::Scalar(scalar)),
    }
}

fn wants_merged_cells(section_name: &str, map: &Map<String, Value>) -> bool {
    let has_multi_value_list = map.values().any(|v| matches!(v, Value::Array(items) if items.len() > 1));
    let is_quality_findings = section_name == QUALITY_CHECK_SECTION && map.contains_key(FOUND_LINES_KEY);
    has_multi_value_list || is_quality_findings
}

fn merged_groups(map: Map<String, Value>) -> Vec<MergedGroup> {
    map.into_iter()
        .map(|(key, value)| {
            let values = if key == FOUND_LINES_KEY {
                flatten_found_lines(&value).into_iter().map(Value::String).collect()
            } else {
                match value {
                    Value::Array(items) => items,
                    single => vec![single],
                }
            };
            MergedGroup { key, values }
        })
        .collect()
}

/// Column order of a list whose elements are all objects with the same non-empty key set.
fn shared_columns(items: &[Value]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let first_keys: BTreeSet<&str> = first.keys().map(|k| k.as_str()).collect();

    let uniform = items.iter().all(|item| match item.as_object() {
        Some(record) => record.keys().map(|k| k.as_str()).collect::<BTreeSet<_>>() == first_keys,
        None => false,
    });

    uniform.then(|| first.keys().cloned().collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
