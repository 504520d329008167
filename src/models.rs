use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inferred semantic type of one spreadsheet column, serialized with the
/// labels the front-end expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    #[serde(rename = "cuantitativo")]
    Quantitative,
    #[serde(rename = "cualitativo")]
    Qualitative,
    #[serde(rename = "empty")]
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub count: usize,
}

/// One parsed worksheet: descriptors plus preview and per-column series,
/// all in original column order.
#[derive(Debug)]
pub struct SheetTable {
    pub columns: Vec<ColumnDescriptor>,
    pub preview_rows: Vec<IndexMap<String, Value>>,
    pub raw_series: IndexMap<String, Vec<Value>>,
    pub total_rows: usize,
}

/// One turn of the caller-owned chat transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}
