use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone, Debug)]
pub struct InputManifest {
    pub version: u32,
    pub documents: Vec<String>,
    #[serde(default)]
    pub indexes: HashMap<String, IndexDefinition>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct IndexDefinition {
    pub include: IncludeFilterValue,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum IncludeFilterValue {
    /// Match all documents (represented as "*")
    All(String),
    /// Match documents by field=value criteria
    Filter(HashMap<String, String>),
}

/// Normalized include filter for matching
#[derive(Clone, Debug)]
pub enum IncludeFilter {
    All,
    Filter(HashMap<String, String>),
}

impl From<IncludeFilterValue> for IncludeFilter {
    fn from(val: IncludeFilterValue) -> Self {
        match val {
            IncludeFilterValue::All(_) => IncludeFilter::All,
            IncludeFilterValue::Filter(f) => IncludeFilter::Filter(f),
        }
    }
}

impl IncludeFilter {
    /// Check if a document matches this filter
    pub fn matches(&self, doc: &super::Document) -> bool {
        match self {
            IncludeFilter::All => true,
            IncludeFilter::Filter(filters) => {
                filters.iter().all(|(key, value)| {
                    match key.as_str() {
                        "category" => doc.category.as_ref() == Some(value),
                        "type" => &doc.doc_type == value,
                        _ => {
                            // Unknown filter key - warn but continue
                            eprintln!("Warning: Unknown filter key '{}'", key);
                            true
                        }
                    }
                })
            }
        }
    }
}
