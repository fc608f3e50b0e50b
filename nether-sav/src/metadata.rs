//! File-level metadata gathered from non-variable records

use hashbrown::HashMap;
use serde::Serialize;

use crate::record::RecordBody;

/// A metadata field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Str(String),
    Bool(bool),
    IntList(Vec<i64>),
    StrList(Vec<String>),
}

impl MetaValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Field name to value. Later records overwrite earlier fields of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataTable {
    fields: HashMap<String, MetaValue>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetaValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge the fields a metadata record carries. Variable and heap bodies
    /// carry none.
    pub fn merge(&mut self, body: &RecordBody) {
        match body {
            RecordBody::Timestamp(ts) => {
                self.insert("date", ts.date.as_str());
                self.insert("user", ts.user.as_str());
                self.insert("host", ts.host.as_str());
            }
            RecordBody::Version(v) => {
                self.insert("format", v.format as i64);
                self.insert("arch", v.arch.as_str());
                self.insert("os", v.os.as_str());
                self.insert("release", v.release.as_str());
            }
            RecordBody::Identification(id) => {
                self.insert("author", id.author.as_str());
                self.insert("title", id.title.as_str());
                self.insert("idcode", id.idcode.as_str());
            }
            RecordBody::Notice(text) => self.insert("notice", text.as_str()),
            RecordBody::Description(text) => self.insert("description", text.as_str()),
            RecordBody::HeapHeader(indices) => {
                self.insert("nvalues", indices.len() as i64);
                self.insert(
                    "indices",
                    MetaValue::IntList(indices.iter().map(|&i| i as i64).collect()),
                );
            }
            RecordBody::CommonBlock(block) => {
                self.insert("nvars", block.varnames.len() as i64);
                self.insert("name", block.name.as_str());
                self.insert("varnames", MetaValue::StrList(block.varnames.clone()));
            }
            RecordBody::EndMarker => self.insert("end", true),
            RecordBody::Variable { .. } | RecordBody::HeapData { .. } | RecordBody::Skipped => {}
        }
    }
}
