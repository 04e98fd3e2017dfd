use serde_json::Value;

use crate::view::{Attributes, HtmlRenderable, JsonRenderable};

/// Record
///
/// A stored record: a 1-based id and string attributes in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: u64,
    pub attributes: Vec<(String, String)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `key`, keeping its position when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    fn attribute_map(&self) -> Attributes {
        self.attributes
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }
}

impl HtmlRenderable for Record {
    /// Attributes plus the id, for templates that link to the record.
    fn renderable_attributes(&self) -> Attributes {
        let mut attributes = self.attribute_map();
        attributes.insert("id".to_string(), Value::from(self.id));
        attributes
    }
}

impl JsonRenderable for Record {
    fn renderable_json_attributes(&self) -> Attributes {
        self.attribute_map()
    }
}

/// RecordCollection
///
/// A list of records rendered under a single key, in store order.
pub struct RecordCollection<'a> {
    pub key: &'a str,
    pub records: &'a [Record],
}

impl HtmlRenderable for RecordCollection<'_> {
    fn renderable_attributes(&self) -> Attributes {
        let records = self
            .records
            .iter()
            .map(|record| Value::Object(record.renderable_attributes()))
            .collect();
        Attributes::from_iter([(self.key.to_string(), Value::Array(records))])
    }
}

impl JsonRenderable for RecordCollection<'_> {
    fn renderable_json_attributes(&self) -> Attributes {
        let records = self
            .records
            .iter()
            .map(|record| Value::Object(record.renderable_json_attributes()))
            .collect();
        Attributes::from_iter([(self.key.to_string(), Value::Array(records))])
    }
}
