use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A stored resource.
///
/// `links` holds to-one relations only, as the id of the target. To-many
/// relations are derived from the inverse to-one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

impl Record {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
            attributes: Map::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn link(&self, relation: &str) -> Option<&str> {
        self.links.get(relation).map(String::as_str)
    }

    /// The text a filter value is compared against, for `id`, attributes and links.
    pub fn filter_text(&self, key: &str) -> Option<String> {
        if key == "id" {
            return Some(self.id.clone());
        }
        if let Some(target) = self.link(key) {
            return Some(target.to_string());
        }
        match self.attribute(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Keeps only the listed attributes.
    pub fn retain_fields(&mut self, fields: &[String]) {
        self.attributes.retain(|name, _| fields.iter().any(|f| f == name));
    }
}

/// Orders attribute values for sorting: missing and null first, then numbers,
/// then strings, then everything else by its JSON text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => match rank(a).cmp(&rank(b)) {
            Ordering::Equal => {
                let text = |v: Option<&Value>| v.map(Value::to_string).unwrap_or_default();
                text(a).cmp(&text(b))
            }
            other => other,
        },
    }
}

/// Reads a link target: a resource identifier object, a bare id, or null.
pub fn link_target(value: &Value) -> Option<String> {
    let id = match value {
        Value::Object(object) => object.get("id")?,
        other => other,
    };
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
