//! # Resource Configuration
//!
//! A [`ResourceConfig`] is the static description of one resource type: its
//! name, its recognized attributes, the default query directives and any
//! resource-specific validators. It is built once at startup and shared
//! read-only by every request against that resource.
//!
//! The data part can be loaded from JSON:
//!
//! ```rust
//! use jsonapi_handler::ResourceConfig;
//!
//! let config = ResourceConfig::from_json(r#"{
//!     "type_name": "chapters",
//!     "attributes": ["title", "ordering"],
//!     "defaults": { "sort": ["ordering"] }
//! }"#).unwrap();
//!
//! assert_eq!(config.type_name, "chapters");
//! assert_eq!(config.defaults.sort, Some(vec!["ordering".to_string()]));
//! ```
//!
//! Validators are code, so they are attached afterwards with
//! [`ResourceConfig::with_validator`].

use crate::error::ConfigError;
use crate::validators::Validator;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default query directives applied when the query string omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    /// `None` means no include restriction.
    pub include: Option<Vec<String>>,
    pub filter: BTreeMap<String, Vec<String>>,
    pub fields: BTreeMap<String, Vec<String>>,
    /// `None` means the adapter's natural order.
    pub sort: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub type_name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub defaults: QueryDefaults,
    /// The method label handed to adapter writes.
    #[serde(default = "default_method", with = "method_label")]
    pub method: Method,
    /// Run in order after the built-in protocol checks.
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

fn default_method() -> Method {
    Method::GET
}

impl ResourceConfig {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Vec::new(),
            defaults: QueryDefaults::default(),
            method: default_method(),
            validators: Vec::new(),
        }
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        if config.type_name.trim().is_empty() {
            return Err(ConfigError::MissingTypeName);
        }
        Ok(config)
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_defaults(mut self, defaults: QueryDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }
}

mod method_label {
    use http::Method;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let label = String::deserialize(deserializer)?;
        Method::from_bytes(label.to_ascii_uppercase().as_bytes()).map_err(de::Error::custom)
    }
}
